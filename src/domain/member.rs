use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub name_lower: String,
    pub country: String,
    pub club: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub identification_type: IdentificationType,
    pub identification_number: String,
    pub membership_type: MembershipTier,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub upgraded_at: Option<DateTime<Utc>>,
    pub photo_url: String,
    pub id_photo_url: String,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Case-insensitive substring match over the admin-visible text fields.
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.club.as_str(),
            self.country.as_str(),
            self.membership_type.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipTier {
    #[serde(rename = "Regular member")]
    Regular,
    #[serde(rename = "VIP Membership")]
    Vip,
}

impl MembershipTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Regular => "Regular member",
            MembershipTier::Vip => "VIP Membership",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Regular member" => Some(MembershipTier::Regular),
            "VIP Membership" => Some(MembershipTier::Vip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IdentificationType {
    #[serde(rename = "ID")]
    IdCard,
    #[serde(rename = "Passport")]
    Passport,
    #[serde(rename = "Drivers License")]
    DriversLicense,
}

impl IdentificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentificationType::IdCard => "ID",
            IdentificationType::Passport => "Passport",
            IdentificationType::DriversLicense => "Drivers License",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ID" => Some(IdentificationType::IdCard),
            "Passport" => Some(IdentificationType::Passport),
            "Drivers License" => Some(IdentificationType::DriversLicense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "credit card")]
    CreditCard,
    #[serde(rename = "exempt")]
    Exempt,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit card",
            PaymentMethod::Exempt => "exempt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "credit card" => Some(PaymentMethod::CreditCard),
            "exempt" => Some(PaymentMethod::Exempt),
            _ => None,
        }
    }
}

/// Everything needed to insert a member row. The id is chosen by the caller
/// so photos can be stored under it before the row exists.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub club: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub identification_type: IdentificationType,
    pub identification_number: String,
    pub membership_type: MembershipTier,
    pub activated_at: DateTime<Utc>,
    pub photo_url: String,
    pub id_photo_url: String,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub is_admin: bool,
}

impl NewMember {
    pub fn name_lower(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).to_lowercase()
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub member_id: Uuid,
    pub password_hash: String,
}

/// Admin query over the member collection.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberQuery {
    All,
    Club(String),
    PaymentMethod(PaymentMethod),
    /// Members activated in `[start, end)`.
    ActivatedBetween {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Case-insensitive substring over name, email, club, country and tier.
    Text(String),
    NamePrefix(String),
    TransactionId(String),
}

/// Membership runs for one calendar year. On Feb 29 the result clamps to Feb 28.
pub fn one_year_after(start: DateTime<Utc>) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(12))
        .unwrap_or(start + chrono::Duration::days(365))
}

/// Whole years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    use chrono::Datelike;

    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn one_year_after_keeps_calendar_date() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        let end = one_year_after(start);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn one_year_after_leap_day_clamps() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let end = one_year_after(start);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn age_counts_birthday_on_the_day() {
        let dob = NaiveDate::from_ymd_opt(2003, 6, 10).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()), 20);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()), 21);
    }

    #[test]
    fn tier_strings_round_trip_through_serde() {
        let json = serde_json::to_string(&MembershipTier::Vip).unwrap();
        assert_eq!(json, "\"VIP Membership\"");
        let tier: MembershipTier = serde_json::from_str("\"Regular member\"").unwrap();
        assert_eq!(tier, MembershipTier::Regular);
    }
}
