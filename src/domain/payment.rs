use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaymentMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub purpose: PaymentPurpose,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    Registration,
    Upgrade,
    Enrollment,
}

impl PaymentPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPurpose::Registration => "registration",
            PaymentPurpose::Upgrade => "upgrade",
            PaymentPurpose::Enrollment => "enrollment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registration" => Some(PaymentPurpose::Registration),
            "upgrade" => Some(PaymentPurpose::Upgrade),
            "enrollment" => Some(PaymentPurpose::Enrollment),
            _ => None,
        }
    }
}
