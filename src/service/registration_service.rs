use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    config::{MembershipConfig, StorageConfig},
    domain::*,
    error::{AppError, Result},
    repository::MemberRepository,
    service::payment_service::PaymentService,
    storage::{image::decode_data_url, DecodedImage, ObjectStore},
};

/// Self-service signup. Photos arrive as `data:image/...;base64,` URLs.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 1, message = "Place of birth is required"))]
    pub place_of_birth: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "Please select a club"))]
    pub club: String,
    pub identification_type: Option<IdentificationType>,
    #[validate(length(min = 1, message = "Identification number is required"))]
    pub identification_number: String,
    pub membership_type: Option<MembershipTier>,
    pub selfie: Option<String>,
    pub id_photo: Option<String>,
    pub resident_exemption: bool,
    pub payment_intent_id: Option<String>,
}

/// Cash enrollment performed by an admin at the counter.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EnrollRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 1, message = "Place of birth is required"))]
    pub place_of_birth: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "Please select a club"))]
    pub club: String,
    pub identification_type: Option<IdentificationType>,
    #[validate(length(min = 1, message = "Identification number is required"))]
    pub identification_number: String,
    pub membership_type: Option<MembershipTier>,
    pub selfie: Option<String>,
    pub id_photo: Option<String>,
}

/// Fields common to both entry paths, before the explicit checks.
struct ApplicantForm {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
    place_of_birth: String,
    country: String,
    club: String,
    identification_type: Option<IdentificationType>,
    identification_number: String,
    selfie: Option<String>,
    id_photo: Option<String>,
}

/// A fully checked applicant, photos decoded.
struct Applicant {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    place_of_birth: String,
    country: String,
    club: String,
    identification_type: IdentificationType,
    identification_number: String,
    selfie: DecodedImage,
    id_photo: DecodedImage,
}

struct StoredPhotos {
    photo_url: String,
    id_photo_url: String,
    keys: Vec<String>,
}

pub struct RegistrationService {
    member_repo: Arc<dyn MemberRepository>,
    payments: Arc<PaymentService>,
    object_store: Arc<dyn ObjectStore>,
    membership: MembershipConfig,
    storage: StorageConfig,
}

impl RegistrationService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        payments: Arc<PaymentService>,
        object_store: Arc<dyn ObjectStore>,
        membership: MembershipConfig,
        storage: StorageConfig,
    ) -> Self {
        Self {
            member_repo,
            payments,
            object_store,
            membership,
            storage,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Member> {
        request.validate()?;

        let exempt = request.resident_exemption;
        let tier = match (exempt, request.membership_type) {
            (true, _) => MembershipTier::Regular,
            (false, Some(tier)) => tier,
            (false, None) => {
                return Err(AppError::Validation("Please select a membership type".to_string()))
            }
        };

        let intent_id = if exempt {
            None
        } else {
            match request.payment_intent_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => Some(id.to_string()),
                _ => return Err(AppError::Validation("Payment is required".to_string())),
            }
        };

        let applicant = self.check_applicant(ApplicantForm {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth: request.date_of_birth,
            place_of_birth: request.place_of_birth,
            country: request.country,
            club: request.club,
            identification_type: request.identification_type,
            identification_number: request.identification_number,
            selfie: request.selfie,
            id_photo: request.id_photo,
        })?;

        self.ensure_email_available(&applicant.email).await?;

        let charge = match &intent_id {
            Some(id) => Some(self.payments.verify_charge(id, self.payments.tier_fee(tier)).await?),
            None => None,
        };

        let payment_method = if exempt {
            PaymentMethod::Exempt
        } else {
            PaymentMethod::CreditCard
        };

        let id = Uuid::new_v4();
        let payment = charge.map(|charge| Payment {
            id: Uuid::new_v4(),
            member_id: id,
            amount_cents: charge.amount_cents,
            currency: charge.currency.to_lowercase(),
            payment_method,
            purpose: PaymentPurpose::Registration,
            transaction_id: Some(charge.id),
            created_at: Utc::now(),
        });

        let member = self
            .create_member(id, applicant, tier, payment_method, intent_id, payment)
            .await?;

        tracing::info!(
            "Registered member {} ({}, {})",
            member.id,
            member.membership_type.as_str(),
            member.payment_method.as_str()
        );

        Ok(member)
    }

    pub async fn enroll(&self, request: EnrollRequest) -> Result<Member> {
        request.validate()?;

        let tier = request.membership_type.ok_or_else(|| {
            AppError::Validation("Please select a membership type".to_string())
        })?;

        let applicant = self.check_applicant(ApplicantForm {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth: request.date_of_birth,
            place_of_birth: request.place_of_birth,
            country: request.country,
            club: request.club,
            identification_type: request.identification_type,
            identification_number: request.identification_number,
            selfie: request.selfie,
            id_photo: request.id_photo,
        })?;

        self.ensure_email_available(&applicant.email).await?;

        let id = Uuid::new_v4();
        let payment = Payment {
            id: Uuid::new_v4(),
            member_id: id,
            amount_cents: self.payments.tier_fee(tier),
            currency: self.payments.currency().to_string(),
            payment_method: PaymentMethod::Cash,
            purpose: PaymentPurpose::Enrollment,
            transaction_id: None,
            created_at: Utc::now(),
        };

        let member = self
            .create_member(id, applicant, tier, PaymentMethod::Cash, None, Some(payment))
            .await?;

        tracing::info!("Enrolled member {} for cash", member.id);
        Ok(member)
    }

    fn check_applicant(&self, form: ApplicantForm) -> Result<Applicant> {
        let date_of_birth = form
            .date_of_birth
            .ok_or_else(|| AppError::Validation("Date of birth is required".to_string()))?;

        let today = Utc::now().date_naive();
        if date_of_birth > today {
            return Err(AppError::Validation("Date of birth is in the future".to_string()));
        }
        if age_on(date_of_birth, today) < self.membership.minimum_age as i32 {
            return Err(AppError::Validation(format!(
                "You must be at least {} years old to register",
                self.membership.minimum_age
            )));
        }

        let club = form.club.trim().to_string();
        if !self.membership.clubs.iter().any(|c| c == &club) {
            return Err(AppError::Validation("Please select a valid club".to_string()));
        }

        let identification_type = form.identification_type.ok_or_else(|| {
            AppError::Validation("Identification type is required".to_string())
        })?;

        let selfie = form
            .selfie
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::Validation("A selfie photo is required".to_string()))?;
        let id_photo = form
            .id_photo
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::Validation("A photo of your ID is required".to_string()))?;

        let max_bytes = self.storage.max_image_bytes;
        let selfie = decode_data_url("Selfie photo", &selfie, max_bytes)?;
        let id_photo = decode_data_url("ID photo", &id_photo, max_bytes)?;

        Ok(Applicant {
            email: form.email.trim().to_string(),
            password: form.password,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            date_of_birth,
            place_of_birth: form.place_of_birth.trim().to_string(),
            country: form.country.trim().to_string(),
            club,
            identification_type,
            identification_number: form.identification_number.trim().to_string(),
            selfie,
            id_photo,
        })
    }

    async fn ensure_email_available(&self, email: &str) -> Result<()> {
        if self.member_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
        Ok(())
    }

    /// Stores the photos, then inserts the member together with its ledger
    /// row. Photos are removed again if the insert fails.
    async fn create_member(
        &self,
        id: Uuid,
        applicant: Applicant,
        tier: MembershipTier,
        payment_method: PaymentMethod,
        transaction_id: Option<String>,
        payment: Option<Payment>,
    ) -> Result<Member> {
        let password_hash = AuthService::hash_password(&applicant.password).await?;
        let photos = self
            .store_photos(id, &applicant.selfie, &applicant.id_photo)
            .await?;

        let new_member = NewMember {
            id,
            email: applicant.email,
            password_hash,
            first_name: applicant.first_name,
            last_name: applicant.last_name,
            country: applicant.country,
            club: applicant.club,
            date_of_birth: applicant.date_of_birth,
            place_of_birth: applicant.place_of_birth,
            identification_type: applicant.identification_type,
            identification_number: applicant.identification_number,
            membership_type: tier,
            activated_at: Utc::now(),
            photo_url: photos.photo_url.clone(),
            id_photo_url: photos.id_photo_url.clone(),
            payment_method,
            transaction_id,
            is_admin: false,
        };

        let inserted = match payment {
            Some(payment) => self.member_repo.create_with_payment(new_member, payment).await,
            None => self.member_repo.create(new_member).await,
        };

        match inserted {
            Ok(member) => Ok(member),
            Err(e) => {
                tracing::warn!("Member insert failed, removing uploaded photos: {}", e);
                self.remove_photos(&photos.keys).await;
                Err(e)
            }
        }
    }

    async fn store_photos(
        &self,
        id: Uuid,
        selfie: &DecodedImage,
        id_photo: &DecodedImage,
    ) -> Result<StoredPhotos> {
        let selfie_key = format!("user_photos/{}-selfie.{}", id, selfie.extension);
        let id_key = format!("user_id_photos/{}-id.{}", id, id_photo.extension);

        let photo_url = self
            .object_store
            .upload(&selfie_key, &selfie.content_type, &selfie.bytes)
            .await?;

        let id_photo_url = match self
            .object_store
            .upload(&id_key, &id_photo.content_type, &id_photo.bytes)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                self.remove_photos(&[selfie_key]).await;
                return Err(e);
            }
        };

        Ok(StoredPhotos {
            photo_url,
            id_photo_url,
            keys: vec![selfie_key, id_key],
        })
    }

    async fn remove_photos(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.object_store.delete(key).await {
                tracing::error!("Failed to remove uploaded photo {}: {}", key, e);
            }
        }
    }
}
