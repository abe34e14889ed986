use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::MembershipConfig,
    domain::*,
    error::{AppError, Result},
    payments::{
        ChargeRequest, ChargeStatus, PaymentGateway, PaymentIntentHandle, PaymentIntentInfo,
        PaymentSheet,
    },
    repository::{MemberRepository, PaymentRepository},
};

#[derive(Debug, Clone, Serialize)]
pub struct Pricing {
    pub currency: String,
    pub regular_fee_cents: i64,
    pub vip_fee_cents: i64,
    pub upgrade_fee_cents: i64,
}

/// Prices, processor intents and verification of client-confirmed charges.
pub struct PaymentService {
    gateway: Option<Arc<dyn PaymentGateway>>,
    member_repo: Arc<dyn MemberRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    membership: MembershipConfig,
}

impl PaymentService {
    pub fn new(
        gateway: Option<Arc<dyn PaymentGateway>>,
        member_repo: Arc<dyn MemberRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        membership: MembershipConfig,
    ) -> Self {
        Self {
            gateway,
            member_repo,
            payment_repo,
            membership,
        }
    }

    fn gateway(&self) -> Result<&Arc<dyn PaymentGateway>> {
        self.gateway.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Payment processing is not configured".to_string())
        })
    }

    pub fn currency(&self) -> &str {
        &self.membership.currency
    }

    pub fn tier_fee(&self, tier: MembershipTier) -> i64 {
        match tier {
            MembershipTier::Regular => self.membership.regular_fee_cents,
            MembershipTier::Vip => self.membership.vip_fee_cents,
        }
    }

    pub fn upgrade_fee(&self) -> i64 {
        self.membership.upgrade_fee_cents
    }

    pub fn pricing(&self) -> Pricing {
        Pricing {
            currency: self.membership.currency.clone(),
            regular_fee_cents: self.membership.regular_fee_cents,
            vip_fee_cents: self.membership.vip_fee_cents,
            upgrade_fee_cents: self.membership.upgrade_fee_cents,
        }
    }

    fn registration_charge(&self, tier: MembershipTier) -> ChargeRequest {
        let mut metadata = HashMap::new();
        metadata.insert("purpose".to_string(), PaymentPurpose::Registration.as_str().to_string());
        metadata.insert("membership_type".to_string(), tier.as_str().to_string());

        ChargeRequest {
            amount_cents: self.tier_fee(tier),
            currency: self.membership.currency.clone(),
            description: format!("{} registration", tier.as_str()),
            metadata,
        }
    }

    pub async fn create_registration_intent(&self, tier: MembershipTier) -> Result<PaymentIntentHandle> {
        let handle = self
            .gateway()?
            .create_payment_intent(self.registration_charge(tier))
            .await?;

        tracing::info!(
            "Created registration payment intent {} for {}",
            handle.payment_intent_id,
            tier.as_str()
        );
        Ok(handle)
    }

    pub async fn create_registration_sheet(&self, tier: MembershipTier) -> Result<PaymentSheet> {
        let sheet = self
            .gateway()?
            .create_payment_sheet(self.registration_charge(tier))
            .await?;

        tracing::info!(
            "Created payment sheet {} for customer {}",
            sheet.intent.payment_intent_id,
            sheet.customer_id
        );
        Ok(sheet)
    }

    pub async fn create_upgrade_intent(&self, member_id: Uuid) -> Result<PaymentIntentHandle> {
        let mut metadata = HashMap::new();
        metadata.insert("purpose".to_string(), PaymentPurpose::Upgrade.as_str().to_string());
        metadata.insert("member_id".to_string(), member_id.to_string());

        let request = ChargeRequest {
            amount_cents: self.membership.upgrade_fee_cents,
            currency: self.membership.currency.clone(),
            description: "VIP Membership upgrade".to_string(),
            metadata,
        };

        let handle = self.gateway()?.create_payment_intent(request).await?;
        tracing::info!(
            "Created upgrade payment intent {} for member {}",
            handle.payment_intent_id,
            member_id
        );
        Ok(handle)
    }

    /// Checks that `intent_id` names a settled charge of at least
    /// `minimum_cents` in our currency that no member or payment has claimed.
    pub async fn verify_charge(&self, intent_id: &str, minimum_cents: i64) -> Result<PaymentIntentInfo> {
        let intent_id = intent_id.trim();
        if intent_id.is_empty() {
            return Err(AppError::Validation("Payment is required".to_string()));
        }

        let gateway = self.gateway()?;

        if self.is_applied(intent_id).await? {
            return Err(AppError::Conflict(
                "This payment has already been applied".to_string(),
            ));
        }

        let info = gateway.retrieve_payment_intent(intent_id).await?;

        if info.status != ChargeStatus::Succeeded {
            tracing::warn!("Payment intent {} has status {}", info.id, info.status.as_str());
            return Err(AppError::Payment(format!(
                "Payment has not completed (status: {})",
                info.status.as_str()
            )));
        }

        if !info.currency.eq_ignore_ascii_case(&self.membership.currency) {
            return Err(AppError::Payment(format!(
                "Payment currency {} does not match {}",
                info.currency, self.membership.currency
            )));
        }

        if info.amount_cents < minimum_cents {
            return Err(AppError::Payment(
                "Payment amount is below the membership fee".to_string(),
            ));
        }

        Ok(info)
    }

    /// [`verify_charge`](Self::verify_charge) plus a check that the intent
    /// was created for this member's upgrade.
    pub async fn verify_upgrade_charge(&self, intent_id: &str, member_id: Uuid) -> Result<PaymentIntentInfo> {
        let info = self.verify_charge(intent_id, self.upgrade_fee()).await?;

        let expected_owner = member_id.to_string();
        let purpose = info.metadata.get("purpose").map(String::as_str);
        let owner = info.metadata.get("member_id").map(String::as_str);
        if purpose != Some(PaymentPurpose::Upgrade.as_str()) || owner != Some(expected_owner.as_str()) {
            tracing::warn!(
                "Payment intent {} was not issued for member {}'s upgrade",
                info.id,
                member_id
            );
            return Err(AppError::Payment(
                "This payment was not made for your upgrade".to_string(),
            ));
        }

        Ok(info)
    }

    async fn is_applied(&self, transaction_id: &str) -> Result<bool> {
        if self.payment_repo.find_by_transaction_id(transaction_id).await?.is_some() {
            return Ok(true);
        }
        let members = self
            .member_repo
            .search(&MemberQuery::TransactionId(transaction_id.to_string()))
            .await?;
        Ok(!members.is_empty())
    }
}
