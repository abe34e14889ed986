use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{MemberRepository, PaymentRepository},
    service::payment_service::PaymentService,
};

pub struct MemberService {
    repo: Arc<dyn MemberRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    payments: Arc<PaymentService>,
}

impl MemberService {
    pub fn new(
        repo: Arc<dyn MemberRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        payments: Arc<PaymentService>,
    ) -> Self {
        Self {
            repo,
            payment_repo,
            payments,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Member> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
    }

    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }

    pub async fn list(&self) -> Result<Vec<Member>> {
        self.repo.search(&MemberQuery::All).await
    }

    pub async fn by_club(&self, club: &str) -> Result<Vec<Member>> {
        self.repo.search(&MemberQuery::Club(club.to_string())).await
    }

    pub async fn by_payment_method(&self, method: &str) -> Result<Vec<Member>> {
        let method = PaymentMethod::parse(method).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown payment method: {}", method))
        })?;
        self.repo.search(&MemberQuery::PaymentMethod(method)).await
    }

    /// Members whose activation falls on `day` (UTC).
    pub async fn activated_on(&self, day: NaiveDate) -> Result<Vec<Member>> {
        let start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default());
        let end = start + Duration::days(1);
        self.repo
            .search(&MemberQuery::ActivatedBetween { start, end })
            .await
    }

    pub async fn search_text(&self, term: &str) -> Result<Vec<Member>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list().await;
        }
        self.repo.search(&MemberQuery::Text(term.to_string())).await
    }

    pub async fn by_name_prefix(&self, prefix: &str) -> Result<Vec<Member>> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return self.list().await;
        }
        self.repo.search(&MemberQuery::NamePrefix(prefix)).await
    }

    pub async fn by_transaction_id(&self, transaction_id: &str) -> Result<Vec<Member>> {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(AppError::Validation(
                "Please enter a transaction ID".to_string(),
            ));
        }
        self.repo
            .search(&MemberQuery::TransactionId(transaction_id.to_string()))
            .await
    }

    pub async fn payments(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        self.payment_repo.find_by_member(member_id).await
    }

    /// Applies a settled upgrade charge. The ledger row and the tier change
    /// commit together, so the transaction id is claimed exactly once.
    pub async fn upgrade(&self, member_id: Uuid, payment_intent_id: &str) -> Result<Member> {
        let member = self.get(member_id).await?;

        if member.membership_type == MembershipTier::Vip {
            return Err(AppError::BadRequest(
                "You already have a VIP Membership".to_string(),
            ));
        }

        let charge = self
            .payments
            .verify_upgrade_charge(payment_intent_id, member_id)
            .await?;

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            member_id,
            amount_cents: charge.amount_cents,
            currency: charge.currency.to_lowercase(),
            payment_method: PaymentMethod::CreditCard,
            purpose: PaymentPurpose::Upgrade,
            transaction_id: Some(charge.id.clone()),
            created_at: now,
        };

        let updated = self
            .repo
            .apply_upgrade(member_id, MembershipTier::Vip, now, one_year_after(now), payment)
            .await?;

        tracing::info!(
            "Member {} upgraded to VIP with payment {}",
            member_id,
            charge.id
        );

        Ok(updated)
    }
}
