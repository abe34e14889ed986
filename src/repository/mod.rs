use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod member_repository;
pub mod access_token_repository;
pub mod payment_repository;

pub use member_repository::SqliteMemberRepository;
pub use access_token_repository::SqliteAccessTokenRepository;
pub use payment_repository::SqlitePaymentRepository;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, member: NewMember) -> Result<Member>;
    /// Inserts the member and its ledger row in one transaction.
    async fn create_with_payment(&self, member: NewMember, payment: Payment) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>>;
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>>;
    async fn search(&self, query: &MemberQuery) -> Result<Vec<Member>>;
    async fn count(&self) -> Result<i64>;
    async fn apply_upgrade(
        &self,
        id: Uuid,
        tier: MembershipTier,
        upgraded_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        payment: Payment,
    ) -> Result<Member>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    async fn create(&self, member_id: Uuid, token: &str) -> Result<AccessToken>;
    async fn find_by_token(&self, token: &str) -> Result<Option<AccessToken>>;
    async fn list_by_member(&self, member_id: Uuid) -> Result<Vec<AccessToken>>;
    /// Flips `used` from false to true in one statement.
    async fn consume(&self, token: &str, at: DateTime<Utc>) -> Result<ConsumeResult>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>>;
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>>;
}
