#![allow(dead_code)]

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{NaiveDate, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

use clubpass::{
    auth::AuthService,
    config::Settings,
    domain::{IdentificationType, Member, MembershipTier, NewMember, PaymentMethod},
    email::RecordingMailer,
    payments::{FakePaymentGateway, PaymentGateway},
    repository::MemberRepository,
    service::{RegisterRequest, ServiceContext},
    storage::MemoryObjectStore,
};

pub const CLUB: &str = "El Jardin Verde";
pub const PASSWORD: &str = "correct horse";

/// Single-connection in-memory database; every connection to `:memory:` is
/// its own database.
pub async fn memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub settings: Settings,
    pub gateway: Arc<FakePaymentGateway>,
    pub store: Arc<MemoryObjectStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn test_context() -> anyhow::Result<TestContext> {
    let pool = memory_pool().await?;
    context_with_pool(pool, true)
}

pub fn context_with_pool(pool: SqlitePool, with_gateway: bool) -> anyhow::Result<TestContext> {
    let settings = Settings::default();
    let gateway = Arc::new(FakePaymentGateway::new());
    let store = Arc::new(MemoryObjectStore::new());
    let mailer = Arc::new(RecordingMailer::new());

    let payment_gateway: Option<Arc<dyn PaymentGateway>> = if with_gateway {
        Some(gateway.clone())
    } else {
        None
    };

    let ctx = Arc::new(ServiceContext::new(
        pool,
        &settings,
        payment_gateway,
        store.clone(),
        mailer.clone(),
    ));

    Ok(TestContext {
        ctx,
        settings,
        gateway,
        store,
        mailer,
    })
}

pub fn photo_data_url() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG\r\n\x1a\nfake"))
}

/// A JPEG data URL whose decoded payload is `len` bytes.
pub fn large_photo_data_url(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    bytes[..4].copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    format!("data:image/jpeg;base64,{}", STANDARD.encode(&bytes))
}

pub fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Garcia".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
        place_of_birth: "Madrid".to_string(),
        country: "Spain".to_string(),
        club: CLUB.to_string(),
        identification_type: Some(IdentificationType::IdCard),
        identification_number: "X1234567".to_string(),
        membership_type: Some(MembershipTier::Regular),
        selfie: Some(photo_data_url()),
        id_photo: Some(photo_data_url()),
        resident_exemption: false,
        payment_intent_id: None,
    }
}

pub async fn new_member(email: &str, first_name: &str, last_name: &str) -> anyhow::Result<NewMember> {
    Ok(NewMember {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: AuthService::hash_password(PASSWORD).await?,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        country: "Spain".to_string(),
        club: CLUB.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1988, 3, 2).unwrap(),
        place_of_birth: "Valencia".to_string(),
        identification_type: IdentificationType::Passport,
        identification_number: "P0000001".to_string(),
        membership_type: MembershipTier::Regular,
        activated_at: Utc::now(),
        photo_url: String::new(),
        id_photo_url: String::new(),
        payment_method: PaymentMethod::Cash,
        transaction_id: None,
        is_admin: false,
    })
}

pub async fn insert_member(
    repo: &dyn MemberRepository,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<Member> {
    Ok(repo.create(new_member(email, first_name, last_name).await?).await?)
}
