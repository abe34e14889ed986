pub mod access_service;
pub mod member_service;
pub mod password_reset_service;
pub mod payment_service;
pub mod registration_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::{AuthService, PasswordResetStore};
use crate::config::Settings;
use crate::email::Mailer;
use crate::payments::PaymentGateway;
use crate::storage::ObjectStore;
use access_service::AccessService;
use member_service::MemberService;
use password_reset_service::PasswordResetService;
use payment_service::PaymentService;
use registration_service::RegistrationService;

pub use access_service::IssuedAccessToken;
pub use payment_service::Pricing;
pub use registration_service::{EnrollRequest, RegisterRequest};

pub struct ServiceContext {
    pub member_repo: Arc<dyn MemberRepository>,
    pub access_token_repo: Arc<dyn AccessTokenRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub auth_service: Arc<AuthService>,
    pub object_store: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn Mailer>,
    pub payment_service: Arc<PaymentService>,
    pub registration_service: Arc<RegistrationService>,
    pub member_service: Arc<MemberService>,
    pub access_service: Arc<AccessService>,
    pub password_reset_service: Arc<PasswordResetService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        settings: &Settings,
        payment_gateway: Option<Arc<dyn PaymentGateway>>,
        object_store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let member_repo: Arc<dyn MemberRepository> =
            Arc::new(SqliteMemberRepository::new(db_pool.clone()));
        let access_token_repo: Arc<dyn AccessTokenRepository> =
            Arc::new(SqliteAccessTokenRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            settings.auth.session_duration_hours,
            settings.auth.secure_cookies,
        ));

        let payment_service = Arc::new(PaymentService::new(
            payment_gateway,
            member_repo.clone(),
            payment_repo.clone(),
            settings.membership.clone(),
        ));

        let registration_service = Arc::new(RegistrationService::new(
            member_repo.clone(),
            payment_service.clone(),
            object_store.clone(),
            settings.membership.clone(),
            settings.storage.clone(),
        ));

        let member_service = Arc::new(MemberService::new(
            member_repo.clone(),
            payment_repo.clone(),
            payment_service.clone(),
        ));

        let access_service = Arc::new(AccessService::new(access_token_repo.clone()));

        let password_reset_service = Arc::new(PasswordResetService::new(
            member_repo.clone(),
            PasswordResetStore::new(db_pool.clone()),
            auth_service.clone(),
            mailer.clone(),
            &settings.server.base_url,
            settings.auth.password_reset_ttl_minutes,
        ));

        Self {
            member_repo,
            access_token_repo,
            payment_repo,
            auth_service,
            object_store,
            mailer,
            payment_service,
            registration_service,
            member_service,
            access_service,
            password_reset_service,
            db_pool,
        }
    }
}
