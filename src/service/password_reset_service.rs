use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    auth::{generate_token, AuthService, PasswordResetStore},
    email::{Mailer, OutgoingEmail},
    error::{AppError, Result},
    repository::MemberRepository,
};

pub struct PasswordResetService {
    member_repo: Arc<dyn MemberRepository>,
    store: PasswordResetStore,
    auth_service: Arc<AuthService>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
    ttl_minutes: i64,
}

impl PasswordResetService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        store: PasswordResetStore,
        auth_service: Arc<AuthService>,
        mailer: Arc<dyn Mailer>,
        base_url: &str,
        ttl_minutes: i64,
    ) -> Self {
        Self {
            member_repo,
            store,
            auth_service,
            mailer,
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl_minutes,
        }
    }

    /// Mails a reset link if the address belongs to a member. Unknown
    /// addresses succeed silently.
    pub async fn request(&self, email: &str) -> Result<()> {
        let email = email.trim();
        let Some(member) = self.member_repo.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_token();
        let expires_at = Utc::now() + Duration::minutes(self.ttl_minutes);
        self.store.create(member.id, &token, expires_at).await?;

        let link = format!("{}/reset-password?token={}", self.base_url, token);
        let body = format!(
            "Hello {},\n\nUse the link below to choose a new password. It expires in {} minutes.\n\n{}\n\nIf you did not ask for this, you can ignore this email.\n",
            member.first_name, self.ttl_minutes, link
        );

        self.mailer
            .send(OutgoingEmail {
                to: member.email.clone(),
                subject: "Reset your password".to_string(),
                body,
            })
            .await?;

        tracing::info!("Password reset sent to member {} via {}", member.id, self.mailer.name());
        Ok(())
    }

    pub async fn confirm(&self, token: &str, new_password: &str) -> Result<()> {
        if new_password.chars().count() < 8 {
            return Err(AppError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let member_id = self.store.consume(token.trim()).await?.ok_or_else(|| {
            AppError::BadRequest("This reset link is invalid or has expired".to_string())
        })?;

        let hash = AuthService::hash_password(new_password).await?;
        self.member_repo.update_password(member_id, &hash).await?;

        let revoked = self.auth_service.revoke_member_sessions(member_id).await?;
        tracing::info!(
            "Password reset for member {}; revoked {} sessions",
            member_id,
            revoked
        );
        Ok(())
    }
}
