use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::generate_token,
    domain::*,
    error::Result,
    qr,
    repository::AccessTokenRepository,
};

#[derive(Debug, Clone, Serialize)]
pub struct IssuedAccessToken {
    pub token: String,
    pub qr_svg: String,
    pub qr_data_url: String,
    pub created_at: DateTime<Utc>,
}

pub struct AccessService {
    repo: Arc<dyn AccessTokenRepository>,
}

impl AccessService {
    pub fn new(repo: Arc<dyn AccessTokenRepository>) -> Self {
        Self { repo }
    }

    pub async fn issue(&self, member_id: Uuid) -> Result<IssuedAccessToken> {
        let token = generate_token();
        let record = self.repo.create(member_id, &token).await?;

        tracing::debug!("Issued access token {} for member {}", record.id, member_id);

        Ok(IssuedAccessToken {
            qr_svg: qr::render_svg(&token)?,
            qr_data_url: qr::render_data_url(&token)?,
            token,
            created_at: record.created_at,
        })
    }

    pub async fn list(&self, member_id: Uuid) -> Result<Vec<AccessToken>> {
        self.repo.list_by_member(member_id).await
    }

    /// Redeems a scanned token. Storage failures count as a rejection.
    pub async fn check_token(&self, token: &str) -> AccessDecision {
        let token = token.trim();
        if token.is_empty() {
            return AccessDecision::Invalid;
        }

        let decision = match self.repo.consume(token, Utc::now()).await {
            Ok(ConsumeResult::Consumed) => AccessDecision::Granted,
            Ok(ConsumeResult::AlreadyUsed) => AccessDecision::AlreadyUsed,
            Ok(ConsumeResult::NotFound) => AccessDecision::Invalid,
            Err(e) => {
                tracing::error!("Access token check failed: {}", e);
                AccessDecision::Invalid
            }
        };

        tracing::info!("Access scan: {}", decision.message());
        decision
    }
}
