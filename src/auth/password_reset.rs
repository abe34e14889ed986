use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use super::hash_token;

/// Reset tokens are stored hashed and consumed with one conditional update.
pub struct PasswordResetStore {
    pool: SqlitePool,
}

impl PasswordResetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        member_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO password_resets (id, member_id, token_hash, expires_at, used, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(member_id.to_string())
        .bind(hash_token(token))
        .bind(expires_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks the token used and returns its member, or `None` if the token is
    /// unknown, expired or already used.
    pub async fn consume(&self, token: &str) -> Result<Option<Uuid>> {
        let member_id = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE password_resets
            SET used = 1
            WHERE token_hash = ? AND used = 0 AND expires_at > ?
            RETURNING member_id
            "#
        )
        .bind(hash_token(token))
        .bind(Utc::now().naive_utc())
        .fetch_optional(&self.pool)
        .await?;

        member_id
            .map(|id| Uuid::parse_str(&id).map_err(|e| AppError::Database(e.to_string())))
            .transpose()
    }
}
