use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::error::{AppError, Result};
use super::hash_token;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub member_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionRow {
    id: String,
    member_id: String,
    expires_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        member_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let id = Uuid::new_v4().to_string();
        let token_hash = hash_token(token);
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO sessions (id, member_id, token_hash, expires_at, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(member_id.to_string())
        .bind(&token_hash)
        .bind(expires_at.naive_utc())
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(Session {
            id,
            member_id,
            expires_at,
            created_at: now,
        })
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let token_hash = hash_token(token);

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, member_id, expires_at, created_at
            FROM sessions
            WHERE token_hash = ? AND expires_at > ?
            "#
        )
        .bind(&token_hash)
        .bind(Utc::now().naive_utc())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Session> {
            Ok(Session {
                id: row.id,
                member_id: Uuid::parse_str(&row.member_id)
                    .map_err(|e| AppError::Database(e.to_string()))?,
                expires_at: DateTime::from_naive_utc_and_offset(row.expires_at, Utc),
                created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            })
        })
        .transpose()
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_by_member(&self, member_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE member_id = ?")
            .bind(member_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
