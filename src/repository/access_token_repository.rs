use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{AccessToken, ConsumeResult},
    error::{AppError, Result},
    repository::AccessTokenRepository,
};

#[derive(FromRow)]
struct AccessTokenRow {
    id: String,
    member_id: String,
    token: String,
    created_at: NaiveDateTime,
    used: i32,
    used_at: Option<NaiveDateTime>,
}

pub struct SqliteAccessTokenRepository {
    pool: SqlitePool,
}

impl SqliteAccessTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: AccessTokenRow) -> Result<AccessToken> {
        Ok(AccessToken {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id: Uuid::parse_str(&row.member_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            token: row.token,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            used: row.used != 0,
            used_at: row.used_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        })
    }
}

#[async_trait]
impl AccessTokenRepository for SqliteAccessTokenRepository {
    async fn create(&self, member_id: Uuid, token: &str) -> Result<AccessToken> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO access_tokens (id, member_id, token, created_at, used)
            VALUES (?, ?, ?, ?, 0)
            "#
        )
        .bind(id.to_string())
        .bind(member_id.to_string())
        .bind(token)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, "Access token already exists"))?;

        self.find_by_token(token).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created access token".to_string())
        })
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AccessToken>> {
        let row = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT id, member_id, token, created_at, used, used_at
            FROM access_tokens
            WHERE token = ?
            "#
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_token(r)?)),
            None => Ok(None)
        }
    }

    async fn list_by_member(&self, member_id: Uuid) -> Result<Vec<AccessToken>> {
        let rows = sqlx::query_as::<_, AccessTokenRow>(
            r#"
            SELECT id, member_id, token, created_at, used, used_at
            FROM access_tokens
            WHERE member_id = ?
            ORDER BY created_at DESC
            "#
        )
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_token)
            .collect()
    }

    async fn consume(&self, token: &str, at: DateTime<Utc>) -> Result<ConsumeResult> {
        // The WHERE used = 0 guard makes check-and-mark one step; two
        // concurrent scans cannot both see an affected row.
        let result = sqlx::query(
            r#"
            UPDATE access_tokens
            SET used = 1, used_at = ?
            WHERE token = ? AND used = 0
            "#
        )
        .bind(at.naive_utc())
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(ConsumeResult::Consumed);
        }

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM access_tokens WHERE token = ?"
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        if exists > 0 {
            Ok(ConsumeResult::AlreadyUsed)
        } else {
            Ok(ConsumeResult::NotFound)
        }
    }
}
