use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentMethod, PaymentPurpose},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    member_id: String,
    amount_cents: i64,
    currency: String,
    payment_method: String,
    purpose: String,
    transaction_id: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            member_id: Uuid::parse_str(&row.member_id).map_err(|e| AppError::Database(e.to_string()))?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            payment_method: PaymentMethod::parse(&row.payment_method).ok_or_else(|| {
                AppError::Database(format!("Invalid payment method: {}", row.payment_method))
            })?,
            purpose: PaymentPurpose::parse(&row.purpose).ok_or_else(|| {
                AppError::Database(format!("Invalid payment purpose: {}", row.purpose))
            })?,
            transaction_id: row.transaction_id,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

/// Inserts a ledger row on `conn`, so callers can pair it with a member write
/// inside one transaction.
pub(crate) async fn insert_payment(conn: &mut SqliteConnection, payment: &Payment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, member_id, amount_cents, currency, payment_method,
            purpose, transaction_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(payment.id.to_string())
    .bind(payment.member_id.to_string())
    .bind(payment.amount_cents)
    .bind(&payment.currency)
    .bind(payment.payment_method.as_str())
    .bind(payment.purpose.as_str())
    .bind(&payment.transaction_id)
    .bind(payment.created_at.naive_utc())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::from_insert(e, "Payment has already been applied"))?;

    Ok(())
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: Payment) -> Result<Payment> {
        {
            let mut conn = self.pool.acquire().await?;
            insert_payment(&mut conn, &payment).await?;
        }

        self.find_by_id(payment.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created payment".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, member_id, amount_cents, currency, payment_method,
                   purpose, transaction_id, created_at
            FROM payments
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None)
        }
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, member_id, amount_cents, currency, payment_method,
                   purpose, transaction_id, created_at
            FROM payments
            WHERE member_id = ?
            ORDER BY created_at DESC
            "#
        )
        .bind(member_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_payment)
            .collect()
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, member_id, amount_cents, currency, payment_method,
                   purpose, transaction_id, created_at
            FROM payments
            WHERE transaction_id = ?
            "#
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None)
        }
    }
}
