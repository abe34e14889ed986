use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Credentials, IdentificationType, Member, MemberQuery, MembershipTier, NewMember,
        Payment, PaymentMethod,
    },
    error::{AppError, Result},
    repository::{payment_repository::insert_payment, MemberRepository},
};

const MEMBER_COLUMNS: &str = r#"
    id, email, first_name, last_name, name_lower, country, club,
    date_of_birth, place_of_birth, identification_type, identification_number,
    membership_type, activated_at, expires_at, upgraded_at, photo_url,
    id_photo_url, payment_method, transaction_id, is_admin, created_at, updated_at
"#;

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    name_lower: String,
    country: String,
    club: String,
    date_of_birth: NaiveDate,
    place_of_birth: String,
    identification_type: String,
    identification_number: String,
    membership_type: String,
    activated_at: NaiveDateTime,
    expires_at: NaiveDateTime,
    upgraded_at: Option<NaiveDateTime>,
    photo_url: String,
    id_photo_url: String,
    payment_method: String,
    transaction_id: Option<String>,
    is_admin: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CredentialsRow {
    id: String,
    password_hash: String,
}

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            name_lower: row.name_lower,
            country: row.country,
            club: row.club,
            date_of_birth: row.date_of_birth,
            place_of_birth: row.place_of_birth,
            identification_type: IdentificationType::parse(&row.identification_type).ok_or_else(
                || AppError::Database(format!("Invalid identification type: {}", row.identification_type)),
            )?,
            identification_number: row.identification_number,
            membership_type: MembershipTier::parse(&row.membership_type).ok_or_else(|| {
                AppError::Database(format!("Invalid membership type: {}", row.membership_type))
            })?,
            activated_at: DateTime::from_naive_utc_and_offset(row.activated_at, Utc),
            expires_at: DateTime::from_naive_utc_and_offset(row.expires_at, Utc),
            upgraded_at: row.upgraded_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            photo_url: row.photo_url,
            id_photo_url: row.id_photo_url,
            payment_method: PaymentMethod::parse(&row.payment_method).ok_or_else(|| {
                AppError::Database(format!("Invalid payment method: {}", row.payment_method))
            })?,
            transaction_id: row.transaction_id,
            is_admin: row.is_admin != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn fetch_where(&self, clause: &str, bind: Option<&str>) -> Result<Vec<Member>> {
        let sql = format!(
            "SELECT {} FROM members {} ORDER BY activated_at DESC",
            MEMBER_COLUMNS, clause
        );
        let mut query = sqlx::query_as::<_, MemberRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }
}

async fn insert_member(conn: &mut SqliteConnection, member: &NewMember) -> Result<()> {
    let now_naive = Utc::now().naive_utc();
    let expires_naive = crate::domain::one_year_after(member.activated_at).naive_utc();

    sqlx::query(
        r#"
        INSERT INTO members (
            id, email, password_hash, first_name, last_name, name_lower,
            country, club, date_of_birth, place_of_birth,
            identification_type, identification_number, membership_type,
            activated_at, expires_at, photo_url, id_photo_url,
            payment_method, transaction_id, is_admin, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(member.id.to_string())
    .bind(&member.email)
    .bind(&member.password_hash)
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(member.name_lower())
    .bind(&member.country)
    .bind(&member.club)
    .bind(member.date_of_birth)
    .bind(&member.place_of_birth)
    .bind(member.identification_type.as_str())
    .bind(&member.identification_number)
    .bind(member.membership_type.as_str())
    .bind(member.activated_at.naive_utc())
    .bind(expires_naive)
    .bind(&member.photo_url)
    .bind(&member.id_photo_url)
    .bind(member.payment_method.as_str())
    .bind(&member.transaction_id)
    .bind(if member.is_admin { 1i32 } else { 0i32 })
    .bind(now_naive)
    .bind(now_naive)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::from_insert(e, "Email or transaction already registered"))?;

    Ok(())
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn create(&self, member: NewMember) -> Result<Member> {
        let id = member.id;
        {
            let mut conn = self.pool.acquire().await?;
            insert_member(&mut conn, &member).await?;
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created member".to_string())
        })
    }

    async fn create_with_payment(&self, member: NewMember, payment: Payment) -> Result<Member> {
        let id = member.id;
        let mut tx = self.pool.begin().await?;
        insert_member(&mut tx, &member).await?;
        insert_payment(&mut tx, &payment).await?;
        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created member".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let sql = format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS);
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None)
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let sql = format!(
            "SELECT {} FROM members WHERE email = ? COLLATE NOCASE",
            MEMBER_COLUMNS
        );
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None)
        }
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, password_hash FROM members WHERE email = ? COLLATE NOCASE"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Credentials {
                member_id: Uuid::parse_str(&r.id).map_err(|e| AppError::Database(e.to_string()))?,
                password_hash: r.password_hash,
            })),
            None => Ok(None),
        }
    }

    async fn search(&self, query: &MemberQuery) -> Result<Vec<Member>> {
        match query {
            MemberQuery::All => self.fetch_where("", None).await,
            MemberQuery::Club(club) => self.fetch_where("WHERE club = ?", Some(club)).await,
            MemberQuery::PaymentMethod(method) => {
                self.fetch_where("WHERE payment_method = ?", Some(method.as_str())).await
            }
            MemberQuery::TransactionId(id) => {
                self.fetch_where("WHERE transaction_id = ?", Some(id)).await
            }
            MemberQuery::ActivatedBetween { start, end } => {
                let sql = format!(
                    "SELECT {} FROM members WHERE activated_at >= ? AND activated_at < ? ORDER BY activated_at DESC",
                    MEMBER_COLUMNS
                );
                let rows = sqlx::query_as::<_, MemberRow>(&sql)
                    .bind(start.naive_utc())
                    .bind(end.naive_utc())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                rows.into_iter().map(Self::row_to_member).collect()
            }
            MemberQuery::NamePrefix(prefix) => {
                let prefix = prefix.to_lowercase();
                let sql = format!(
                    "SELECT {} FROM members WHERE substr(name_lower, 1, ?) = ? ORDER BY name_lower ASC",
                    MEMBER_COLUMNS
                );
                let rows = sqlx::query_as::<_, MemberRow>(&sql)
                    .bind(prefix.chars().count() as i64)
                    .bind(&prefix)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                rows.into_iter().map(Self::row_to_member).collect()
            }
            MemberQuery::Text(term) => {
                // SQLite lower() only folds ASCII, so match accented names here
                let term = term.to_lowercase();
                let members = self.fetch_where("", None).await?;
                Ok(members.into_iter().filter(|m| m.matches_text(&term)).collect())
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn apply_upgrade(
        &self,
        id: Uuid,
        tier: MembershipTier,
        upgraded_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        payment: Payment,
    ) -> Result<Member> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE members
            SET membership_type = ?,
                upgraded_at = ?,
                expires_at = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(tier.as_str())
        .bind(upgraded_at.naive_utc())
        .bind(expires_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member not found".to_string()));
        }

        // Claims the transaction id; a reused charge rolls the tier change back
        insert_payment(&mut tx, &payment).await?;
        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated member".to_string())
        })
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE members SET password_hash = ?, updated_at = ? WHERE id = ?"
        )
        .bind(password_hash)
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member not found".to_string()));
        }

        Ok(())
    }
}
