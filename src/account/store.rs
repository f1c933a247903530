//! Account persistence
//!
//! `AccountStore` is the seam between the account flows and storage.
//! Implementations must enforce userName uniqueness on insert themselves:
//! the duplicate check done by the flows is advisory and races with
//! concurrent registrations.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::account::model::{Account, NewAccount};
use crate::error::DatabaseError;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find(&self, user_name: &str) -> Result<Option<Account>, DatabaseError>;

    /// Insert a new record.
    ///
    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` when the userName is taken
    async fn insert(&self, account: NewAccount) -> Result<Account, DatabaseError>;

    /// Returns whether a record was removed
    async fn delete(&self, user_name: &str) -> Result<bool, DatabaseError>;

    /// True if any record shares the userName, email or phoneNumber
    async fn check_duplicate(
        &self,
        user_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<bool, DatabaseError>;

    /// Bump tokenVersion. Returns the new version, or `None` for an unknown user.
    async fn increment_token_version(&self, user_name: &str) -> Result<Option<i32>, DatabaseError>;
}

/// PostgreSQL-backed store over the `accounts` table
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find(&self, user_name: &str) -> Result<Option<Account>, DatabaseError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT user_name, password, email, phone_number, token_version, setting,
                   created_at, updated_at
            FROM accounts
            WHERE user_name = $1
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        let now = Utc::now();
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (user_name, password, email, phone_number, token_version,
                                  setting, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6, $7)
            RETURNING user_name, password, email, phone_number, token_version, setting,
                      created_at, updated_at
            "#,
        )
        .bind(&account.user_name)
        .bind(&account.password_hash)
        .bind(&account.email)
        .bind(&account.phone_number)
        .bind(&account.setting)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn delete(&self, user_name: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM accounts WHERE user_name = $1")
            .bind(user_name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_duplicate(
        &self,
        user_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM accounts
                WHERE user_name = $1 OR email = $2 OR phone_number = $3
            )
            "#,
        )
        .bind(user_name)
        .bind(email)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn increment_token_version(&self, user_name: &str) -> Result<Option<i32>, DatabaseError> {
        let version = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE accounts
            SET token_version = token_version + 1, updated_at = $1
            WHERE user_name = $2
            RETURNING token_version
            "#,
        )
        .bind(Utc::now())
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }
}
