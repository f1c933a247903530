//! Password Hashing and Verification
//!
//! bcrypt with a configurable work factor. Hashing is CPU bound, so every
//! call runs on tokio's blocking pool.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

/// bcrypt only looks at the first 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Compared against on unknown user names so that both login failure
    /// paths pay for one bcrypt verification.
    dummy_hash: String,
}

impl PasswordHasher {
    /// # Errors
    /// Returns error if `cost` is outside bcrypt's 4..=31 range
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash("account-service-dummy-password", cost)
            .map_err(|e| AppError::Internal(format!("Invalid bcrypt cost {}: {}", cost, e)))?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a password using bcrypt
    ///
    /// # Errors
    /// Returns error if:
    /// - Password is empty or longer than 72 bytes
    /// - Bcrypt hashing fails
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        validate_password(password)?;

        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    ///
    /// # Errors
    /// Returns error if the stored hash is malformed
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }

    /// Burn one verification against the dummy hash. The outcome is ignored.
    pub async fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash).await;
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_BYTES));
    }

    Ok(())
}
