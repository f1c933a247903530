//! JWT Claims structures
//!
//! Access and refresh tokens carry the account's public identity. The refresh
//! token additionally pins the account's `tokenVersion` at issue time.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::account::Account;

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// Claims carried by refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    pub token_version: i32,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl AccessClaims {
    /// Create access claims for an account
    ///
    /// # Arguments
    /// * `account` - Account the token is issued to
    /// * `expiry_seconds` - Token expiration in seconds from now
    /// * `issuer` - Issuer identifier
    pub fn new(account: &Account, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_name: account.user_name.clone(),
            email: account.email.clone(),
            phone_number: account.phone_number.clone(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }
}

impl RefreshClaims {
    pub fn new(account: &Account, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_name: account.user_name.clone(),
            email: account.email.clone(),
            phone_number: account.phone_number.clone(),
            token_version: account.token_version,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// True while the account has not been revoked since this token was issued
    pub fn matches_version(&self, account: &Account) -> bool {
        self.token_version == account.token_version
    }
}
