//! JWT Token Generation and Validation
//!
//! Access and refresh tokens are HS256 JWTs signed with separate secrets,
//! so one kind can never be replayed as the other.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;

use crate::account::Account;
use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Issues and verifies the token pair for an account
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtSettings,
}

impl TokenIssuer {
    pub fn new(config: JwtSettings) -> Self {
        Self { config }
    }

    /// Create a short-lived access token carrying userName, email and phoneNumber
    ///
    /// # Errors
    /// Returns error if token generation fails
    pub fn create_access_token(&self, account: &Account) -> Result<String, AppError> {
        let claims = AccessClaims::new(
            account,
            self.config.access_token_expiry,
            self.config.issuer.clone(),
        );
        sign(&claims, &self.config.access_token_secret)
    }

    /// Create a refresh token bound to the account's current token version
    pub fn create_refresh_token(&self, account: &Account) -> Result<String, AppError> {
        let claims = RefreshClaims::new(
            account,
            self.config.refresh_token_expiry,
            self.config.issuer.clone(),
        );
        sign(&claims, &self.config.refresh_token_secret)
    }

    /// Validate and extract claims from an access token
    ///
    /// # Errors
    /// Returns `AuthError::TokenInvalid` if the token is malformed, expired,
    /// signed with another key or issued by someone else
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        verify(token, &self.config.access_token_secret, &self.config.issuer)
    }

    /// Validate and extract claims from a refresh token
    ///
    /// Only checks the token itself; comparing the embedded token version
    /// against the stored account is up to the caller.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        verify(token, &self.config.refresh_token_secret, &self.config.issuer)
    }
}

fn sign<T: serde::Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str, issuer: &str) -> Result<T, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);

    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Auth(AuthError::TokenInvalid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_token_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_token_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn alice() -> Account {
        Account::new("alice", "$2b$04$hash", "a@x.com", "555", None)
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let issuer = TokenIssuer::new(get_test_config());

        let token = issuer.create_access_token(&alice()).expect("Failed to generate token");
        let claims = issuer.verify_access_token(&token).expect("Failed to validate token");

        assert_eq!(claims.user_name, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.phone_number, "555");
        assert_eq!(claims.iss, "test");
    }

    #[test]
    fn test_refresh_token_carries_version() {
        let issuer = TokenIssuer::new(get_test_config());
        let mut account = alice();
        account.token_version = 3;

        let token = issuer.create_refresh_token(&account).expect("Failed to generate token");
        let claims = issuer.verify_refresh_token(&token).expect("Failed to validate token");

        assert_eq!(claims.token_version, 3);
        assert_eq!(claims.user_name, "alice");
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let issuer = TokenIssuer::new(get_test_config());

        let access = issuer.create_access_token(&alice()).unwrap();
        let refresh = issuer.create_refresh_token(&alice()).unwrap();

        assert!(issuer.verify_refresh_token(&access).is_err());
        assert!(issuer.verify_access_token(&refresh).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let issuer = TokenIssuer::new(get_test_config());
        let result = issuer.verify_access_token("invalid.token.here");

        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenInvalid))));
    }

    #[test]
    fn test_tampered_token() {
        let issuer = TokenIssuer::new(get_test_config());
        let token = issuer.create_access_token(&alice()).unwrap();

        let tampered = format!("{}X", token);
        assert!(issuer.verify_access_token(&tampered).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let token = TokenIssuer::new(get_test_config())
            .create_access_token(&alice())
            .unwrap();

        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let result = TokenIssuer::new(config).verify_access_token(&token);

        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        let mut config = get_test_config();
        // Past jsonwebtoken's default 60s leeway
        config.access_token_expiry = -120;
        let issuer = TokenIssuer::new(config);

        let token = issuer.create_access_token(&alice()).unwrap();
        assert!(issuer.verify_access_token(&token).is_err());
    }
}
