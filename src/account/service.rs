//! Account flows
//!
//! Every GraphQL resolver and the refresh route call into `AccountService`.
//! Each operation is a short sequential handler: validate, call the store,
//! hash or sign, shape the result.

use std::sync::Arc;

use async_graphql::Json;

use crate::account::model::{Account, LoginProfile, NewAccount, Registration};
use crate::account::store::AccountStore;
use crate::auth::{AccessClaims, PasswordHasher, RefreshTokenSink, TokenIssuer};
use crate::context::RequestContext;
use crate::error::{
    AppError, AuthError, CredentialField, DatabaseError, DuplicateScope,
};
use crate::validators::{is_valid_email, is_valid_phone_number, is_valid_user_name};

/// Marker returned by `delete`
pub const DELETE_DONE: &str = "done";

pub struct AccountService {
    store: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Authorization gate: the caller must present a valid access token.
    /// Rejections are not logged here; the caller logs them with context.
    ///
    /// # Errors
    /// `AuthError::Unauthorized` if the token is missing, expired or forged
    pub fn authorize(&self, ctx: &RequestContext) -> Result<AccessClaims, AppError> {
        let token = ctx
            .bearer_token
            .as_deref()
            .ok_or(AppError::Auth(AuthError::Unauthorized))?;

        self.tokens
            .verify_access_token(token)
            .map_err(|_| AppError::Auth(AuthError::Unauthorized))
    }

    /// Look an account up by userName
    pub async fn find(&self, user_name: &str) -> Result<Option<Account>, AppError> {
        Ok(self.store.find(user_name).await?)
    }

    /// Credential verification flow
    ///
    /// Unknown user and wrong password fail with the same error kind and
    /// message; only the field tag differs. On success the refresh token goes
    /// to `sink` and the access token comes back in the profile.
    pub async fn login(
        &self,
        user_name: &str,
        password: &str,
        sink: &dyn RefreshTokenSink,
    ) -> Result<LoginProfile, AppError> {
        let account = match self.store.find(user_name).await? {
            Some(account) => account,
            None => {
                self.hasher.verify_dummy(password).await;
                return Err(AppError::Auth(AuthError::InvalidCredentials(CredentialField::UserName)));
            }
        };

        if !self.hasher.verify(password, &account.password).await? {
            return Err(AppError::Auth(AuthError::InvalidCredentials(CredentialField::Password)));
        }

        let refresh_token = self.tokens.create_refresh_token(&account)?;
        let access_token = self.tokens.create_access_token(&account)?;
        sink.deliver(&refresh_token);

        tracing::info!(user_name = %account.user_name, "User logged in successfully");

        Ok(LoginProfile {
            user_name: account.user_name,
            email: account.email,
            phone_number: account.phone_number,
            access_token,
            setting: account.setting.map(Json),
        })
    }

    /// Always succeeds
    pub fn logout(&self, sink: &dyn RefreshTokenSink) -> bool {
        sink.clear();
        true
    }

    /// Registration flow: duplicate check on userName, email and phoneNumber
    pub async fn register(&self, registration: Registration) -> Result<Account, AppError> {
        let registration = validate_registration(registration)?;

        let taken = self
            .store
            .check_duplicate(
                &registration.user_name,
                &registration.email,
                &registration.phone_number,
            )
            .await?;
        if taken {
            return Err(AppError::Auth(AuthError::DuplicateAccount(DuplicateScope::Identity)));
        }

        self.create(registration, None, DuplicateScope::Identity).await
    }

    /// Seeding variant: duplicate check on userName only, and takes settings
    pub async fn register_mock(
        &self,
        registration: Registration,
        setting: Option<serde_json::Value>,
    ) -> Result<Account, AppError> {
        let registration = validate_registration(registration)?;

        if self.store.find(&registration.user_name).await?.is_some() {
            return Err(AppError::Auth(AuthError::DuplicateAccount(DuplicateScope::UserName)));
        }

        self.create(registration, setting, DuplicateScope::UserName).await
    }

    async fn create(
        &self,
        registration: Registration,
        setting: Option<serde_json::Value>,
        scope: DuplicateScope,
    ) -> Result<Account, AppError> {
        let password_hash = self.hasher.hash(&registration.password).await?;

        let new_account = NewAccount {
            user_name: registration.user_name,
            password_hash,
            email: registration.email,
            phone_number: registration.phone_number,
            setting,
        };

        match self.store.insert(new_account).await {
            Ok(account) => {
                tracing::info!(user_name = %account.user_name, "Account registered successfully");
                Ok(account)
            }
            // Lost a race against a concurrent registration
            Err(DatabaseError::UniqueConstraintViolation(_)) => {
                Err(AppError::Auth(AuthError::DuplicateAccount(scope)))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Invalidate every outstanding refresh token of `user_name`.
    ///
    /// Failures are reported as `false` only; details go to the log.
    pub async fn revoke_refresh_tokens(&self, user_name: &str) -> bool {
        match self.store.increment_token_version(user_name).await {
            Ok(Some(version)) => {
                tracing::info!(user_name = %user_name, token_version = version, "Refresh tokens revoked");
                true
            }
            Ok(None) => {
                tracing::warn!(user_name = %user_name, "Refresh token revocation for unknown user");
                false
            }
            Err(e) => {
                tracing::warn!(user_name = %user_name, error = %e, "Refresh token revocation failed");
                false
            }
        }
    }

    /// Remove the account. Reports `DELETE_DONE` whether or not it existed.
    pub async fn delete(&self, user_name: &str) -> Result<&'static str, AppError> {
        let removed = self.store.delete(user_name).await?;
        tracing::info!(user_name = %user_name, removed, "Account delete requested");
        Ok(DELETE_DONE)
    }

    /// Resolve a refresh token to its account, checking the token version
    ///
    /// # Errors
    /// - `AuthError::TokenInvalid` for a bad token or an unknown account
    /// - `AuthError::TokenRevoked` when the token version is stale
    pub async fn validate_refresh_token(&self, refresh_token: &str) -> Result<Account, AppError> {
        let claims = self.tokens.verify_refresh_token(refresh_token)?;

        let account = self
            .store
            .find(&claims.user_name)
            .await?
            .ok_or(AppError::Auth(AuthError::TokenInvalid))?;

        if !claims.matches_version(&account) {
            tracing::warn!(
                user_name = %account.user_name,
                token_version = claims.token_version,
                current_version = account.token_version,
                "Attempt to use revoked refresh token"
            );
            return Err(AppError::Auth(AuthError::TokenRevoked));
        }

        Ok(account)
    }

    /// Refresh flow: trade a valid refresh token for a new access token and
    /// a new refresh token delivered through `sink`
    pub async fn refresh(
        &self,
        refresh_token: &str,
        sink: &dyn RefreshTokenSink,
    ) -> Result<String, AppError> {
        if refresh_token.is_empty() {
            return Err(AppError::Auth(AuthError::MissingToken));
        }

        let account = self.validate_refresh_token(refresh_token).await?;

        let access_token = self.tokens.create_access_token(&account)?;
        sink.deliver(&self.tokens.create_refresh_token(&account)?);

        tracing::info!(user_name = %account.user_name, "Token refreshed successfully");
        Ok(access_token)
    }
}

fn validate_registration(registration: Registration) -> Result<Registration, AppError> {
    Ok(Registration {
        user_name: is_valid_user_name(&registration.user_name)?,
        email: is_valid_email(&registration.email)?,
        phone_number: is_valid_phone_number(&registration.phone_number)?,
        password: registration.password,
    })
}
