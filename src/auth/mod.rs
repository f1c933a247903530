//! Authentication module
//!
//! Handles JWT token issuance/validation, password hashing,
//! and refresh-token cookie delivery.

mod claims;
mod cookie;
mod jwt;
mod password;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use cookie::CookieIssuer;
pub use cookie::RefreshTokenSink;
pub use jwt::TokenIssuer;
pub use password::PasswordHasher;
