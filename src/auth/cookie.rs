//! Refresh-token delivery
//!
//! Flows never touch an HTTP response directly. They write the refresh token
//! to a `RefreshTokenSink`, and each surface (GraphQL, plain actix route)
//! decides how the token reaches the client. For both surfaces this is the
//! HTTP-only cookie rendered by `CookieIssuer`.

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use crate::configuration::CookieSettings;

/// Out-of-band carrier for the refresh token
pub trait RefreshTokenSink: Send + Sync {
    /// Hand a freshly issued refresh token to the client
    fn deliver(&self, refresh_token: &str);

    /// Remove whatever refresh token the client holds
    fn clear(&self);
}

/// Renders refresh tokens as `Set-Cookie` values
#[derive(Clone, Debug)]
pub struct CookieIssuer {
    settings: CookieSettings,
    max_age_seconds: i64,
}

impl CookieIssuer {
    pub fn new(settings: CookieSettings, max_age_seconds: i64) -> Self {
        Self {
            settings,
            max_age_seconds,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Cookie carrying `refresh_token`
    pub fn refresh_cookie(&self, refresh_token: &str) -> Cookie<'static> {
        Cookie::build(self.settings.name.clone(), refresh_token.to_string())
            .path(self.settings.path.clone())
            .http_only(true)
            .secure(self.settings.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(self.max_age_seconds))
            .finish()
    }

    /// Empty cookie that expires immediately
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.settings.name.clone(), String::new())
            .path(self.settings.path.clone())
            .http_only(true)
            .secure(self.settings.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::ZERO)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> CookieIssuer {
        CookieIssuer::new(CookieSettings::default(), 604800)
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = issuer().refresh_cookie("token-value");

        assert_eq!(cookie.name(), "jid");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.path(), Some("/refresh_token"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604800)));

        let rendered = cookie.to_string();
        assert!(rendered.starts_with("jid=token-value"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = issuer().removal_cookie();

        assert_eq!(cookie.name(), "jid");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_secure_flag_follows_settings() {
        let settings = CookieSettings {
            secure: true,
            ..CookieSettings::default()
        };
        let cookie = CookieIssuer::new(settings, 60).refresh_cookie("t");

        assert_eq!(cookie.secure(), Some(true));
    }
}
