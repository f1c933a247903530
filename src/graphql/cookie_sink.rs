use async_graphql::Context;

use crate::auth::{CookieIssuer, RefreshTokenSink};

/// Writes refresh-token cookies into the GraphQL response headers
pub struct ResponseCookieSink<'a, 'ctx> {
    ctx: &'a Context<'ctx>,
    cookies: &'a CookieIssuer,
}

impl<'a, 'ctx> ResponseCookieSink<'a, 'ctx> {
    pub fn new(ctx: &'a Context<'ctx>, cookies: &'a CookieIssuer) -> Self {
        Self { ctx, cookies }
    }
}

impl RefreshTokenSink for ResponseCookieSink<'_, '_> {
    fn deliver(&self, refresh_token: &str) {
        let cookie = self.cookies.refresh_cookie(refresh_token);
        self.ctx.append_http_header("set-cookie", cookie.to_string());
    }

    fn clear(&self) {
        let cookie = self.cookies.removal_cookie();
        self.ctx.append_http_header("set-cookie", cookie.to_string());
    }
}
