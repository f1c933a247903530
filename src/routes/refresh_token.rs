//! POST /refresh_token
//!
//! Reads the refresh token from its HTTP-only cookie, checks it against the
//! account's current token version, and answers with a new access token
//! while rotating the cookie.

use std::sync::Mutex;

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::account::AccountService;
use crate::auth::{CookieIssuer, RefreshTokenSink};
use crate::context::RequestContext;
use crate::error::{AppError, ErrorHandler};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub ok: bool,
    pub access_token: String,
}

/// Collects cookies so they can be attached to the actix response
struct CollectedCookies<'a> {
    issuer: &'a CookieIssuer,
    cookies: Mutex<Vec<Cookie<'static>>>,
}

impl<'a> CollectedCookies<'a> {
    fn new(issuer: &'a CookieIssuer) -> Self {
        Self {
            issuer,
            cookies: Mutex::new(Vec::new()),
        }
    }

    fn into_cookies(self) -> Vec<Cookie<'static>> {
        self.cookies.into_inner().unwrap_or_default()
    }

    fn push(&self, cookie: Cookie<'static>) {
        if let Ok(mut cookies) = self.cookies.lock() {
            cookies.push(cookie);
        }
    }
}

impl RefreshTokenSink for CollectedCookies<'_> {
    fn deliver(&self, refresh_token: &str) {
        self.push(self.issuer.refresh_cookie(refresh_token));
    }

    fn clear(&self) {
        self.push(self.issuer.removal_cookie());
    }
}

/// # Errors
/// - 401 MISSING_TOKEN: no refresh cookie
/// - 401 TOKEN_INVALID: bad signature, expired, unknown account or revoked
///
/// Error bodies carry the request id echoed in `x-request-id` as `error_id`.
pub async fn refresh_token(
    req: HttpRequest,
    service: web::Data<AccountService>,
    cookie_issuer: web::Data<CookieIssuer>,
) -> HttpResponse {
    let request_id = RequestContext::from_http(&req).request_id;
    let token = req
        .cookie(cookie_issuer.name())
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default();

    let sink = CollectedCookies::new(cookie_issuer.get_ref());
    let access_token = match service.refresh(&token, &sink).await {
        Ok(access_token) => access_token,
        Err(err) => return error_response(&err, &request_id),
    };

    let mut response = HttpResponse::Ok();
    for cookie in sink.into_cookies() {
        response.cookie(cookie);
    }

    response.json(RefreshResponse {
        ok: true,
        access_token,
    })
}

fn error_response(err: &AppError, request_id: &str) -> HttpResponse {
    err.log_error(request_id);
    let (status, body) = <AppError as ErrorHandler>::error_response(err, request_id);
    HttpResponse::build(status).json(body)
}
