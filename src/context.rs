//! Per-request context handed to GraphQL resolvers and the authorization gate

use actix_web::{HttpMessage, HttpRequest};

/// Request id assigned by `LoggerMiddleware`
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    /// Raw access token from `Authorization: Bearer <token>`
    pub bearer_token: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            request_id: request_id.into(),
            bearer_token,
        }
    }

    pub fn from_http(req: &HttpRequest) -> Self {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let bearer_token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_bearer);

        Self {
            request_id,
            bearer_token,
        }
    }
}

/// Token part of an `Authorization` header value, i.e. whatever follows the
/// first space. The scheme word itself is not checked.
fn parse_bearer(header: &str) -> Option<String> {
    header
        .split_once(' ')
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
