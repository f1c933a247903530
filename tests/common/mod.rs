#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use account_service::account::{AccountService, MemoryAccountStore};
use account_service::auth::{CookieIssuer, PasswordHasher, TokenIssuer};
use account_service::configuration::{CookieSettings, JwtSettings};
use account_service::startup::run;
use serde_json::{json, Value};

pub struct TestApp {
    pub address: String,
    pub service: Arc<AccountService>,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_token_secret: "integration-access-secret-at-least-32-chars".to_string(),
        refresh_token_secret: "integration-refresh-secret-at-least-32-chars".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        issuer: "account-service-test".to_string(),
    }
}

/// Starts the server on a random port over a fresh in-memory store
pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let jwt = jwt_settings();
    let service = Arc::new(AccountService::new(
        Arc::new(MemoryAccountStore::new()),
        PasswordHasher::new(4).expect("Failed to build hasher"),
        TokenIssuer::new(jwt.clone()),
    ));
    let cookie_issuer = CookieIssuer::new(CookieSettings::default(), jwt.refresh_token_expiry);

    let server = run(listener, service.clone(), cookie_issuer, true).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, service }
}

impl TestApp {
    pub async fn post_graphql(&self, query: &str, bearer: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new()
            .post(&format!("{}/graphql", &self.address))
            .json(&json!({ "query": query }));

        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_refresh(&self, cookie: Option<&str>) -> reqwest::Response {
        let mut request = reqwest::Client::new().post(&format!("{}/refresh_token", &self.address));

        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }

        request.send().await.expect("Failed to execute request.")
    }

    pub async fn register(&self, user_name: &str, password: &str, email: &str, phone_number: &str) -> Value {
        let query = format!(
            r#"mutation {{ register(userName: "{}", password: "{}", email: "{}", phoneNumber: "{}") {{ userName email phoneNumber tokenVersion }} }}"#,
            user_name, password, email, phone_number
        );
        self.post_graphql(&query, None)
            .await
            .json()
            .await
            .expect("Failed to parse response")
    }

    /// Logs in and returns the response body and the `name=value` part of the
    /// refresh cookie
    pub async fn login(&self, user_name: &str, password: &str) -> (Value, Option<String>) {
        let query = format!(
            r#"mutation {{ login(userName: "{}", password: "{}") {{ userName email phoneNumber accessToken }} }}"#,
            user_name, password
        );
        let response = self.post_graphql(&query, None).await;
        let cookie = refresh_cookie(&response);
        let body = response.json().await.expect("Failed to parse response");
        (body, cookie)
    }
}

/// `jid=<token>` from the response's `Set-Cookie` headers
pub fn refresh_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with("jid="))
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .last()
}
