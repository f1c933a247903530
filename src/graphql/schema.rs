use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, Json, Object, Result, Schema,
};

use crate::account::{Account, AccountService, LoginProfile, Registration};
use crate::auth::CookieIssuer;
use crate::context::RequestContext;
use crate::error::{AppError, ErrorContext};
use crate::graphql::cookie_sink::ResponseCookieSink;

pub type AccountSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema. Each request must carry a `RequestContext` in its data.
pub fn build_schema(service: Arc<AccountService>, cookies: CookieIssuer) -> AccountSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .data(cookies)
        .finish()
}

fn service<'a>(ctx: &'a Context<'_>) -> &'a AccountService {
    ctx.data_unchecked::<Arc<AccountService>>()
}

fn request_id(ctx: &Context<'_>) -> String {
    ctx.data_opt::<RequestContext>()
        .map(|request| request.request_id.clone())
        .unwrap_or_default()
}

/// Log once, then render with GraphQL extensions
fn to_graphql_error(
    ctx: &Context<'_>,
    operation: &str,
    user_name: &str,
    err: AppError,
) -> async_graphql::Error {
    ErrorContext::new(operation)
        .with_request_id(request_id(ctx))
        .with_user_name(user_name)
        .log_error(&err);
    err.extend()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Look up an account. Requires a bearer access token.
    async fn user_find(&self, ctx: &Context<'_>, user_name: String) -> Result<Option<Account>> {
        let request = ctx.data::<RequestContext>()?;
        let service = service(ctx);

        service
            .authorize(request)
            .map_err(|e| to_graphql_error(ctx, "userFind", &user_name, e))?;

        service
            .find(&user_name)
            .await
            .map_err(|e| to_graphql_error(ctx, "userFind", &user_name, e))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Bump the account's token version, invalidating its refresh tokens
    async fn revoke_refresh_token_for_user(&self, ctx: &Context<'_>, user_name: String) -> bool {
        service(ctx).revoke_refresh_tokens(&user_name).await
    }

    /// Verify credentials; sets the refresh-token cookie on success
    async fn login(
        &self,
        ctx: &Context<'_>,
        user_name: String,
        password: String,
    ) -> Result<LoginProfile> {
        let cookies = ctx.data_unchecked::<CookieIssuer>();
        let sink = ResponseCookieSink::new(ctx, cookies);

        service(ctx)
            .login(&user_name, &password, &sink)
            .await
            .map_err(|e| to_graphql_error(ctx, "login", &user_name, e))
    }

    /// Clear the refresh-token cookie
    async fn logout(&self, ctx: &Context<'_>) -> bool {
        let cookies = ctx.data_unchecked::<CookieIssuer>();
        service(ctx).logout(&ResponseCookieSink::new(ctx, cookies))
    }

    /// Create an account with custom settings, checking only the userName
    async fn register_mock(
        &self,
        ctx: &Context<'_>,
        user_name: String,
        password: String,
        email: String,
        phone_number: String,
        setting: Option<Json<serde_json::Value>>,
    ) -> Result<Account> {
        let registration = Registration {
            user_name: user_name.clone(),
            password,
            email,
            phone_number,
        };

        service(ctx)
            .register_mock(registration, setting.map(|json| json.0))
            .await
            .map_err(|e| to_graphql_error(ctx, "registerMock", &user_name, e))
    }

    /// Create an account; userName, email and phoneNumber must all be unused
    async fn register(
        &self,
        ctx: &Context<'_>,
        user_name: String,
        password: String,
        email: String,
        phone_number: String,
    ) -> Result<Account> {
        let registration = Registration {
            user_name: user_name.clone(),
            password,
            email,
            phone_number,
        };

        service(ctx)
            .register(registration)
            .await
            .map_err(|e| to_graphql_error(ctx, "register", &user_name, e))
    }

    /// Delete an account. Returns "done" whether or not it existed.
    async fn user_delete(&self, ctx: &Context<'_>, user_name: String) -> Result<String> {
        service(ctx)
            .delete(&user_name)
            .await
            .map(str::to_string)
            .map_err(|e| to_graphql_error(ctx, "userDelete", &user_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Request;
    use serde_json::{json, Value};

    use crate::account::MemoryAccountStore;
    use crate::auth::{PasswordHasher, TokenIssuer};
    use crate::configuration::{CookieSettings, JwtSettings};

    fn test_schema() -> AccountSchema {
        let jwt = JwtSettings {
            access_token_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_token_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        };
        let service = AccountService::new(
            Arc::new(MemoryAccountStore::new()),
            PasswordHasher::new(4).unwrap(),
            TokenIssuer::new(jwt.clone()),
        );
        build_schema(
            Arc::new(service),
            CookieIssuer::new(CookieSettings::default(), jwt.refresh_token_expiry),
        )
    }

    async fn execute(schema: &AccountSchema, query: &str, bearer: Option<&str>) -> async_graphql::Response {
        let ctx = RequestContext::new("test-request", bearer.map(str::to_string));
        schema.execute(Request::new(query).data(ctx)).await
    }

    const REGISTER_ALICE: &str = r#"mutation {
        register(userName: "alice", password: "pw1", email: "a@x.com", phoneNumber: "555") {
            userName email phoneNumber tokenVersion
        }
    }"#;

    const LOGIN_ALICE: &str = r#"mutation {
        login(userName: "alice", password: "pw1") { userName email phoneNumber accessToken setting }
    }"#;

    fn set_cookie_headers(response: &async_graphql::Response) -> Vec<String> {
        response
            .http_headers
            .get_all("set-cookie")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    fn error_extensions(response: &async_graphql::Response) -> Value {
        let error = response.errors.first().expect("expected an error");
        serde_json::to_value(error.extensions.as_ref().expect("expected extensions")).unwrap()
    }

    #[tokio::test]
    async fn register_returns_the_created_account() {
        let schema = test_schema();
        let response = execute(&schema, REGISTER_ALICE, None).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(
            data,
            json!({ "register": {
                "userName": "alice", "email": "a@x.com", "phoneNumber": "555", "tokenVersion": 0
            }})
        );
    }

    #[tokio::test]
    async fn register_twice_reports_duplicate_account() {
        let schema = test_schema();
        execute(&schema, REGISTER_ALICE, None).await;
        let response = execute(&schema, REGISTER_ALICE, None).await;

        assert_eq!(response.errors[0].message, "Already exist User!");
        let extensions = error_extensions(&response);
        assert_eq!(extensions["code"], "BAD_USER_INPUT");
        assert_eq!(extensions["error"]["userName"], "Already Exist User");
    }

    #[tokio::test]
    async fn login_sets_refresh_cookie_and_returns_access_token() {
        let schema = test_schema();
        execute(&schema, REGISTER_ALICE, None).await;

        let response = execute(&schema, LOGIN_ALICE, None).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let cookies = set_cookie_headers(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("jid="));
        assert!(cookies[0].contains("HttpOnly"));

        let data = response.data.into_json().unwrap();
        assert_eq!(data["login"]["userName"], "alice");
        assert_eq!(data["login"]["setting"], Value::Null);
        assert!(data["login"]["accessToken"].as_str().unwrap().len() > 20);
    }

    #[tokio::test]
    async fn login_failures_share_message_but_not_field_tag() {
        let schema = test_schema();
        execute(&schema, REGISTER_ALICE, None).await;

        let unknown = execute(
            &schema,
            r#"mutation { login(userName: "bob", password: "pw1") { userName } }"#,
            None,
        )
        .await;
        let wrong = execute(
            &schema,
            r#"mutation { login(userName: "alice", password: "wrong") { userName } }"#,
            None,
        )
        .await;

        assert_eq!(unknown.errors[0].message, "Wrong Credentials!");
        assert_eq!(wrong.errors[0].message, "Wrong Credentials!");
        assert_eq!(error_extensions(&unknown)["error"]["userName"], "Wrong Credentials!");
        assert_eq!(error_extensions(&wrong)["error"]["password"], "Wrong Credentials!");
        assert!(set_cookie_headers(&wrong).is_empty());
    }

    #[tokio::test]
    async fn user_find_requires_authentication() {
        let schema = test_schema();
        execute(&schema, REGISTER_ALICE, None).await;
        let query = r#"{ userFind(userName: "alice") { userName email } }"#;

        let anonymous = execute(&schema, query, None).await;
        assert_eq!(anonymous.errors[0].message, "not authenticated");
        assert_eq!(error_extensions(&anonymous)["code"], "UNAUTHENTICATED");

        let login = execute(&schema, LOGIN_ALICE, None).await.data.into_json().unwrap();
        let token = login["login"]["accessToken"].as_str().unwrap().to_string();

        let authorized = execute(&schema, query, Some(&token)).await;
        assert!(authorized.errors.is_empty(), "{:?}", authorized.errors);
        assert_eq!(
            authorized.data.into_json().unwrap(),
            json!({ "userFind": { "userName": "alice", "email": "a@x.com" } })
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[tokio::test]
    async fn rejected_user_find_is_logged_once() {
        let schema = test_schema();
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let query = r#"{ userFind(userName: "alice") { userName } }"#;
        execute(&schema, query, Some("forged-token")).await;

        let lines = logs.lines();
        assert_eq!(lines.len(), 1, "{:?}", lines);
        assert!(lines[0].contains("not authenticated"));
        assert!(lines[0].contains("userFind"));
    }

    #[tokio::test]
    async fn register_mock_stores_setting() {
        let schema = test_schema();
        let response = execute(
            &schema,
            r#"mutation {
                registerMock(userName: "mock", password: "pw", email: "m@x.com",
                             phoneNumber: "123", setting: { theme: "dark" }) { userName setting }
            }"#,
            None,
        )
        .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({ "registerMock": { "userName": "mock", "setting": { "theme": "dark" } } })
        );
    }

    #[tokio::test]
    async fn revoke_logout_and_delete() {
        let schema = test_schema();
        execute(&schema, REGISTER_ALICE, None).await;

        let revoke = execute(
            &schema,
            r#"mutation { ok: revokeRefreshTokenForUser(userName: "alice")
                          missing: revokeRefreshTokenForUser(userName: "nobody") }"#,
            None,
        )
        .await;
        assert_eq!(
            revoke.data.into_json().unwrap(),
            json!({ "ok": true, "missing": false })
        );

        let logout = execute(&schema, "mutation { logout }", None).await;
        let cookies = set_cookie_headers(&logout);
        assert!(cookies[0].starts_with("jid=;"));
        assert_eq!(logout.data.into_json().unwrap(), json!({ "logout": true }));

        let delete = execute(
            &schema,
            r#"mutation { a: userDelete(userName: "alice") b: userDelete(userName: "alice") }"#,
            None,
        )
        .await;
        assert_eq!(delete.data.into_json().unwrap(), json!({ "a": "done", "b": "done" }));
    }

    #[tokio::test]
    async fn account_type_exposes_no_password_field() {
        let schema = test_schema();
        let response = execute(&schema, r#"{ __type(name: "Account") { fields { name } } }"#, None).await;

        let data = response.data.into_json().unwrap();
        let fields: Vec<&str> = data["__type"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|field| field["name"].as_str())
            .collect();

        assert!(fields.contains(&"userName"));
        assert!(fields.contains(&"setting"));
        assert!(fields.contains(&"createdAt"));
        assert!(!fields.contains(&"password"));
    }
}
