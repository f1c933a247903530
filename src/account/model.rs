use async_graphql::{ComplexObject, Json, SimpleObject};
use chrono::{DateTime, Utc};

/// Stored account record
#[derive(Debug, Clone, PartialEq, SimpleObject, sqlx::FromRow)]
#[graphql(complex)]
pub struct Account {
    pub user_name: String,
    /// bcrypt hash, never exposed
    #[graphql(skip)]
    pub password: String,
    pub email: String,
    pub phone_number: String,
    pub token_version: i32,
    #[graphql(skip)]
    pub setting: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Account {
    /// Opaque client settings blob
    async fn setting(&self) -> Option<Json<serde_json::Value>> {
        self.setting.clone().map(Json)
    }
}

impl Account {
    /// Fresh record with token version 0, as created on registration
    pub fn new(
        user_name: impl Into<String>,
        password_hash: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
        setting: Option<serde_json::Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_name: user_name.into(),
            password: password_hash.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            token_version: 0,
            setting,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_name: String,
    pub password_hash: String,
    pub email: String,
    pub phone_number: String,
    pub setting: Option<serde_json::Value>,
}

impl From<NewAccount> for Account {
    fn from(new: NewAccount) -> Self {
        Account::new(
            new.user_name,
            new.password_hash,
            new.email,
            new.phone_number,
            new.setting,
        )
    }
}

/// Registration input shared by `register` and `registerMock`
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_name: String,
    pub password: String,
    pub email: String,
    pub phone_number: String,
}

/// Successful login payload
#[derive(Debug, Clone, SimpleObject)]
pub struct LoginProfile {
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    pub access_token: String,
    pub setting: Option<Json<serde_json::Value>>,
}
