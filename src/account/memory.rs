use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::account::model::{Account, NewAccount};
use crate::account::store::AccountStore;
use crate::error::DatabaseError;

/// In-process store for tests and local runs without Postgres.
/// Keyed by userName; the `entry` API makes insert-if-absent atomic.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<String, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find(&self, user_name: &str) -> Result<Option<Account>, DatabaseError> {
        Ok(self.accounts.get(user_name).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        match self.accounts.entry(account.user_name.clone()) {
            Entry::Occupied(_) => Err(DatabaseError::UniqueConstraintViolation(format!(
                "userName {} already registered",
                account.user_name
            ))),
            Entry::Vacant(slot) => {
                let account = Account::from(account);
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    async fn delete(&self, user_name: &str) -> Result<bool, DatabaseError> {
        Ok(self.accounts.remove(user_name).is_some())
    }

    async fn check_duplicate(
        &self,
        user_name: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<bool, DatabaseError> {
        Ok(self.accounts.iter().any(|entry| {
            let account = entry.value();
            account.user_name == user_name
                || account.email == email
                || account.phone_number == phone_number
        }))
    }

    async fn increment_token_version(&self, user_name: &str) -> Result<Option<i32>, DatabaseError> {
        Ok(self.accounts.get_mut(user_name).map(|mut entry| {
            let account = entry.value_mut();
            account.token_version += 1;
            account.updated_at = Utc::now();
            account.token_version
        }))
    }
}
