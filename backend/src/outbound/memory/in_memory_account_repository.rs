//! Mutex-guarded account store.
//!
//! Uniqueness of email and phone is checked and claimed under one lock, so
//! this adapter gives the same single-winner guarantee as the database's
//! unique indexes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{AccountPersistenceError, AccountRepository};
use crate::domain::{
    AccountId, EmailAddress, IdentifierKind, NewAccount, PhoneNumber, ProfileUpdate,
    StoredAccount,
};

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<AccountId, StoredAccount>,
    by_email: HashMap<EmailAddress, AccountId>,
    by_phone: HashMap<PhoneNumber, AccountId>,
}

impl Accounts {
    fn lookup<K>(&self, index: &HashMap<K, AccountId>, key: &K) -> Option<StoredAccount>
    where
        K: std::hash::Hash + Eq,
    {
        index.get(key).and_then(|id| self.by_id.get(id)).cloned()
    }
}

/// Account store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    state: Mutex<Accounts>,
}

impl InMemoryAccountRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Accounts>, AccountPersistenceError> {
        self.state
            .lock()
            .map_err(|_| AccountPersistenceError::connection("account store lock poisoned"))
    }

    /// Number of stored accounts.
    pub fn len(&self) -> Result<usize, AccountPersistenceError> {
        Ok(self.lock()?.by_id.len())
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> Result<bool, AccountPersistenceError> {
        Ok(self.lock()?.by_id.is_empty())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        Ok(self.lock()?.by_id.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let state = self.lock()?;
        Ok(state.lookup(&state.by_email, email))
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let state = self.lock()?;
        Ok(state.lookup(&state.by_phone, phone))
    }

    async fn create(&self, account: &NewAccount) -> Result<StoredAccount, AccountPersistenceError> {
        let mut state = self.lock()?;
        if account
            .email()
            .is_some_and(|email| state.by_email.contains_key(email))
        {
            return Err(AccountPersistenceError::unique_violation(
                IdentifierKind::Email,
            ));
        }
        if account
            .phone()
            .is_some_and(|phone| state.by_phone.contains_key(phone))
        {
            return Err(AccountPersistenceError::unique_violation(
                IdentifierKind::Phone,
            ));
        }

        let stored = account.clone().into_stored();
        let id = *stored.account().id();
        if let Some(email) = account.email() {
            state.by_email.insert(email.clone(), id);
        }
        if let Some(phone) = account.phone() {
            state.by_phone.insert(phone.clone(), id);
        }
        state.by_id.insert(id, stored.clone());
        debug!(account_id = %id, "account stored in memory");
        Ok(stored)
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let mut state = self.lock()?;
        let Some(stored) = state.by_id.get_mut(id) else {
            return Ok(None);
        };
        let digest = stored.password_digest().clone();
        let mut account = stored.account().clone();
        account.complete_profile(update.clone());
        *stored = StoredAccount::new(account, digest);
        Ok(Some(stored.clone()))
    }
}
