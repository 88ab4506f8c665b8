//! Port for account persistence.
//!
//! The store is the authority for identifier uniqueness. Adapters must reject
//! a colliding email or phone atomically inside [`AccountRepository::create`]
//! and report it as [`AccountPersistenceError::UniqueViolation`] naming the
//! field, so the domain can translate a lost race into a conflict.

use async_trait::async_trait;

use crate::domain::{
    AccountId, EmailAddress, IdentifierKind, NewAccount, PhoneNumber, ProfileUpdate,
    StoredAccount,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// A unique identifier column already holds the value.
        UniqueViolation { field: IdentifierKind } => "account {field} already exists",
    }
}

/// Port for account storage and lookup by canonical identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fetch an account by id.
    async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError>;

    /// Fetch the account registered under a canonical email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError>;

    /// Fetch the account registered under a canonical phone number.
    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError>;

    /// Insert a new account.
    ///
    /// Fails with [`AccountPersistenceError::UniqueViolation`] when the email
    /// or phone is already registered.
    async fn create(&self, account: &NewAccount) -> Result<StoredAccount, AccountPersistenceError>;

    /// Replace profile fields and mark the profile complete.
    ///
    /// Returns `None` when no account has the id.
    async fn update_profile(
        &self,
        id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError>;
}
