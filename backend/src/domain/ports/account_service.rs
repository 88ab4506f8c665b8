//! Driving port for account use-cases.
//!
//! Inbound adapters call this trait to register, authenticate and manage
//! accounts without importing persistence or crypto adapters, so handler
//! tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::identity::{AuthSession, ExistenceCheck, IdentityError};
use crate::domain::{Account, AccountId, LoginRequest, ProfileUpdate, RegistrationRequest};

/// Domain use-case port for forum accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and sign a session token for it.
    async fn register(&self, request: RegistrationRequest) -> Result<AuthSession, IdentityError>;

    /// Verify credentials and sign a session token.
    async fn login(&self, request: LoginRequest) -> Result<AuthSession, IdentityError>;

    /// Report whether an identifier is registered.
    async fn exists(&self, identifier: &str) -> Result<ExistenceCheck, IdentityError>;

    /// Resolve a bearer token to the account id it was issued for.
    async fn authenticate(&self, token: &str) -> Result<AccountId, IdentityError>;

    /// Fetch the account behind an authenticated session.
    async fn current_account(&self, id: &AccountId) -> Result<Account, IdentityError>;

    /// Set avatar and bio and mark the profile complete.
    async fn complete_profile(
        &self,
        id: &AccountId,
        update: ProfileUpdate,
    ) -> Result<Account, IdentityError>;
}
