//! Account use-cases behind the [`AccountService`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{ExistenceCheck, IdentityError, IdentityResolver};
use crate::domain::ports::{AccountRepository, AccountService, PasswordHasher, TokenIssuer};
use crate::domain::{Account, AccountId, LoginRequest, ProfileUpdate, RegistrationRequest};

/// A signed session token and the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Bearer token.
    pub token: String,
    /// Authenticated account.
    pub account: Account,
}

/// Default [`AccountService`] implementation.
pub struct AccountServiceImpl<R, H, T> {
    resolver: IdentityResolver<R, H>,
    accounts: Arc<R>,
    tokens: Arc<T>,
}

impl<R, H, T> AccountServiceImpl<R, H, T>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
    T: TokenIssuer,
{
    /// Create the service. `accounts` must be the store the resolver probes.
    pub fn new(resolver: IdentityResolver<R, H>, accounts: Arc<R>, tokens: Arc<T>) -> Self {
        Self {
            resolver,
            accounts,
            tokens,
        }
    }

    fn session(&self, account: Account) -> Result<AuthSession, IdentityError> {
        let token = self.tokens.issue(account.id())?;
        Ok(AuthSession { token, account })
    }
}

#[async_trait]
impl<R, H, T> AccountService for AccountServiceImpl<R, H, T>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
    T: TokenIssuer,
{
    async fn register(&self, request: RegistrationRequest) -> Result<AuthSession, IdentityError> {
        let plan = self.resolver.resolve_for_registration(&request).await?;
        // A concurrent registration may win between probe and insert; the
        // store's unique violation converts into `IdentifierTaken`.
        let stored = self
            .accounts
            .create(plan.new_account())
            .await
            .map_err(IdentityError::from)
            .inspect_err(|err| {
                if let IdentityError::IdentifierTaken { field } = err {
                    warn!(%field, "identifier claimed concurrently during registration");
                }
            })?;
        let account = stored.into_account();
        info!(account_id = %account.id(), "account registered");
        self.session(account)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthSession, IdentityError> {
        let account = self.resolver.resolve_for_login(&request).await?;
        self.session(account)
    }

    async fn exists(&self, identifier: &str) -> Result<ExistenceCheck, IdentityError> {
        self.resolver.exists(identifier).await
    }

    async fn authenticate(&self, token: &str) -> Result<AccountId, IdentityError> {
        self.tokens
            .verify(token)
            .map_err(|_| IdentityError::InvalidToken)
    }

    async fn current_account(&self, id: &AccountId) -> Result<Account, IdentityError> {
        self.accounts
            .find_by_id(id)
            .await?
            .map(|stored| stored.into_account())
            .ok_or(IdentityError::AccountNotFound)
    }

    async fn complete_profile(
        &self,
        id: &AccountId,
        update: ProfileUpdate,
    ) -> Result<Account, IdentityError> {
        let account = self
            .accounts
            .update_profile(id, &update)
            .await?
            .map(|stored| stored.into_account())
            .ok_or(IdentityError::AccountNotFound)?;
        info!(account_id = %account.id(), "profile completed");
        Ok(account)
    }
}
