//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving port and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::AccountService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account use-cases.
    pub accounts: Arc<dyn AccountService>,
}

impl HttpState {
    /// Construct state from the account service.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use forum_backend::domain::identity::{AccountServiceImpl, IdentityPolicy, IdentityResolver};
    /// use forum_backend::domain::IdentifierNormalizer;
    /// use forum_backend::inbound::http::state::HttpState;
    /// use forum_backend::outbound::memory::InMemoryAccountRepository;
    /// use forum_backend::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer, TokenExpiry};
    ///
    /// let accounts = Arc::new(InMemoryAccountRepository::new());
    /// let hasher = Arc::new(Argon2PasswordHasher::new().expect("hasher"));
    /// let tokens = Arc::new(JwtTokenIssuer::new(b"secret", TokenExpiry::Never).expect("tokens"));
    /// let resolver = IdentityResolver::new(
    ///     Arc::clone(&accounts),
    ///     hasher,
    ///     IdentifierNormalizer::default(),
    ///     IdentityPolicy::default(),
    /// );
    /// let state = HttpState::new(Arc::new(AccountServiceImpl::new(resolver, accounts, tokens)));
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn new(accounts: Arc<dyn AccountService>) -> Self {
        Self { accounts }
    }
}
