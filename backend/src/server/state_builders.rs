//! Builders wiring adapters into the account service.

use std::sync::Arc;

use forum_backend::domain::identity::{AccountServiceImpl, IdentityResolver};
use forum_backend::domain::ports::{AccountRepository, AccountService};
use forum_backend::inbound::http::state::HttpState;
use forum_backend::outbound::memory::InMemoryAccountRepository;
use forum_backend::outbound::persistence::DieselAccountRepository;
use forum_backend::outbound::security::Argon2PasswordHasher;
use tracing::warn;

use super::ServerConfig;

fn build_service<R>(
    accounts: Arc<R>,
    hasher: Arc<Argon2PasswordHasher>,
    config: &ServerConfig,
) -> Arc<dyn AccountService>
where
    R: AccountRepository + 'static,
{
    let resolver = IdentityResolver::new(
        Arc::clone(&accounts),
        hasher,
        config.normalizer.clone(),
        config.policy,
    );
    Arc::new(AccountServiceImpl::new(
        resolver,
        accounts,
        Arc::clone(&config.tokens),
    ))
}

/// Build HTTP state, backed by PostgreSQL when a pool is configured.
///
/// # Errors
/// Returns [`std::io::Error`] when the password hasher cannot be initialised.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let hasher = Arc::new(
        Argon2PasswordHasher::new()
            .map_err(|err| std::io::Error::other(format!("password hasher: {err}")))?,
    );
    let accounts = match &config.db_pool {
        Some(pool) => build_service(
            Arc::new(DieselAccountRepository::new(pool.clone())),
            hasher,
            config,
        ),
        None => {
            warn!("no database configured; accounts are kept in memory");
            build_service(Arc::new(InMemoryAccountRepository::new()), hasher, config)
        }
    };
    Ok(HttpState::new(accounts))
}
