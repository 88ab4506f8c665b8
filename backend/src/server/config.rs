//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use forum_backend::domain::IdentifierNormalizer;
use forum_backend::domain::identity::IdentityPolicy;
use forum_backend::outbound::persistence::DbPool;
use forum_backend::outbound::security::JwtTokenIssuer;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) normalizer: IdentifierNormalizer,
    pub(crate) policy: IdentityPolicy,
    pub(crate) tokens: Arc<JwtTokenIssuer>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from resolved settings.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        normalizer: IdentifierNormalizer,
        policy: IdentityPolicy,
        tokens: JwtTokenIssuer,
    ) -> Self {
        Self {
            bind_addr,
            normalizer,
            policy,
            tokens: Arc::new(tokens),
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without one, accounts live in process memory and vanish on restart.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
