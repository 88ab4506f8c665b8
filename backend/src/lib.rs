//! Forum backend: identity resolution, credentials and profile completion.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the identifier
//! normalizer, the identity resolver and the account service together with
//! the ports they depend on. [`outbound`] implements those ports for
//! PostgreSQL, process memory, Argon2 and JWT. [`inbound`] exposes the
//! service over HTTP.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
