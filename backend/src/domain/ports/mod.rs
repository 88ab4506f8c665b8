//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain reaches the account store, the
//! password hasher and the token signer. Each exposes a typed error enum so
//! adapters map their failures into predictable variants. The driving port
//! [`AccountService`] is what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod account_service;
mod password_hasher;
mod token_issuer;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountPersistenceError, AccountRepository};
#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::AccountService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
