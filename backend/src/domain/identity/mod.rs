//! Identity resolution and credential handling.
//!
//! [`IdentityResolver`] applies an [`IdentityPolicy`] to raw input using the
//! identifier normaliser and the account store; [`AccountServiceImpl`] wraps
//! it with account creation, token issuance and profile completion.

mod error;
mod policy;
mod resolver;
mod service;

pub use self::error::{IdentityError, InputField};
pub use self::policy::{
    DEFAULT_MIN_PASSWORD_LENGTH, IdentifierRequirement, IdentityPolicy, ParseRequirementError,
};
pub use self::resolver::{ExistenceCheck, IdentityResolver, RegistrationPlan};
pub use self::service::{AccountServiceImpl, AuthSession};
