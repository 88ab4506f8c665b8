//! Domain primitives, policy and use-cases.
//!
//! Purpose: define strongly typed identities and credentials for the forum
//! and the rules that resolve them. Nothing here performs I/O directly; the
//! store, hasher and token signer are reached through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - Identifier, IdentifierNormalizer, PhoneNumberingPlan: canonical
//!   email and phone values.
//! - Account and friends: the account model.
//! - identity: resolver, policy and the account service.

pub mod account;
pub mod credentials;
pub mod error;
pub mod identifier;
pub mod identity;
pub mod ports;
pub mod trace_id;

pub use self::account::{
    Account, AccountId, AccountParts, AccountValidationError, AccountView, AvatarRef, Bio,
    DisplayName, NewAccount, ProfileUpdate, StoredAccount,
};
pub use self::credentials::{LoginRequest, Password, PasswordDigest, RegistrationRequest};
pub use self::error::{Error, ErrorCode};
pub use self::identifier::{
    EmailAddress, Identifier, IdentifierKind, IdentifierNormalizer, NormalizationError,
    NumberingPlanError, PhoneNumber, PhoneNumberingPlan,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use forum_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
