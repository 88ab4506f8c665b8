//! Identity failure taxonomy and its mapping onto [`crate::domain::Error`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::domain::ports::{AccountPersistenceError, PasswordHashError, TokenError};
use crate::domain::{Error, IdentifierKind};

/// Input field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputField {
    /// Display name.
    Name,
    /// Password.
    Password,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Combined email-or-phone field.
    Identifier,
    /// Avatar reference.
    Avatar,
    /// Profile bio.
    Bio,
}

impl InputField {
    /// Field name as used in request payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Password => "password",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Identifier => "identifier",
            Self::Avatar => "avatar",
            Self::Bio => "bio",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<IdentifierKind> for InputField {
    fn from(kind: IdentifierKind) -> Self {
        match kind {
            IdentifierKind::Email => Self::Email,
            IdentifierKind::Phone => Self::Phone,
        }
    }
}

/// Outcome of a failed identity operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Name or password absent at registration.
    #[error("{field} is required")]
    MissingRequiredField {
        /// Missing field.
        field: InputField,
    },
    /// No identifier supplied, or fewer than the policy requires.
    #[error("an email address or phone number is required")]
    MissingIdentifier,
    /// Both identifiers supplied while the policy allows exactly one.
    #[error("provide either an email address or a phone number, not both")]
    AmbiguousIdentifier,
    /// A field failed format validation.
    #[error("{field} is not valid")]
    InvalidFormat {
        /// Offending field.
        field: InputField,
    },
    /// Password shorter than the policy minimum.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum length in characters.
        min: usize,
    },
    /// Identifier already belongs to another account.
    #[error("{field} is already registered")]
    IdentifierTaken {
        /// Colliding identifier kind.
        field: IdentifierKind,
    },
    /// Unknown account or wrong password; deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Password absent at login.
    #[error("password is required")]
    MissingCredentials,
    /// Bearer token missing, malformed or expired.
    #[error("invalid or missing token")]
    InvalidToken,
    /// Referenced account does not exist.
    #[error("account not found")]
    AccountNotFound,
    /// Account store failure.
    #[error(transparent)]
    Store(AccountPersistenceError),
    /// Password hashing failure.
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),
    /// Token signing failure.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl IdentityError {
    /// Stable snake_case code used in error details.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { .. } => "missing_required_field",
            Self::MissingIdentifier => "missing_identifier",
            Self::AmbiguousIdentifier => "ambiguous_identifier",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::WeakPassword { .. } => "weak_password",
            Self::IdentifierTaken { .. } => "identifier_taken",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidToken => "invalid_token",
            Self::AccountNotFound => "account_not_found",
            Self::Store(_) => "store",
            Self::Hashing(_) => "hashing",
            Self::Token(_) => "token",
        }
    }
}

/// Store-level uniqueness violations become [`IdentityError::IdentifierTaken`].
impl From<AccountPersistenceError> for IdentityError {
    fn from(err: AccountPersistenceError) -> Self {
        match err {
            AccountPersistenceError::UniqueViolation { field } => Self::IdentifierTaken { field },
            other => Self::Store(other),
        }
    }
}

impl From<IdentityError> for Error {
    fn from(err: IdentityError) -> Self {
        let reason = err.reason();
        match &err {
            IdentityError::MissingRequiredField { field }
            | IdentityError::InvalidFormat { field } => Error::invalid_request(err.to_string())
                .with_details(json!({ "field": field, "code": reason })),
            IdentityError::WeakPassword { min } => Error::invalid_request(err.to_string())
                .with_details(json!({ "field": InputField::Password, "code": reason, "min": min })),
            IdentityError::MissingIdentifier
            | IdentityError::AmbiguousIdentifier
            | IdentityError::MissingCredentials => {
                Error::invalid_request(err.to_string()).with_details(json!({ "code": reason }))
            }
            IdentityError::IdentifierTaken { field } => {
                Error::conflict(err.to_string()).with_details(json!({ "field": field }))
            }
            IdentityError::InvalidCredentials | IdentityError::InvalidToken => {
                Error::unauthorized(err.to_string())
            }
            IdentityError::AccountNotFound => Error::not_found(err.to_string()),
            IdentityError::Store(AccountPersistenceError::Connection { message }) => {
                error!(%message, "account store unavailable");
                Error::service_unavailable("account store unavailable")
            }
            IdentityError::Store(_) | IdentityError::Hashing(_) | IdentityError::Token(_) => {
                error!(error = %err, reason, "identity operation failed");
                Error::internal(err.to_string())
            }
        }
    }
}
