//! Port for session token issuance.

use crate::domain::AccountId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Signing the token failed.
        Signing { message: String } => "token signing failed: {message}",
        /// The presented token is malformed, tampered with or expired.
        Invalid { message: String } => "token rejected: {message}",
    }
}

/// Issues and checks opaque bearer tokens bound to an account id.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `account`.
    fn issue(&self, account: &AccountId) -> Result<String, TokenError>;

    /// Return the account id a token was issued for.
    fn verify(&self, token: &str) -> Result<AccountId, TokenError>;
}
