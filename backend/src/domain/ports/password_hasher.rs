//! Port for password hashing and verification.

use crate::domain::{Password, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing the plaintext failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}",
    }
}

/// One-way password hashing.
///
/// Hashing is CPU bound; adapters are synchronous and callers decide whether
/// to move the work off the async executor.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest for `password`.
    fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError>;

    /// Check `password` against `digest`. A mismatch is `Ok(false)`.
    fn verify(
        &self,
        password: &Password,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError>;

    /// Digest of a random secret with the same cost parameters as real
    /// digests, verified against when no account matches a login.
    fn decoy_digest(&self) -> PasswordDigest;
}
