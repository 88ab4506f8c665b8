//! Credential primitives and raw request inputs.
//!
//! Request types keep the caller's strings untouched; the identity resolver
//! decides what counts as present, normalises identifiers and applies policy.

use std::fmt;

use zeroize::Zeroizing;

/// Plaintext password held in zeroising memory.
///
/// Whitespace is preserved so credential comparisons behave as the user typed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a plaintext password.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Borrow the plaintext for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Opaque password digest produced by a [`crate::domain::ports::PasswordHasher`].
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest string (PHC format for the Argon2 adapter).
    #[must_use]
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Borrow the encoded digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

impl From<PasswordDigest> for String {
    fn from(value: PasswordDigest) -> Self {
        value.0
    }
}

/// Raw registration input.
///
/// # Examples
/// ```
/// use forum_backend::domain::RegistrationRequest;
///
/// let request = RegistrationRequest::new("Ada")
///     .with_phone("078 123 4567")
///     .with_password("correct horse");
/// assert_eq!(request.phone.as_deref(), Some("078 123 4567"));
/// assert!(request.email.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    /// Display name.
    pub name: Option<String>,
    /// Raw email address.
    pub email: Option<String>,
    /// Raw phone number.
    pub phone: Option<String>,
    /// Plaintext password.
    pub password: Option<Password>,
}

impl RegistrationRequest {
    /// Start a request with a display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the raw email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the raw phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Password::new(password));
        self
    }
}

/// Raw login input. `identifier` takes precedence over `email`, which takes
/// precedence over `phone`.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    /// Combined email-or-phone field.
    pub identifier: Option<String>,
    /// Explicit email field.
    pub email: Option<String>,
    /// Explicit phone field.
    pub phone: Option<String>,
    /// Plaintext password.
    pub password: Option<Password>,
}

impl LoginRequest {
    /// Login through the combined identifier field.
    #[must_use]
    pub fn with_identifier(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            password: Some(Password::new(password)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn secrets_are_redacted_in_debug_output() {
        let password = Password::new("hunter22");
        let digest = PasswordDigest::new("$argon2id$v=19$m=8,t=1,p=1$salt$hash");
        assert_eq!(format!("{password:?}"), "Password(..)");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(..)");
    }

    #[rstest]
    #[case("pässwörd", 8)]
    #[case("  spaced  ", 10)]
    fn password_length_counts_characters(#[case] raw: &str, #[case] expected: usize) {
        let password = Password::new(raw);
        assert_eq!(password.char_len(), expected);
        assert_eq!(password.expose(), raw);
    }

    #[rstest]
    fn login_helper_fills_identifier_only() {
        let request = LoginRequest::with_identifier("ada@example.com", "pw");
        assert_eq!(request.identifier.as_deref(), Some("ada@example.com"));
        assert!(request.email.is_none());
        assert!(request.phone.is_none());
        assert!(request.password.is_some());
    }
}
