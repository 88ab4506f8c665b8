//! Registration policy: which identifiers are required and how strong a
//! password must be.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::IdentityError;
use crate::domain::Password;

/// Default minimum password length in characters.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// How many identifiers a registration must carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierRequirement {
    /// At least one of email or phone; both together are accepted.
    #[default]
    AnyOne,
    /// Exactly one of email or phone.
    ExactlyOne,
    /// Both email and phone.
    Both,
}

impl IdentifierRequirement {
    /// Configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnyOne => "any_one",
            Self::ExactlyOne => "exactly_one",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for IdentifierRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown requirement name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown identifier requirement `{0}`; expected any_one, exactly_one or both")]
pub struct ParseRequirementError(String);

impl FromStr for IdentifierRequirement {
    type Err = ParseRequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "any_one" | "any" | "either" => Ok(Self::AnyOne),
            "exactly_one" | "one" => Ok(Self::ExactlyOne),
            "both" => Ok(Self::Both),
            _ => Err(ParseRequirementError(s.to_owned())),
        }
    }
}

/// Registration policy applied by the identity resolver.
///
/// # Examples
/// ```
/// use forum_backend::domain::identity::{IdentifierRequirement, IdentityPolicy};
///
/// let policy = IdentityPolicy::new(IdentifierRequirement::ExactlyOne, 10);
/// assert!(policy.check_identifiers(true, false).is_ok());
/// assert!(policy.check_identifiers(true, true).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPolicy {
    requirement: IdentifierRequirement,
    min_password_length: usize,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        Self::new(IdentifierRequirement::default(), DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

impl IdentityPolicy {
    /// Build a policy.
    #[must_use]
    pub const fn new(requirement: IdentifierRequirement, min_password_length: usize) -> Self {
        Self {
            requirement,
            min_password_length,
        }
    }

    /// Identifier requirement.
    #[must_use]
    pub const fn requirement(&self) -> IdentifierRequirement {
        self.requirement
    }

    /// Minimum password length in characters.
    #[must_use]
    pub const fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Check identifier presence, then exclusivity.
    pub fn check_identifiers(&self, email: bool, phone: bool) -> Result<(), IdentityError> {
        match self.requirement {
            _ if !email && !phone => Err(IdentityError::MissingIdentifier),
            IdentifierRequirement::Both if !(email && phone) => {
                Err(IdentityError::MissingIdentifier)
            }
            IdentifierRequirement::ExactlyOne if email && phone => {
                Err(IdentityError::AmbiguousIdentifier)
            }
            _ => Ok(()),
        }
    }

    /// Check the password against the minimum length.
    pub fn check_password(&self, password: &Password) -> Result<(), IdentityError> {
        if password.char_len() < self.min_password_length {
            return Err(IdentityError::WeakPassword {
                min: self.min_password_length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(IdentifierRequirement::AnyOne, false, false, Err(IdentityError::MissingIdentifier))]
    #[case(IdentifierRequirement::AnyOne, true, false, Ok(()))]
    #[case(IdentifierRequirement::AnyOne, false, true, Ok(()))]
    #[case(IdentifierRequirement::AnyOne, true, true, Ok(()))]
    #[case(IdentifierRequirement::ExactlyOne, false, false, Err(IdentityError::MissingIdentifier))]
    #[case(IdentifierRequirement::ExactlyOne, true, false, Ok(()))]
    #[case(IdentifierRequirement::ExactlyOne, true, true, Err(IdentityError::AmbiguousIdentifier))]
    #[case(IdentifierRequirement::Both, true, false, Err(IdentityError::MissingIdentifier))]
    #[case(IdentifierRequirement::Both, false, false, Err(IdentityError::MissingIdentifier))]
    #[case(IdentifierRequirement::Both, true, true, Ok(()))]
    fn identifier_rules(
        #[case] requirement: IdentifierRequirement,
        #[case] email: bool,
        #[case] phone: bool,
        #[case] expected: Result<(), IdentityError>,
    ) {
        let policy = IdentityPolicy::new(requirement, DEFAULT_MIN_PASSWORD_LENGTH);
        assert_eq!(policy.check_identifiers(email, phone), expected);
    }

    #[rstest]
    #[case("short", false)]
    #[case("exactly8", true)]
    #[case("longer password", true)]
    fn password_minimum(#[case] raw: &str, #[case] ok: bool) {
        let policy = IdentityPolicy::default();
        let result = policy.check_password(&Password::new(raw));
        assert_eq!(result.is_ok(), ok);
    }

    #[rstest]
    #[case("any_one", IdentifierRequirement::AnyOne)]
    #[case("Exactly-One", IdentifierRequirement::ExactlyOne)]
    #[case(" both ", IdentifierRequirement::Both)]
    fn requirement_parses_from_config(
        #[case] raw: &str,
        #[case] expected: IdentifierRequirement,
    ) {
        assert_eq!(raw.parse::<IdentifierRequirement>(), Ok(expected));
    }

    #[rstest]
    fn unknown_requirement_is_rejected() {
        assert!("sometimes".parse::<IdentifierRequirement>().is_err());
    }
}
