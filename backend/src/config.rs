//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `FORUM_*` environment variables and config
//! files. Every key is optional; accessors fall back to the defaults below and
//! validate the raw strings into domain types.

use std::fmt;
use std::net::{AddrParseError, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::identity::{
    DEFAULT_MIN_PASSWORD_LENGTH, IdentifierRequirement, IdentityPolicy, ParseRequirementError,
};
use crate::domain::{IdentifierNormalizer, NumberingPlanError, PhoneNumberingPlan};
use crate::outbound::security::{ParseTokenExpiryError, TokenExpiry};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_EXPIRY: &str = "7d";

/// Errors raised while turning raw settings into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        /// Raw configured value.
        value: String,
        /// Parser failure.
        source: AddrParseError,
    },
    /// `token_expiry` could not be parsed.
    #[error(transparent)]
    TokenExpiry(#[from] ParseTokenExpiryError),
    /// Phone plan keys describe an invalid plan.
    #[error("invalid phone numbering plan: {0}")]
    NumberingPlan(#[from] NumberingPlanError),
    /// `identifier_requirement` is not a known policy.
    #[error(transparent)]
    IdentifierRequirement(#[from] ParseRequirementError),
    /// `min_password_length` is zero.
    #[error("min_password_length must be positive")]
    MinPasswordLength,
}

/// Runtime configuration for the forum backend.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FORUM")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. When absent accounts live in process memory.
    pub database_url: Option<String>,
    /// HMAC secret for session tokens.
    pub jwt_secret: Option<String>,
    /// `never` or a duration such as `7d` or `12h`.
    pub token_expiry: Option<String>,
    /// Country calling code of the home numbering plan.
    pub phone_country_code: Option<String>,
    /// Domestic trunk prefix of the home numbering plan.
    pub phone_trunk_prefix: Option<String>,
    /// Digits in a national significant number.
    pub phone_national_length: Option<usize>,
    /// Leading digits that mark a bare national mobile number.
    pub phone_mobile_leading_digits: Option<String>,
    /// Accept out-of-plan numbers as best-effort international. Read from
    /// files and the environment only: a CLI switch could only ever turn it on.
    #[ortho_config(skip_cli)]
    pub phone_international_fallback: Option<bool>,
    /// `any_one`, `exactly_one` or `both`.
    pub identifier_requirement: Option<String>,
    /// Minimum password length in characters.
    pub min_password_length: Option<usize>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_expiry", &self.token_expiry)
            .field("phone_country_code", &self.phone_country_code)
            .field("phone_trunk_prefix", &self.phone_trunk_prefix)
            .field("phone_national_length", &self.phone_national_length)
            .field(
                "phone_mobile_leading_digits",
                &self.phone_mobile_leading_digits,
            )
            .field(
                "phone_international_fallback",
                &self.phone_international_fallback,
            )
            .field("identifier_requirement", &self.identifier_requirement)
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

impl AppSettings {
    /// Address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| SettingsError::BindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured token secret, ignoring blank values.
    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }

    /// Token lifetime, defaulting to seven days.
    pub fn token_expiry(&self) -> Result<TokenExpiry, SettingsError> {
        let raw = self.token_expiry.as_deref().unwrap_or(DEFAULT_TOKEN_EXPIRY);
        Ok(raw.parse()?)
    }

    /// Home numbering plan. Unset keys keep the Rwanda defaults.
    pub fn numbering_plan(&self) -> Result<PhoneNumberingPlan, SettingsError> {
        let defaults = PhoneNumberingPlan::default();
        let mut plan = PhoneNumberingPlan::new(
            self.phone_country_code
                .as_deref()
                .unwrap_or_else(|| defaults.country_code()),
            self.phone_trunk_prefix
                .as_deref()
                .unwrap_or_else(|| defaults.trunk_prefix()),
            self.phone_national_length
                .unwrap_or_else(|| defaults.national_length()),
        )?;
        if let Some(digits) = self.phone_mobile_leading_digits.as_deref() {
            plan = plan.with_mobile_leading_digits(digits)?;
        }
        if let Some(enabled) = self.phone_international_fallback {
            plan = plan.with_international_fallback(enabled);
        }
        Ok(plan)
    }

    /// Identifier normalizer for the configured plan.
    pub fn normalizer(&self) -> Result<IdentifierNormalizer, SettingsError> {
        Ok(IdentifierNormalizer::new(self.numbering_plan()?))
    }

    /// Registration policy.
    pub fn identity_policy(&self) -> Result<IdentityPolicy, SettingsError> {
        let requirement = match self.identifier_requirement.as_deref() {
            Some(raw) => raw.parse()?,
            None => IdentifierRequirement::default(),
        };
        let min = self
            .min_password_length
            .unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH);
        if min == 0 {
            return Err(SettingsError::MinPasswordLength);
        }
        Ok(IdentityPolicy::new(requirement, min))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;
    use std::time::Duration;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 11] = [
        "FORUM_BIND_ADDR",
        "FORUM_DATABASE_URL",
        "FORUM_JWT_SECRET",
        "FORUM_TOKEN_EXPIRY",
        "FORUM_PHONE_COUNTRY_CODE",
        "FORUM_PHONE_TRUNK_PREFIX",
        "FORUM_PHONE_NATIONAL_LENGTH",
        "FORUM_PHONE_MOBILE_LEADING_DIGITS",
        "FORUM_PHONE_INTERNATIONAL_FALLBACK",
        "FORUM_IDENTIFIER_REQUIREMENT",
        "FORUM_MIN_PASSWORD_LENGTH",
    ];

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| (*value).to_owned());
                (*key, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("forum-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("constant parses")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.jwt_secret().is_none());
        assert_eq!(
            settings.token_expiry().expect("default expiry"),
            TokenExpiry::After(Duration::from_secs(7 * 24 * 60 * 60))
        );
        assert_eq!(
            settings.numbering_plan().expect("default plan"),
            PhoneNumberingPlan::default()
        );
        assert_eq!(
            settings.identity_policy().expect("default policy"),
            IdentityPolicy::default()
        );
    }

    #[rstest]
    fn unset_fallback_keeps_international_numbers_accepted() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.phone_international_fallback, None);
        let identifier = settings
            .normalizer()
            .expect("default normalizer")
            .normalize("+1 (555) 123-4567")
            .expect("international number accepted");
        assert_eq!(identifier.as_str(), "15551234567");
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn fallback_follows_the_environment(#[case] raw: &str, #[case] expected: bool) {
        let _guard = lock_env(env_with(&[("FORUM_PHONE_INTERNATIONAL_FALLBACK", raw)]));

        let plan = load_from_empty_args().numbering_plan().expect("plan");
        assert_eq!(plan.accepts_international_fallback(), expected);
    }

    #[rstest]
    fn plan_longer_than_e164_is_rejected() {
        let _guard = lock_env(env_with(&[("FORUM_PHONE_NATIONAL_LENGTH", "13")]));

        let err = load_from_empty_args()
            .numbering_plan()
            .expect_err("sixteen-digit plan");
        assert!(matches!(
            err,
            SettingsError::NumberingPlan(NumberingPlanError::InternationalLength(16))
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("FORUM_BIND_ADDR", "127.0.0.1:9000"),
            ("FORUM_DATABASE_URL", "postgres://forum@localhost/forum"),
            ("FORUM_JWT_SECRET", "s3cret"),
            ("FORUM_TOKEN_EXPIRY", "never"),
            ("FORUM_PHONE_NATIONAL_LENGTH", "10"),
            ("FORUM_PHONE_INTERNATIONAL_FALLBACK", "false"),
            ("FORUM_IDENTIFIER_REQUIREMENT", "exactly_one"),
            ("FORUM_MIN_PASSWORD_LENGTH", "12"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal parses")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://forum@localhost/forum")
        );
        assert_eq!(settings.jwt_secret(), Some("s3cret"));
        assert_eq!(settings.token_expiry().expect("expiry"), TokenExpiry::Never);

        let plan = settings.numbering_plan().expect("plan");
        assert_eq!(plan.country_code(), "250");
        assert_eq!(plan.national_length(), 10);
        assert!(!plan.accepts_international_fallback());

        let policy = settings.identity_policy().expect("policy");
        assert_eq!(policy.requirement(), IdentifierRequirement::ExactlyOne);
        assert_eq!(policy.min_password_length(), 12);
    }

    #[rstest]
    #[case("FORUM_BIND_ADDR", "not-an-address")]
    #[case("FORUM_TOKEN_EXPIRY", "0s")]
    #[case("FORUM_PHONE_COUNTRY_CODE", "two-five-zero")]
    #[case("FORUM_IDENTIFIER_REQUIREMENT", "neither")]
    #[case("FORUM_MIN_PASSWORD_LENGTH", "0")]
    fn invalid_values_surface_as_settings_errors(#[case] key: &str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(key, value)]));

        let settings = load_from_empty_args();
        let failed = settings.bind_addr().is_err()
            || settings.token_expiry().is_err()
            || settings.numbering_plan().is_err()
            || settings.identity_policy().is_err();
        assert!(failed, "{key}={value} should be rejected");
    }

    #[rstest]
    fn blank_secret_counts_as_missing() {
        let _guard = lock_env(env_with(&[("FORUM_JWT_SECRET", "   ")]));

        assert!(load_from_empty_args().jwt_secret().is_none());
    }
}
