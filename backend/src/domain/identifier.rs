//! Identifier normalisation.
//!
//! Users sign in with either an email address or a phone number. Raw input is
//! classified once at the boundary and turned into a typed [`Identifier`] in
//! canonical form; everything downstream (uniqueness probes, lookups, storage)
//! compares canonical values only.
//!
//! Phone handling is driven by a [`PhoneNumberingPlan`] so the same rules can
//! serve other regional plans:
//!
//! 1. strip every non-digit character (a leading `+` included);
//! 2. accept `<country code><national number>` as-is;
//! 3. replace the domestic trunk prefix with the country code;
//! 4. prepend the country code to a bare national mobile number;
//! 5. otherwise, when enabled, accept any digit string inside the plausible
//!    international length range unchanged.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest email address accepted (RFC 5321 path limit).
pub const EMAIL_MAX_LENGTH: usize = 254;

/// E.164 limit on the digits of an international phone number.
pub const PHONE_MAX_DIGITS: usize = 15;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Applied to the lowercased value; the domain needs at least one dot.
        let pattern = r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Which identifier field a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// Email address.
    Email,
    /// Phone number.
    Phone,
}

impl IdentifierKind {
    /// Field name used in error details and API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a raw identifier could not be normalised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// Input was empty once trimmed.
    #[error("identifier must not be empty")]
    Empty,
    /// Input looked like an email address but failed validation.
    #[error("identifier is not a valid email address")]
    InvalidEmail,
    /// Input did not reduce to a phone number under the numbering plan.
    #[error("identifier is not a valid phone number")]
    InvalidPhone,
    /// Input has the shape of the other identifier kind.
    #[error("identifier is not a valid {expected}")]
    KindMismatch {
        /// The kind the caller asked for.
        expected: IdentifierKind,
    },
}

/// Canonical email address: trimmed, lowercase and syntactically valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Accept a value that is already in canonical form (e.g. read back from
    /// storage). Rejects anything normalisation would have changed.
    pub fn parse_canonical(value: impl Into<String>) -> Result<Self, NormalizationError> {
        let value = value.into();
        let canonical = canonical_email(&value)?;
        if canonical.0 != value {
            return Err(NormalizationError::InvalidEmail);
        }
        Ok(canonical)
    }

    /// Borrow the canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Canonical phone number: ASCII digits only, international form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accept a stored canonical value: a non-empty digit string no longer
    /// than [`PHONE_MAX_DIGITS`].
    pub fn parse_canonical(value: impl Into<String>) -> Result<Self, NormalizationError> {
        let value = value.into();
        if value.is_empty()
            || value.len() > PHONE_MAX_DIGITS
            || !value.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(NormalizationError::InvalidPhone);
        }
        Ok(Self(value))
    }

    /// Borrow the canonical digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// A canonical login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Canonical email address.
    Email(EmailAddress),
    /// Canonical phone number.
    Phone(PhoneNumber),
}

impl Identifier {
    /// Which field this identifier is looked up by.
    #[must_use]
    pub const fn kind(&self) -> IdentifierKind {
        match self {
            Self::Email(_) => IdentifierKind::Email,
            Self::Phone(_) => IdentifierKind::Phone,
        }
    }

    /// Canonical string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(email) => email.as_str(),
            Self::Phone(phone) => phone.as_str(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when building a [`PhoneNumberingPlan`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberingPlanError {
    /// Country code was empty or contained non-digits.
    #[error("country code must be a non-empty digit string")]
    CountryCode,
    /// Trunk prefix contained non-digits.
    #[error("trunk prefix must contain digits only")]
    TrunkPrefix,
    /// National number length was zero.
    #[error("national number length must be positive")]
    NationalLength,
    /// Country code plus national number exceed the E.164 limit.
    #[error("country code and national number span {0} digits; at most 15 are allowed")]
    InternationalLength(usize),
    /// Mobile leading digits were empty or contained non-digits.
    #[error("mobile leading digits must be a non-empty digit string")]
    MobileLeadingDigits,
    /// International range was empty or inverted.
    #[error("international length range {min}..={max} is invalid")]
    InternationalRange {
        /// Requested lower bound.
        min: usize,
        /// Requested upper bound.
        max: usize,
    },
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Regional numbering rules used to canonicalise phone numbers.
///
/// The default plan is Rwanda: country code `250`, trunk prefix `0`, nine
/// digit national numbers whose mobile ranges start with `7`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumberingPlan {
    country_code: String,
    trunk_prefix: String,
    national_length: usize,
    mobile_leading_digits: String,
    international_min_length: usize,
    international_max_length: usize,
    accept_international_fallback: bool,
}

impl Default for PhoneNumberingPlan {
    fn default() -> Self {
        Self {
            country_code: "250".to_owned(),
            trunk_prefix: "0".to_owned(),
            national_length: 9,
            mobile_leading_digits: "7".to_owned(),
            international_min_length: 7,
            international_max_length: PHONE_MAX_DIGITS,
            accept_international_fallback: true,
        }
    }
}

impl PhoneNumberingPlan {
    /// Build a plan with the default mobile and international settings.
    ///
    /// # Examples
    /// ```
    /// use forum_backend::domain::PhoneNumberingPlan;
    ///
    /// let plan = PhoneNumberingPlan::new("44", "0", 10).expect("valid plan");
    /// assert_eq!(plan.country_code(), "44");
    /// assert_eq!(plan.international_length(), 12);
    /// ```
    pub fn new(
        country_code: impl Into<String>,
        trunk_prefix: impl Into<String>,
        national_length: usize,
    ) -> Result<Self, NumberingPlanError> {
        let country_code = country_code.into();
        let trunk_prefix = trunk_prefix.into();
        if country_code.is_empty() || !is_digits(&country_code) {
            return Err(NumberingPlanError::CountryCode);
        }
        if !is_digits(&trunk_prefix) {
            return Err(NumberingPlanError::TrunkPrefix);
        }
        if national_length == 0 {
            return Err(NumberingPlanError::NationalLength);
        }
        let international_length = country_code.len() + national_length;
        if international_length > PHONE_MAX_DIGITS {
            return Err(NumberingPlanError::InternationalLength(international_length));
        }
        Ok(Self {
            country_code,
            trunk_prefix,
            national_length,
            ..Self::default()
        })
    }

    /// Restrict bare national numbers to those starting with one of `digits`.
    pub fn with_mobile_leading_digits(
        mut self,
        digits: impl Into<String>,
    ) -> Result<Self, NumberingPlanError> {
        let digits = digits.into();
        if digits.is_empty() || !is_digits(&digits) {
            return Err(NumberingPlanError::MobileLeadingDigits);
        }
        self.mobile_leading_digits = digits;
        Ok(self)
    }

    /// Set the inclusive digit-length range accepted by the fallback rule.
    pub fn with_international_range(
        mut self,
        min: usize,
        max: usize,
    ) -> Result<Self, NumberingPlanError> {
        if min == 0 || min > max || max > PHONE_MAX_DIGITS {
            return Err(NumberingPlanError::InternationalRange { min, max });
        }
        self.international_min_length = min;
        self.international_max_length = max;
        Ok(self)
    }

    /// Enable or disable the best-effort international fallback.
    #[must_use]
    pub fn with_international_fallback(mut self, enabled: bool) -> Self {
        self.accept_international_fallback = enabled;
        self
    }

    /// Country calling code, digits only.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Domestic trunk prefix (may be empty for plans without one).
    #[must_use]
    pub fn trunk_prefix(&self) -> &str {
        &self.trunk_prefix
    }

    /// Digits in a national significant number.
    #[must_use]
    pub fn national_length(&self) -> usize {
        self.national_length
    }

    /// Total digits of a canonical in-plan number.
    #[must_use]
    pub fn international_length(&self) -> usize {
        self.country_code.len() + self.national_length
    }

    /// Whether out-of-plan numbers are accepted as best-effort international.
    #[must_use]
    pub fn accepts_international_fallback(&self) -> bool {
        self.accept_international_fallback
    }

    fn is_mobile_lead(&self, digits: &str) -> bool {
        digits
            .chars()
            .next()
            .is_some_and(|first| self.mobile_leading_digits.contains(first))
    }

    /// Canonicalise a digit-only string, or `None` when no rule applies.
    fn canonicalise(&self, digits: &str) -> Option<String> {
        let length = digits.len();

        if length == self.international_length() && digits.starts_with(&self.country_code) {
            return Some(digits.to_owned());
        }

        if !self.trunk_prefix.is_empty()
            && length == self.trunk_prefix.len() + self.national_length
        {
            if let Some(national) = digits.strip_prefix(self.trunk_prefix.as_str()) {
                return Some(format!("{}{national}", self.country_code));
            }
        }

        if length == self.national_length && self.is_mobile_lead(digits) {
            return Some(format!("{}{digits}", self.country_code));
        }

        let plausible = self.international_min_length..=self.international_max_length;
        if self.accept_international_fallback && plausible.contains(&length) {
            return Some(digits.to_owned());
        }

        None
    }
}

fn canonical_email(raw: &str) -> Result<EmailAddress, NormalizationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizationError::Empty);
    }
    if !looks_like_email(trimmed) {
        return Err(NormalizationError::KindMismatch {
            expected: IdentifierKind::Email,
        });
    }
    let lowered = trimmed.to_lowercase();
    if lowered.len() > EMAIL_MAX_LENGTH || !email_regex().is_match(&lowered) {
        return Err(NormalizationError::InvalidEmail);
    }
    Ok(EmailAddress(lowered))
}

/// Any value containing `@` is treated as an email candidate.
fn looks_like_email(raw: &str) -> bool {
    raw.contains('@')
}

/// Pure normaliser for raw identifier strings.
///
/// # Examples
/// ```
/// use forum_backend::domain::{Identifier, IdentifierNormalizer, PhoneNumberingPlan};
///
/// let normalizer = IdentifierNormalizer::new(PhoneNumberingPlan::default());
/// let phone = normalizer.normalize("078 123 4567").expect("domestic number");
/// assert_eq!(phone.as_str(), "250781234567");
///
/// let email = normalizer.normalize("  Ada@Example.COM ").expect("email");
/// assert!(matches!(email, Identifier::Email(_)));
/// assert_eq!(email.as_str(), "ada@example.com");
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentifierNormalizer {
    plan: PhoneNumberingPlan,
}

impl IdentifierNormalizer {
    /// Create a normaliser for the given numbering plan.
    #[must_use]
    pub fn new(plan: PhoneNumberingPlan) -> Self {
        Self { plan }
    }

    /// The numbering plan in use.
    #[must_use]
    pub fn plan(&self) -> &PhoneNumberingPlan {
        &self.plan
    }

    /// Classify `raw` by shape and canonicalise it.
    pub fn normalize(&self, raw: &str) -> Result<Identifier, NormalizationError> {
        if looks_like_email(raw) {
            self.normalize_email(raw).map(Identifier::Email)
        } else {
            self.normalize_phone(raw).map(Identifier::Phone)
        }
    }

    /// Canonicalise `raw` as the given kind, rejecting the other shape.
    pub fn normalize_as(
        &self,
        kind: IdentifierKind,
        raw: &str,
    ) -> Result<Identifier, NormalizationError> {
        match kind {
            IdentifierKind::Email => self.normalize_email(raw).map(Identifier::Email),
            IdentifierKind::Phone => self.normalize_phone(raw).map(Identifier::Phone),
        }
    }

    /// Canonicalise an email address.
    pub fn normalize_email(&self, raw: &str) -> Result<EmailAddress, NormalizationError> {
        canonical_email(raw)
    }

    /// Canonicalise a phone number under the configured plan.
    pub fn normalize_phone(&self, raw: &str) -> Result<PhoneNumber, NormalizationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NormalizationError::Empty);
        }
        if looks_like_email(trimmed) {
            return Err(NormalizationError::KindMismatch {
                expected: IdentifierKind::Phone,
            });
        }

        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(NormalizationError::InvalidPhone);
        }

        self.plan
            .canonicalise(&digits)
            .map(PhoneNumber)
            .ok_or(NormalizationError::InvalidPhone)
    }
}
