//! Forum account model.
//!
//! An account is reachable through an email address, a phone number, or both.
//! Each identifier is globally unique when present; the storage layer holds
//! the authoritative constraint.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::credentials::PasswordDigest;
use super::identifier::{EmailAddress, PhoneNumber};

/// Maximum display name length in characters.
pub const DISPLAY_NAME_MAX: usize = 64;
/// Maximum bio length in characters.
pub const BIO_MAX: usize = 500;

/// Validation errors for account attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    /// Account id was not a UUID.
    #[error("account id must be a valid UUID")]
    InvalidId,
    /// Display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Display name exceeded [`DISPLAY_NAME_MAX`].
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Upper bound in characters.
        max: usize,
    },
    /// Avatar reference was not an absolute http(s) URL.
    #[error("avatar must be an absolute http or https URL")]
    InvalidAvatar,
    /// Bio exceeded [`BIO_MAX`].
    #[error("bio must be at most {max} characters")]
    BioTooLong {
        /// Upper bound in characters.
        max: usize,
    },
    /// Neither email nor phone was supplied.
    #[error("an account needs an email address or a phone number")]
    NoIdentifier,
}

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(Uuid);

impl AccountId {
    /// Parse an account id from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let id = id.as_ref();
        if id.trim() != id {
            return Err(AccountValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Generate a new random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Name shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an avatar image already stored by the upload service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarRef(Url);

impl AvatarRef {
    /// Parse an absolute `http`/`https` URL.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        let url = Url::parse(raw.trim()).map_err(|_| AccountValidationError::InvalidAvatar)?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            _ => Err(AccountValidationError::InvalidAvatar),
        }
    }

    /// Borrow the URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Free-form profile text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bio(String);

impl Bio {
    /// Validate the bio length; surrounding whitespace is dropped.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > BIO_MAX {
            return Err(AccountValidationError::BioTooLong { max: BIO_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A forum account as exposed to callers. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    display_name: DisplayName,
    email: Option<EmailAddress>,
    phone: Option<PhoneNumber>,
    profile_complete: bool,
    avatar: Option<AvatarRef>,
    bio: Option<Bio>,
}

/// Builder-style parts used to assemble an [`Account`] from storage rows.
#[derive(Debug, Clone)]
pub struct AccountParts {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub display_name: DisplayName,
    /// Canonical email, if any.
    pub email: Option<EmailAddress>,
    /// Canonical phone, if any.
    pub phone: Option<PhoneNumber>,
    /// Whether profile completion has run.
    pub profile_complete: bool,
    /// Avatar reference, if any.
    pub avatar: Option<AvatarRef>,
    /// Bio, if any.
    pub bio: Option<Bio>,
}

impl Account {
    /// Assemble an account, enforcing that at least one identifier exists.
    pub fn from_parts(parts: AccountParts) -> Result<Self, AccountValidationError> {
        let AccountParts {
            id,
            display_name,
            email,
            phone,
            profile_complete,
            avatar,
            bio,
        } = parts;
        if email.is_none() && phone.is_none() {
            return Err(AccountValidationError::NoIdentifier);
        }
        Ok(Self {
            id,
            display_name,
            email,
            phone,
            profile_complete,
            avatar,
            bio,
        })
    }

    /// Stable account id.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Canonical email address, if registered.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Canonical phone number, if registered.
    #[must_use]
    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Whether the user has completed their profile.
    #[must_use]
    pub fn profile_complete(&self) -> bool {
        self.profile_complete
    }

    /// Avatar reference, if set.
    #[must_use]
    pub fn avatar(&self) -> Option<&AvatarRef> {
        self.avatar.as_ref()
    }

    /// Bio, if set.
    #[must_use]
    pub fn bio(&self) -> Option<&Bio> {
        self.bio.as_ref()
    }

    /// Apply a profile completion in place.
    pub fn complete_profile(&mut self, update: ProfileUpdate) {
        self.avatar = update.avatar;
        self.bio = update.bio;
        self.profile_complete = true;
    }
}

/// Account record as held by the store, including the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    account: Account,
    password_digest: PasswordDigest,
}

impl StoredAccount {
    /// Pair an account with its digest.
    #[must_use]
    pub fn new(account: Account, password_digest: PasswordDigest) -> Self {
        Self {
            account,
            password_digest,
        }
    }

    /// Borrow the public account view.
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Digest used for credential verification.
    #[must_use]
    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    /// Drop the digest and keep the public account.
    #[must_use]
    pub fn into_account(self) -> Account {
        self.account
    }
}

/// Write model for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    id: AccountId,
    display_name: DisplayName,
    email: Option<EmailAddress>,
    phone: Option<PhoneNumber>,
    password_digest: PasswordDigest,
}

impl NewAccount {
    /// Build a creation request; at least one identifier is required.
    pub fn try_new(
        display_name: DisplayName,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        password_digest: PasswordDigest,
    ) -> Result<Self, AccountValidationError> {
        if email.is_none() && phone.is_none() {
            return Err(AccountValidationError::NoIdentifier);
        }
        Ok(Self {
            id: AccountId::random(),
            display_name,
            email,
            phone,
            password_digest,
        })
    }

    /// Id the account will be stored under.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Canonical email, if any.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Canonical phone, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Password digest.
    #[must_use]
    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    /// Materialise the stored record a fresh insert produces.
    #[must_use]
    pub fn into_stored(self) -> StoredAccount {
        let account = Account {
            id: self.id,
            display_name: self.display_name,
            email: self.email,
            phone: self.phone,
            profile_complete: false,
            avatar: None,
            bio: None,
        };
        StoredAccount::new(account, self.password_digest)
    }
}

/// Profile completion payload. A `None` avatar clears any previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New avatar reference.
    pub avatar: Option<AvatarRef>,
    /// New bio.
    pub bio: Option<Bio>,
}

/// JSON view of an account returned by the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// Account id.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,
    /// Canonical email, when registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Canonical phone, when registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "250781234567")]
    pub phone: Option<String>,
    /// Whether profile completion has run.
    pub profile_complete: bool,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Bio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            display_name: account.display_name.as_str().to_owned(),
            email: account.email.as_ref().map(|email| email.as_str().to_owned()),
            phone: account.phone.as_ref().map(|phone| phone.as_str().to_owned()),
            profile_complete: account.profile_complete,
            avatar: account.avatar.as_ref().map(|avatar| avatar.as_str().to_owned()),
            bio: account.bio.as_ref().map(|bio| bio.as_str().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn digest() -> PasswordDigest {
        PasswordDigest::new("$argon2id$v=19$stub")
    }

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse_canonical(raw).expect("canonical email")
    }

    #[rstest]
    #[case("", AccountValidationError::EmptyDisplayName)]
    #[case("   ", AccountValidationError::EmptyDisplayName)]
    fn blank_display_names_are_rejected(
        #[case] raw: &str,
        #[case] expected: AccountValidationError,
    ) {
        assert_eq!(DisplayName::new(raw), Err(expected));
    }

    #[rstest]
    fn display_name_is_trimmed_and_bounded() {
        assert_eq!(
            DisplayName::new("  Ada  ").expect("valid").as_str(),
            "Ada"
        );
        let too_long = "a".repeat(DISPLAY_NAME_MAX + 1);
        assert_eq!(
            DisplayName::new(too_long),
            Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            })
        );
    }

    #[rstest]
    #[case("https://cdn.example.com/a.png", true)]
    #[case("http://cdn.example.com/a.png", true)]
    #[case("ftp://cdn.example.com/a.png", false)]
    #[case("not a url", false)]
    fn avatar_requires_http_urls(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(AvatarRef::parse(raw).is_ok(), ok);
    }

    #[rstest]
    fn bio_is_bounded() {
        assert!(Bio::new("a".repeat(BIO_MAX)).is_ok());
        assert_eq!(
            Bio::new("a".repeat(BIO_MAX + 1)),
            Err(AccountValidationError::BioTooLong { max: BIO_MAX })
        );
    }

    #[rstest]
    fn new_account_requires_an_identifier() {
        let name = DisplayName::new("Ada").expect("name");
        assert_eq!(
            NewAccount::try_new(name, None, None, digest()),
            Err(AccountValidationError::NoIdentifier)
        );
    }

    #[rstest]
    fn fresh_account_starts_with_incomplete_profile() {
        let name = DisplayName::new("Ada").expect("name");
        let stored = NewAccount::try_new(name, Some(email("ada@example.com")), None, digest())
            .expect("valid")
            .into_stored();
        assert!(!stored.account().profile_complete());
        assert_eq!(stored.password_digest(), &digest());
    }

    #[rstest]
    fn complete_profile_replaces_avatar_and_bio() {
        let name = DisplayName::new("Ada").expect("name");
        let mut account = NewAccount::try_new(name, Some(email("ada@example.com")), None, digest())
            .expect("valid")
            .into_stored()
            .into_account();

        account.complete_profile(ProfileUpdate {
            avatar: Some(AvatarRef::parse("https://cdn.example.com/a.png").expect("url")),
            bio: Some(Bio::new("Grows maize").expect("bio")),
        });
        assert!(account.profile_complete());
        assert_eq!(account.bio().map(Bio::as_str), Some("Grows maize"));

        account.complete_profile(ProfileUpdate::default());
        assert!(account.avatar().is_none());
        assert!(account.profile_complete());
    }

    #[rstest]
    fn view_uses_camel_case_and_omits_missing_fields() {
        let name = DisplayName::new("Ada").expect("name");
        let account = NewAccount::try_new(name, Some(email("ada@example.com")), None, digest())
            .expect("valid")
            .into_stored()
            .into_account();
        let value = serde_json::to_value(AccountView::from(&account)).expect("serialise");
        assert_eq!(value["displayName"], "Ada");
        assert_eq!(value["profileComplete"], false);
        assert!(value.get("phone").is_none());
        assert!(value.get("passwordDigest").is_none());
    }

    #[rstest]
    fn account_id_rejects_padded_uuid() {
        let raw = format!(" {} ", Uuid::nil());
        assert_eq!(AccountId::new(raw), Err(AccountValidationError::InvalidId));
    }
}
