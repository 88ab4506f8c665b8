//! Identity resolver.
//!
//! Turns raw registration, login and existence-check input into decisions:
//! a registration plan ready for account creation, an authenticated account,
//! or a presence flag. Identifiers are normalised once here; the store only
//! ever sees canonical values.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::{IdentityError, IdentityPolicy, InputField};
use crate::domain::ports::{AccountRepository, PasswordHashError, PasswordHasher};
use crate::domain::{
    Account, DisplayName, EmailAddress, Identifier, IdentifierKind, IdentifierNormalizer,
    LoginRequest, NewAccount, Password, PasswordDigest, PhoneNumber, RegistrationRequest,
    StoredAccount,
};

/// Validated registration ready for [`AccountRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPlan {
    account: NewAccount,
}

impl RegistrationPlan {
    /// Borrow the account that will be created.
    #[must_use]
    pub fn new_account(&self) -> &NewAccount {
        &self.account
    }

    /// Take the account write model.
    #[must_use]
    pub fn into_new_account(self) -> NewAccount {
        self.account
    }
}

/// Result of an existence check. Carries nothing about the account itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExistenceCheck {
    /// Whether an account is registered under the identifier.
    pub exists: bool,
    /// Which identifier field was probed.
    pub field: IdentifierKind,
}

/// Whitespace-only values count as not supplied.
fn supplied(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

fn supplied_password(password: Option<&Password>) -> Option<&Password> {
    password.filter(|password| !password.expose().is_empty())
}

/// Applies the identity policy against an account store and hasher.
pub struct IdentityResolver<R, H> {
    accounts: Arc<R>,
    hasher: Arc<H>,
    normalizer: IdentifierNormalizer,
    policy: IdentityPolicy,
}

impl<R, H> Clone for IdentityResolver<R, H> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            hasher: Arc::clone(&self.hasher),
            normalizer: self.normalizer.clone(),
            policy: self.policy,
        }
    }
}

impl<R, H> IdentityResolver<R, H>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
{
    /// Create a resolver.
    pub fn new(
        accounts: Arc<R>,
        hasher: Arc<H>,
        normalizer: IdentifierNormalizer,
        policy: IdentityPolicy,
    ) -> Self {
        Self {
            accounts,
            hasher,
            normalizer,
            policy,
        }
    }

    /// Policy in force.
    pub fn policy(&self) -> &IdentityPolicy {
        &self.policy
    }

    /// Validate a registration and hash its password.
    ///
    /// Checks run in a fixed order and stop at the first failure: required
    /// fields, identifier presence, exclusivity, password strength, formats,
    /// uniqueness. Formats are all checked before the store is queried.
    pub async fn resolve_for_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationPlan, IdentityError> {
        let name = supplied(request.name.as_deref()).ok_or(IdentityError::MissingRequiredField {
            field: InputField::Name,
        })?;
        let password = supplied_password(request.password.as_ref()).ok_or(
            IdentityError::MissingRequiredField {
                field: InputField::Password,
            },
        )?;

        let email_raw = supplied(request.email.as_deref());
        let phone_raw = supplied(request.phone.as_deref());
        self.policy
            .check_identifiers(email_raw.is_some(), phone_raw.is_some())?;
        self.policy.check_password(password)?;

        let display_name = DisplayName::new(name).map_err(|_| IdentityError::InvalidFormat {
            field: InputField::Name,
        })?;
        let email = email_raw
            .map(|raw| self.normalizer.normalize_email(raw))
            .transpose()
            .map_err(|_| IdentityError::InvalidFormat {
                field: InputField::Email,
            })?;
        let phone = phone_raw
            .map(|raw| self.normalizer.normalize_phone(raw))
            .transpose()
            .map_err(|_| IdentityError::InvalidFormat {
                field: InputField::Phone,
            })?;

        self.ensure_available(email.as_ref(), phone.as_ref()).await?;

        let digest = self.hash(password).await?;
        let account = NewAccount::try_new(display_name, email, phone, digest)
            .map_err(|_| IdentityError::MissingIdentifier)?;
        debug!(
            has_email = account.email().is_some(),
            has_phone = account.phone().is_some(),
            "registration plan resolved"
        );
        Ok(RegistrationPlan { account })
    }

    /// Authenticate a login request.
    ///
    /// An unknown identifier still pays for one password verification against
    /// the hasher's decoy digest, and fails exactly like a wrong password.
    pub async fn resolve_for_login(&self, request: &LoginRequest) -> Result<Account, IdentityError> {
        let password =
            supplied_password(request.password.as_ref()).ok_or(IdentityError::MissingCredentials)?;
        let identifier = self.login_identifier(request)?;

        let Some(stored) = self.find(&identifier).await? else {
            let decoy = self.hasher.decoy_digest();
            // Same cost as the wrong-password path.
            if let Err(err) = self.verify(password, decoy).await {
                debug!(error = %err, "decoy verification failed");
            }
            debug!(kind = %identifier.kind(), "login rejected");
            return Err(IdentityError::InvalidCredentials);
        };

        if self
            .verify(password, stored.password_digest().clone())
            .await?
        {
            debug!(kind = %identifier.kind(), "login accepted");
            Ok(stored.into_account())
        } else {
            debug!(kind = %identifier.kind(), "login rejected");
            Err(IdentityError::InvalidCredentials)
        }
    }

    /// Report whether an account is registered under `raw`.
    pub async fn exists(&self, raw: &str) -> Result<ExistenceCheck, IdentityError> {
        let raw = supplied(Some(raw)).ok_or(IdentityError::MissingIdentifier)?;
        let identifier = self
            .normalizer
            .normalize(raw)
            .map_err(|_| IdentityError::InvalidFormat {
                field: InputField::Identifier,
            })?;
        let exists = self.find(&identifier).await?.is_some();
        Ok(ExistenceCheck {
            exists,
            field: identifier.kind(),
        })
    }

    /// Pick the lookup key: `identifier`, then `email`, then `phone`.
    fn login_identifier(&self, request: &LoginRequest) -> Result<Identifier, IdentityError> {
        if let Some(raw) = supplied(request.identifier.as_deref()) {
            return self
                .normalizer
                .normalize(raw)
                .map_err(|_| IdentityError::InvalidFormat {
                    field: InputField::Identifier,
                });
        }
        if let Some(raw) = supplied(request.email.as_deref()) {
            return self
                .normalizer
                .normalize_as(IdentifierKind::Email, raw)
                .map_err(|_| IdentityError::InvalidFormat {
                    field: InputField::Email,
                });
        }
        if let Some(raw) = supplied(request.phone.as_deref()) {
            return self
                .normalizer
                .normalize_as(IdentifierKind::Phone, raw)
                .map_err(|_| IdentityError::InvalidFormat {
                    field: InputField::Phone,
                });
        }
        Err(IdentityError::MissingIdentifier)
    }

    async fn find(&self, identifier: &Identifier) -> Result<Option<StoredAccount>, IdentityError> {
        let found = match identifier {
            Identifier::Email(email) => self.accounts.find_by_email(email).await?,
            Identifier::Phone(phone) => self.accounts.find_by_phone(phone).await?,
        };
        Ok(found)
    }

    /// Probe both identifiers concurrently. Both probes complete; an email
    /// conflict is reported ahead of a phone conflict.
    async fn ensure_available(
        &self,
        email: Option<&EmailAddress>,
        phone: Option<&PhoneNumber>,
    ) -> Result<(), IdentityError> {
        let email_probe = async {
            match email {
                Some(email) => self
                    .accounts
                    .find_by_email(email)
                    .await
                    .map(|found| found.is_some()),
                None => Ok(false),
            }
        };
        let phone_probe = async {
            match phone {
                Some(phone) => self
                    .accounts
                    .find_by_phone(phone)
                    .await
                    .map(|found| found.is_some()),
                None => Ok(false),
            }
        };

        let (email_taken, phone_taken) = tokio::join!(email_probe, phone_probe);
        if email_taken? {
            return Err(IdentityError::IdentifierTaken {
                field: IdentifierKind::Email,
            });
        }
        if phone_taken? {
            return Err(IdentityError::IdentifierTaken {
                field: IdentifierKind::Phone,
            });
        }
        Ok(())
    }

    async fn hash(&self, password: &Password) -> Result<PasswordDigest, IdentityError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.clone();
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))??;
        Ok(digest)
    }

    async fn verify(
        &self,
        password: &Password,
        digest: PasswordDigest,
    ) -> Result<bool, IdentityError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))??;
        Ok(matches)
    }
}
