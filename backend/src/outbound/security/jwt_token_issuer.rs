//! HS256 JWT adapter for the [`TokenIssuer`] port.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::AccountId;

/// Token lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenExpiry {
    /// Tokens carry no `exp` claim.
    Never,
    /// Tokens expire after the given duration.
    After(Duration),
}

impl fmt::Display for TokenExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("never"),
            Self::After(duration) => write!(f, "{}", humantime::format_duration(*duration)),
        }
    }
}

/// Error returned for an unparseable expiry setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token expiry `{value}`: {message}")]
pub struct ParseTokenExpiryError {
    value: String,
    message: String,
}

impl FromStr for TokenExpiry {
    type Err = ParseTokenExpiryError;

    /// Accepts `never` or a humantime duration such as `7d` or `12h 30m`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("never") {
            return Ok(Self::Never);
        }
        let duration = humantime::parse_duration(trimmed).map_err(|err| ParseTokenExpiryError {
            value: s.to_owned(),
            message: err.to_string(),
        })?;
        if duration.is_zero() {
            return Err(ParseTokenExpiryError {
                value: s.to_owned(),
                message: "duration must be positive".to_owned(),
            });
        }
        Ok(Self::After(duration))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Signs and verifies HS256 tokens whose subject is the account id.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: TokenExpiry,
}

impl fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenIssuer")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl JwtTokenIssuer {
    /// Create an issuer from a shared secret.
    pub fn new(secret: &[u8], expiry: TokenExpiry) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::signing("token secret must not be empty"));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        match expiry {
            TokenExpiry::Never => validation.set_required_spec_claims(&["sub"]),
            TokenExpiry::After(_) => validation.set_required_spec_claims(&["sub", "exp"]),
        }
        validation.validate_exp = true;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            expiry,
        })
    }

    /// Configured lifetime policy.
    #[must_use]
    pub fn expiry(&self) -> TokenExpiry {
        self.expiry
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, account: &AccountId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let exp = match self.expiry {
            TokenExpiry::Never => None,
            TokenExpiry::After(duration) => {
                let secs = i64::try_from(duration.as_secs())
                    .map_err(|_| TokenError::signing("token expiry out of range"))?;
                Some(now.saturating_add(secs))
            }
        };
        let claims = Claims {
            sub: account.to_string(),
            iat: now,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AccountId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            debug!(error = %err, "token rejected");
            TokenError::invalid(err.to_string())
        })?;
        AccountId::new(&data.claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}
