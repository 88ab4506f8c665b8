//! Argon2id adapter for the [`PasswordHasher`] port.
//!
//! Digests are PHC strings, so cost parameters travel with each digest and
//! verification uses whatever parameters the digest was created with.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordDigest};

/// Argon2id password hasher.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    decoy: PasswordDigest,
}

impl std::fmt::Debug for Argon2PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2PasswordHasher").finish_non_exhaustive()
    }
}

impl Argon2PasswordHasher {
    /// Hasher with the library's recommended Argon2id parameters.
    pub fn new() -> Result<Self, PasswordHashError> {
        Self::from_argon2(Argon2::default())
    }

    /// Hasher with explicit cost parameters (memory in KiB, iterations,
    /// parallelism).
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Result<Self, PasswordHashError> {
        let decoy_secret = SaltString::generate(&mut OsRng);
        let decoy = hash_with(&argon2, decoy_secret.as_str())?;
        Ok(Self { argon2, decoy })
    }
}

fn hash_with(argon2: &Argon2<'_>, plaintext: &str) -> Result<PasswordDigest, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| PasswordHashError::hash(err.to_string()))?;
    Ok(PasswordDigest::new(digest.to_string()))
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHashError> {
        hash_with(&self.argon2, password.expose())
    }

    fn verify(
        &self,
        password: &Password,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|err| PasswordHashError::malformed_digest(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::malformed_digest(err.to_string())),
        }
    }

    fn decoy_digest(&self) -> PasswordDigest {
        self.decoy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_params(1024, 1, 1).expect("cheap params")
    }

    #[rstest]
    fn hash_and_verify(hasher: Argon2PasswordHasher) {
        let password = Password::new("correct horse");
        let digest = hasher.hash(&password).expect("hash");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&password, &digest).expect("verify"));
        assert!(!hasher
            .verify(&Password::new("wrong horse"), &digest)
            .expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2PasswordHasher) {
        let password = Password::new("same password");
        let first = hasher.hash(&password).expect("hash");
        let second = hasher.hash(&password).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_digest_is_an_error(hasher: Argon2PasswordHasher) {
        let result = hasher.verify(&Password::new("pw"), &PasswordDigest::new("plaintext"));
        assert!(matches!(
            result,
            Err(PasswordHashError::MalformedDigest { .. })
        ));
    }

    #[rstest]
    fn decoy_is_a_real_digest_no_password_matches(hasher: Argon2PasswordHasher) {
        let decoy = hasher.decoy_digest();
        assert!(decoy.as_str().starts_with("$argon2id$"));
        assert!(!hasher
            .verify(&Password::new("anything"), &decoy)
            .expect("verify"));
    }

    #[rstest]
    fn invalid_params_are_rejected() {
        assert!(Argon2PasswordHasher::with_params(1, 1, 1).is_err());
    }
}
