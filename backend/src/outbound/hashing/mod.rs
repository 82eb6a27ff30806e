//! Argon2id credential hasher.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$...`), so the
//! parameters travel with each hash and can be raised without invalidating
//! existing accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::HashedPassword;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// [`CredentialHasher`] backed by the `argon2` crate.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Hasher with the crate's default Argon2id parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialHasherError::Hash`] when the parameters are out of
    /// range.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialHasherError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| CredentialHasherError::hash(err.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<HashedPassword, CredentialHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| HashedPassword::new(hash.to_string()))
            .map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &HashedPassword) -> Result<bool, CredentialHasherError> {
        let parsed = PasswordHash::new(hash.as_ref())
            .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialHasherError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(Params::MIN_M_COST, 1, 1).expect("cheap params")
    }

    #[rstest]
    fn hash_round_trips_and_rejects_wrong_password(hasher: Argon2Hasher) {
        let hash = hasher.hash("testpass").expect("hashed");

        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify("testpass", &hash).expect("verified"));
        assert!(!hasher.verify("wrong", &hash).expect("verified"));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2Hasher) {
        let first = hasher.hash("testpass").expect("hashed");
        let second = hasher.hash("testpass").expect("hashed");

        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_reported(hasher: Argon2Hasher) {
        let error = hasher
            .verify("testpass", &HashedPassword::new("plaintext"))
            .expect_err("malformed");

        assert!(matches!(error, CredentialHasherError::MalformedHash { .. }));
    }
}
