//! Port for one-way password hashing.

use crate::domain::HashedPassword;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// Hashing the password failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<HashedPassword, CredentialHasherError>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &HashedPassword) -> Result<bool, CredentialHasherError>;
}
