//! Authentication primitives: login credentials, password policy and tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError};

/// Number of random bytes behind an [`AuthToken`].
const TOKEN_BYTES: usize = 20;
/// Length of a hex-encoded [`AuthToken`].
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;
/// Default minimum password length applied at registration.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 5;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or not an address.
    InvalidEmail(UserValidationError),
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised the same way stored accounts are.
/// - `password` is non-empty and retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use recipe_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("cook@EXAMPLE.com", "pass123").unwrap();
/// assert_eq!(creds.email().as_ref(), "cook@example.com");
/// assert_eq!(creds.password(), "pass123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email suitable for user lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Password rejected by [`PasswordPolicy::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    TooShort { min: usize },
}

impl fmt::Display for PasswordPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for PasswordPolicyError {}

/// Rules applied to passwords chosen through self-service registration.
///
/// # Examples
/// ```
/// use recipe_backend::domain::PasswordPolicy;
///
/// let policy = PasswordPolicy::new(5);
/// assert!(policy.check("pw").is_err());
/// assert!(policy.check("longer").is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_MIN_LENGTH)
    }
}

impl PasswordPolicy {
    /// Build a policy requiring at least `min_length` characters.
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Minimum number of characters accepted.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validate a candidate password.
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
            });
        }
        Ok(())
    }
}

/// Error returned when a presented token is not well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTokenError;

impl fmt::Display for MalformedTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token must be {TOKEN_LENGTH} hexadecimal characters")
    }
}

impl std::error::Error for MalformedTokenError {}

/// Opaque bearer token handed to clients after login.
///
/// The raw value is only ever held in memory; storage keeps its
/// [`TokenDigest`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Issue a new random token.
    pub fn issue() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// Parse a token presented by a client.
    pub fn parse(raw: &str) -> Result<Self, MalformedTokenError> {
        if raw.len() != TOKEN_LENGTH || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MalformedTokenError);
        }
        Ok(Self(Zeroizing::new(raw.to_ascii_lowercase())))
    }

    /// Raw token text for the login response.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest persisted in place of the token.
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of an [`AuthToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Wrap a digest read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for TokenDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
