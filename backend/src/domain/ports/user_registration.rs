//! Driving port for self-service account creation.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{EmailAddress, Error, User, UserName};

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: EmailAddress,
    pub password: Zeroizing<String>,
    pub name: UserName,
}

/// Domain use-case port for registering users.
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Create an account, applying the password policy.
    async fn register(&self, registration: Registration) -> Result<User, Error>;
}
