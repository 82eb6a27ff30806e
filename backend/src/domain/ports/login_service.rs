//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to exchange credentials for a token and to
//! resolve presented tokens, without importing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials, UserId};

/// Domain use-case port for issuing tokens.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a fresh token for the user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;
}

/// Domain use-case port for resolving bearer tokens.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Resolve the active user owning `token`.
    async fn authenticate_token(&self, token: &AuthToken) -> Result<UserId, Error>;
}
