//! Port for bearer token persistence.
//!
//! Adapters store one token digest per user; saving a new digest replaces
//! the previous one, which invalidates the old token.

use async_trait::async_trait;

use crate::domain::{TokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum AuthTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Store `digest` as the user's only token.
    async fn replace(&self, user: &UserId, digest: &TokenDigest)
    -> Result<(), AuthTokenRepositoryError>;

    /// Resolve the user owning `digest`.
    async fn find_user(&self, digest: &TokenDigest)
    -> Result<Option<UserId>, AuthTokenRepositoryError>;
}
