//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use recipe_backend::domain::PasswordPolicy;
use recipe_backend::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use recipe_backend::outbound::persistence::DbPool;
use recipe_backend::settings::AppSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) media_root: PathBuf,
    pub(crate) password_policy: PasswordPolicy,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    /// Construct a server configuration with default upload and password
    /// rules.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, media_root: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr,
            db_pool,
            media_root: media_root.into(),
            password_policy: PasswordPolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Construct a configuration from loaded settings and a ready pool.
    #[must_use]
    pub fn from_settings(settings: &AppSettings, db_pool: DbPool) -> Self {
        Self::new(settings.bind_addr(), db_pool, settings.media_root())
            .with_password_policy(settings.password_policy())
            .with_max_upload_bytes(settings.max_upload_bytes())
    }

    /// Override the registration password policy.
    #[must_use]
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    /// Override the largest accepted image upload.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
