//! Application settings loaded via OrthoConfig.
//!
//! Values are layered from defaults, an optional config file, `RECIPE_*`
//! environment variables and command-line flags.

use std::ffi::OsString;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::PasswordPolicy;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MEDIA_ROOT: &str = "./media";

/// Errors raised when settings cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Loading the layered configuration failed.
    #[error("failed to load settings: {message}")]
    Load { message: String },

    /// No database URL was configured.
    #[error("database URL missing: set RECIPE_DATABASE_URL or --database-url")]
    MissingDatabaseUrl,
}

/// Runtime configuration shared by the server and management commands.
///
/// Numeric limits carry their defaults in the derive so the merged layers
/// always form a complete struct, even with no file, variable or flag set.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPE")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Directory holding uploaded media.
    pub media_root: Option<PathBuf>,
    /// Minimum accepted password length at registration.
    #[ortho_config(default = 5)]
    pub password_min_length: usize,
    /// Largest accepted image upload, in bytes (10 MiB).
    #[ortho_config(default = 10_485_760)]
    pub max_upload_bytes: usize,
    /// Maximum number of pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Seconds to sleep between database availability checks.
    #[ortho_config(default = 1)]
    pub wait_for_db_interval_secs: u64,
}

impl AppSettings {
    /// Load settings from the environment and config file only.
    ///
    /// Management commands parse their own flags, so `program` is the only
    /// argument handed to the layered loader.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a layer fails to parse.
    pub fn load_without_cli(program: &str) -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from(program)]).map_err(|err| SettingsError::Load {
            message: err.to_string(),
        })
    }

    /// Return the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Return the configured database URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Prefer an explicit command-line URL over the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when neither is usable.
    pub fn database_url_or(&self, explicit: Option<&str>) -> Result<String, SettingsError> {
        match explicit.map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.to_owned()),
            Some(_) => Err(SettingsError::MissingDatabaseUrl),
            None => self.database_url().map(str::to_owned),
        }
    }

    /// Return the media root, falling back to `./media`.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Password policy for registration.
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.password_min_length)
    }

    /// Upload ceiling in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Interval between database availability checks.
    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_for_db_interval_secs)
    }

    /// Pool configuration for the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self.database_url()?;
        Ok(self.pool_config_for(url))
    }

    /// Pool configuration for `database_url` with the configured size.
    pub fn pool_config_for(&self, database_url: &str) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.db_pool_size)
    }
}
