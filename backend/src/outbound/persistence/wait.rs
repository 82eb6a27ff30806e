//! Wait for PostgreSQL to accept connections.
//!
//! Used by the `wait-for-db` binary and by server startup before the pool
//! is built.

use std::time::Duration;

use async_trait::async_trait;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use tracing::{info, warn};

use crate::domain::ports::{ReadinessProbe, ReadinessProbeError};

/// Probe that opens a fresh PostgreSQL connection.
#[derive(Debug, Clone)]
pub struct PgProbe {
    database_url: String,
}

impl PgProbe {
    /// Create a probe for `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

#[async_trait]
impl ReadinessProbe for PgProbe {
    async fn probe(&self) -> Result<(), ReadinessProbeError> {
        AsyncPgConnection::establish(&self.database_url)
            .await
            .map(|_| ())
            .map_err(|err| ReadinessProbeError::unavailable(err.to_string()))
    }
}

/// The database stayed unreachable for every attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("database unavailable after {attempts} attempts: {last_error}")]
pub struct DatabaseUnavailable {
    /// Number of probes made.
    pub attempts: u32,
    /// Failure reported by the final probe.
    pub last_error: String,
}

/// Probe until the database answers, sleeping `interval` between attempts.
///
/// `max_attempts` of `None` waits indefinitely.
///
/// # Errors
///
/// Returns [`DatabaseUnavailable`] once `max_attempts` probes have failed.
pub async fn wait_until_available(
    probe: &dyn ReadinessProbe,
    interval: Duration,
    max_attempts: Option<u32>,
) -> Result<(), DatabaseUnavailable> {
    let mut attempts = 0_u32;
    loop {
        attempts = attempts.saturating_add(1);
        match probe.probe().await {
            Ok(()) => {
                info!(attempts, "database available");
                return Ok(());
            }
            Err(ReadinessProbeError::Unavailable {
                message: last_error,
            }) => {
                warn!(attempts, error = %last_error, "database unavailable, waiting");
                if max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(DatabaseUnavailable {
                        attempts,
                        last_error,
                    });
                }
            }
        }
        tokio::time::sleep(interval).await;
    }
}
