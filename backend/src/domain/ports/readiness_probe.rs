//! Driven port reporting whether the backing store can serve traffic.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Reasons a readiness probe can fail.
    pub enum ReadinessProbeError {
        /// The store did not answer.
        Unavailable { message: String } => "backing store unavailable: {message}",
    }
}

/// Check that the backing store accepts work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Make one attempt to reach the store.
    async fn probe(&self) -> Result<(), ReadinessProbeError>;
}
