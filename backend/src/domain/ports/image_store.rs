//! Port for persisting uploaded image bytes.

use async_trait::async_trait;

use crate::domain::ImagePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The storage location could not be opened.
        Unavailable { message: String } => "image store unavailable: {message}",
        /// Writing the file failed.
        Write { message: String } => "image write failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` at `path`, relative to the store root, creating parent
    /// directories as needed.
    async fn store(&self, path: &ImagePath, bytes: &[u8]) -> Result<(), ImageStoreError>;
}
