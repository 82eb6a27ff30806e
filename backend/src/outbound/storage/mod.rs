//! Filesystem-backed image store.
//!
//! Writes go through a capability handle on the media root, so an
//! [`ImagePath`] can never resolve outside it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::ImagePath;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// Stores uploaded images beneath a media root directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write when missing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Media root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn write_under(root: &Path, relative: &Path, bytes: &[u8]) -> Result<(), ImageStoreError> {
    Dir::create_ambient_dir_all(root, ambient_authority())
        .map_err(|err| ImageStoreError::unavailable(format!("{}: {err}", root.display())))?;
    let dir = Dir::open_ambient_dir(root, ambient_authority())
        .map_err(|err| ImageStoreError::unavailable(format!("{}: {err}", root.display())))?;
    if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
        dir.create_dir_all(parent)
            .map_err(|err| ImageStoreError::write(format!("{}: {err}", parent.display())))?;
    }
    dir.write(relative, bytes)
        .map_err(|err| ImageStoreError::write(format!("{}: {err}", relative.display())))
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, path: &ImagePath, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let root = self.root.clone();
        let relative = PathBuf::from(path.as_ref());
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || write_under(&root, &relative, &bytes))
            .await
            .map_err(|err| ImageStoreError::write(format!("image write task failed: {err}")))??;
        debug!(image = %path, "image written");
        Ok(())
    }
}
