//! Uploaded media storage on the local filesystem.

use std::path::PathBuf;

use crate::config::PHOTO_DIR;
use crate::domain::NormalizedPhoto;
use crate::errors::AppResult;

/// Files under the media root, addressed by paths relative to it.
/// The same relative path is served below `/media/`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write a product photo under a fresh name, returning its relative path.
    pub async fn save_photo(&self, photo: &NormalizedPhoto) -> AppResult<String> {
        let relative = format!(
            "{}/{}.{}",
            PHOTO_DIR,
            uuid::Uuid::new_v4(),
            photo.format.extension()
        );
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &photo.bytes).await?;

        tracing::debug!(path = %path.display(), "Stored product photo");
        Ok(relative)
    }

    /// Delete a stored file. Missing files are not an error.
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed media file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "Failed to remove media file: {}", e),
        }
    }
}
