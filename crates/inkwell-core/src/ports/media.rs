//! Media store port - durable image storage addressed by URL.

use async_trait::async_trait;

use crate::domain::{ImageUpload, MediaFolder};

/// Media store trait - abstraction over image hosting backends.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image under `folder` and return its delivery URL.
    async fn upload(&self, folder: MediaFolder, image: ImageUpload) -> Result<String, MediaError>;

    /// Delete an image by its public id (folder-qualified).
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Media store errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Media not found: {0}")]
    NotFound(String),
}
