//! In-memory media store - used when no image host is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkwell_core::domain::{ImageUpload, MediaFolder};
use inkwell_core::ports::{MediaError, MediaStore};

/// Keeps uploaded bytes in a map keyed by public id and hands out
/// Cloudinary-shaped URLs, so reference parsing behaves as in production.
pub struct InMemoryMediaStore {
    base_url: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryMediaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.objects.read().await.contains_key(public_id)
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new("http://localhost:5000/media")
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(&self, folder: MediaFolder, image: ImageUpload) -> Result<String, MediaError> {
        if image.bytes.is_empty() {
            return Err(MediaError::Upload("Empty image".to_string()));
        }

        let public_id = format!("{}/{}", folder.as_str(), Uuid::new_v4().simple());
        let url = format!(
            "{}/image/upload/v{}/{}.{}",
            self.base_url,
            Utc::now().timestamp(),
            public_id,
            image.extension()
        );

        self.objects.write().await.insert(public_id, image.bytes);
        Ok(url)
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        match self.objects.write().await.remove(public_id) {
            Some(_) => Ok(()),
            None => Err(MediaError::NotFound(public_id.to_string())),
        }
    }
}
