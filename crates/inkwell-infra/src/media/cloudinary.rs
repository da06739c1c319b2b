//! Cloudinary media store using the signed upload REST API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use inkwell_core::domain::{ImageUpload, MediaFolder};
use inkwell_core::ports::{MediaError, MediaStore};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary account credentials.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// Read `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
    /// `CLOUDINARY_API_SECRET`. `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME").ok()?,
            api_key: std::env::var("CLOUDINARY_API_KEY").ok()?,
            api_secret: std::env::var("CLOUDINARY_API_SECRET").ok()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary-backed media store.
pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.config.cloud_name, action)
    }

    /// Request signature: SHA-1 over the alphabetically sorted parameters
    /// followed by the API secret.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut params = params.to_vec();
        params.sort_by_key(|(key, _)| *key);

        let joined = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, folder: MediaFolder, image: ImageUpload) -> Result<String, MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", folder.as_str()),
            ("timestamp", &timestamp),
            ("transformation", folder.transformation()),
        ]);

        let file_name = format!("upload.{}", image.extension());
        let content_type = image.content_type.clone();
        let mut part = Part::bytes(image.bytes).file_name(file_name);
        if let Some(content_type) = content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| MediaError::Upload(e.to_string()))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.as_str())
            .text("transformation", folder.transformation())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Upload(format!("{status}: {body}")));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        tracing::debug!(folder = %folder, url = %body.secure_url, "Image uploaded");
        Ok(body.secure_url)
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MediaError::Delete(e.to_string()))?;

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Delete(e.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(MediaError::NotFound(public_id.to_string())),
            other => Err(MediaError::Delete(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryMediaStore {
        CloudinaryMediaStore::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "abcd".to_string(),
        })
    }

    #[test]
    fn test_signature_is_order_independent() {
        let store = store();
        let a = store.sign(&[("timestamp", "1315060510"), ("public_id", "sample")]);
        let b = store.sign(&[("public_id", "sample"), ("timestamp", "1315060510")]);

        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_endpoint_includes_cloud_name() {
        assert_eq!(
            store().endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }
}
