//! Multipart form reading for the blog and profile endpoints.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart, MultipartError};
use futures::TryStreamExt;
use uuid::Uuid;

use inkwell_core::domain::ImageUpload;

use crate::middleware::error::{AppError, AppResult};

/// Cap on any single uploaded part.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Text fields plus at most one image.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl FormData {
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// The admin-only `authorId` field. Blank counts as absent.
    pub fn take_author_id(&mut self) -> AppResult<Option<Uuid>> {
        match self.take("authorId").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Uuid::parse_str(raw.trim())
                .map(Some)
                .map_err(|_| AppError::BadRequest("Invalid author ID".into())),
            None => Ok(None),
        }
    }
}

/// Drain a multipart payload. The part named `image_field` becomes the
/// image; an empty file part is treated as no file.
pub async fn read_form(mut payload: Multipart, image_field: &str) -> AppResult<FormData> {
    let mut form = FormData::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let content_type = field.content_type().map(|m| m.essence_str().to_owned());

        let bytes = read_field(&mut field, &name).await?;

        if name == image_field {
            if !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    bytes,
                    filename,
                    content_type,
                });
            }
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|_| AppError::BadRequest(format!("Field {name} is not valid UTF-8")))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field, name: &str) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Field {name} exceeds the 10 MiB limit"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn malformed(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {err}"))
}
