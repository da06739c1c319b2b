//! Non-authoritative media cleanup.
//!
//! Removing an image that is about to be orphaned is a side effect, not part
//! of the mutation that orphans it. Failures are logged on the
//! `media_cleanup` target and never reach the caller.

use crate::domain::{MediaFolder, public_id_from_url};
use crate::ports::MediaStore;

pub(crate) async fn discard_image(media: &dyn MediaStore, url: &str, folder: MediaFolder) {
    let Some(public_id) = public_id_from_url(url, folder) else {
        tracing::warn!(target: "media_cleanup", url, "No public id in media reference, skipping");
        return;
    };

    tracing::debug!(target: "media_cleanup", %public_id, "Deleting image");
    match media.destroy(&public_id).await {
        Ok(()) => tracing::info!(target: "media_cleanup", %public_id, "Image deleted"),
        Err(e) => {
            tracing::warn!(target: "media_cleanup", %public_id, error = %e, "Failed to delete image")
        }
    }
}
