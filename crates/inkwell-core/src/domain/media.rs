use std::sync::LazyLock;

use regex::Regex;

/// Matches the `/v<version>/<public id>.<ext>` tail of a delivery URL.
static VERSIONED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/v\d+/(.+?)\.[a-zA-Z]+$").expect("versioned path pattern is valid")
});

/// Logical folder an image is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFolder {
    BlogCovers,
    Avatars,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFolder::BlogCovers => "blog-covers",
            MediaFolder::Avatars => "avatars",
        }
    }

    /// Store-side transformation applied on upload.
    pub fn transformation(&self) -> &'static str {
        match self {
            MediaFolder::BlogCovers => "c_fill,w_800",
            MediaFolder::Avatars => "c_fill,h_300,w_300",
        }
    }
}

impl std::fmt::Display for MediaFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw image content received from a client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: None,
            content_type: None,
        }
    }

    /// Best guess at a file extension, from the filename first and the
    /// content type second.
    pub fn extension(&self) -> &str {
        if let Some(ext) = self
            .filename
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return ext;
        }

        match self.content_type.as_deref() {
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            _ => "jpg",
        }
    }
}

/// Recover the store's public id from a delivery URL.
///
/// Prefers the versioned path segment (`.../v1712/blog-covers/abc.jpg` gives
/// `blog-covers/abc`). Otherwise falls back to the filename stem, prefixed
/// with the folder when the URL mentions it.
pub fn public_id_from_url(url: &str, folder: MediaFolder) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if let Some(captures) = VERSIONED_PATH.captures(url) {
        return Some(captures[1].to_string());
    }

    let filename = url.rsplit('/').next().unwrap_or(url);
    let stem = filename.split('.').next().unwrap_or(filename);
    if stem.is_empty() {
        return None;
    }

    if url.contains(&format!("/{}/", folder.as_str())) {
        Some(format!("{}/{}", folder.as_str(), stem))
    } else {
        Some(stem.to_string())
    }
}
