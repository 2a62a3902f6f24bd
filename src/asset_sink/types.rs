//! Type definitions for localized assets

/// Resource type for logging and error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Svg,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Image => write!(f, "Image"),
            ResourceType::Svg => write!(f, "SVG"),
        }
    }
}

/// Content of a localized asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    /// Binary body, already fetched or decoded.
    Bytes(Vec<u8>),
    /// Text body (inline SVG markup).
    Text(String),
    /// Remote image not fetched yet; resolved by the packager.
    Pending { url: String },
}

/// One file the external packager has to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Path relative to the Markdown file, as referenced from the document.
    pub logical_path: String,
    pub payload: AssetPayload,
    pub mime_type: String,
    /// Creation order across the whole sink.
    pub sort_index: usize,
    pub resource_type: ResourceType,
}

/// Body returned by an [`ImageFetcher`](super::ImageFetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Guess a MIME type from a lowercase file extension.
#[must_use]
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Preferred file extension for an image MIME type.
#[must_use]
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "image/bmp" => Some("bmp"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}
