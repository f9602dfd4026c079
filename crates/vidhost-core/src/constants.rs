//! Domain constants shared across crates.

use std::time::Duration;

/// The only media type accepted for video uploads.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// File extension paired with [`VIDEO_CONTENT_TYPE`].
pub const VIDEO_EXTENSION: &str = "mp4";

/// Image types accepted for thumbnail uploads, with their extensions.
pub const THUMBNAIL_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
];

/// Upload body cap for videos (1 GiB).
pub const MAX_VIDEO_UPLOAD_BYTES: usize = 1 << 30;

/// Upload body cap for thumbnails (10 MiB).
pub const MAX_THUMBNAIL_UPLOAD_BYTES: usize = 10 << 20;

/// Validity window for signed playback URLs.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// Extension for a thumbnail content type, if accepted.
pub fn thumbnail_extension(content_type: &str) -> Option<&'static str> {
    THUMBNAIL_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_extension_lookup() {
        assert_eq!(thumbnail_extension("image/jpeg"), Some("jpg"));
        assert_eq!(thumbnail_extension("image/png"), Some("png"));
        assert_eq!(thumbnail_extension("image/gif"), Some("gif"));
        assert_eq!(thumbnail_extension("image/webp"), None);
        assert_eq!(thumbnail_extension("video/mp4"), None);
    }
}
