//! Playback URL resolution.
//!
//! Stored video locators take the form `{bucket},{key}`. At read time the
//! locator is exchanged for a short-lived presigned URL. Anything that does
//! not parse as exactly two comma-separated parts (legacy public URLs,
//! already-resolved values) is passed through unchanged.
//!
//! Single-bucket assumption: the storage gateway is bound to one configured
//! bucket, and signing always runs against it. The locator's bucket
//! component records where the object was written but is not re-bound at
//! signing time, so records must not outlive a bucket reconfiguration.

use std::sync::Arc;

use vidhost_core::constants::SIGNED_URL_TTL;
use vidhost_core::models::{Video, VideoResponse};
use vidhost_core::AppError;
use vidhost_storage::ObjectStorage;

pub async fn resolve_playback_url(
    storage: &Arc<dyn ObjectStorage>,
    locator: &str,
) -> Result<String, AppError> {
    let mut parts = locator.splitn(3, ',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_bucket), Some(key), None) => {
            let url = storage.presigned_get_url(key, SIGNED_URL_TTL).await?;
            Ok(url)
        }
        _ => Ok(locator.to_string()),
    }
}

/// Build the API response for a record, resolving its locator if present.
pub async fn to_video_response(
    storage: &Arc<dyn ObjectStorage>,
    video: Video,
) -> Result<VideoResponse, AppError> {
    match video.video_url.clone() {
        Some(locator) => {
            let url = resolve_playback_url(storage, &locator).await?;
            Ok(VideoResponse::with_playback_url(video, Some(url)))
        }
        None => Ok(VideoResponse::with_playback_url(video, None)),
    }
}
