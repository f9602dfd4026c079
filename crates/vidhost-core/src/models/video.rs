use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A video record: the authoritative mapping from asset identity to its
/// owner, metadata, and storage locators.
///
/// `video_url` holds the storage locator once an upload completes. For S3
/// backends it is the `bucket,key` composite that playback resolution signs;
/// any other form (e.g. a direct URL from local storage) passes through
/// unsigned. `thumbnail_url` is set independently by thumbnail upload.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API response shape for a video. `video_url` here is the playback
/// reference: a signed, time-limited URL when the stored locator is a
/// `bucket,key` pair, or the stored value unchanged otherwise.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    /// Build a response with the playback reference already resolved.
    pub fn with_playback_url(video: Video, playback_url: Option<String>) -> Self {
        VideoResponse {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            video_url: playback_url,
            thumbnail_url: video.thumbnail_url,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        let playback_url = video.video_url.clone();
        VideoResponse::with_playback_url(video, playback_url)
    }
}
