//! Video record repository.
//!
//! The record store is treated as an external, independently-consistent
//! system: no cross-request locking here, so two concurrent uploads for the
//! same video id resolve last-write-wins on whichever update lands last.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use vidhost_core::models::Video;
use vidhost_core::AppError;

/// Asset record store consulted and updated by the upload orchestrator.
#[async_trait]
pub trait VideoRecords: Send + Sync {
    /// Fetch a video record by id. `NotFound` if the id is unknown.
    async fn get_video(&self, video_id: Uuid) -> Result<Video, AppError>;

    /// Set the durable video locator, returning the updated record.
    async fn set_video_url(&self, video_id: Uuid, video_url: &str) -> Result<Video, AppError>;

    /// Set the thumbnail locator, returning the updated record.
    async fn set_thumbnail_url(
        &self,
        video_id: Uuid,
        thumbnail_url: &str,
    ) -> Result<Video, AppError>;
}

/// Postgres-backed implementation.
#[derive(Clone)]
pub struct PgVideoRecords {
    pool: PgPool,
}

impl PgVideoRecords {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRecords for PgVideoRecords {
    async fn get_video(&self, video_id: Uuid) -> Result<Video, AppError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, user_id, title, description, video_url, thumbnail_url,
                   created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        Ok(video)
    }

    async fn set_video_url(&self, video_id: Uuid, video_url: &str) -> Result<Video, AppError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, video_url, thumbnail_url,
                      created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(video_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::PersistenceFailed(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        tracing::info!(video_id = %video_id, "Video locator persisted");
        Ok(video)
    }

    async fn set_thumbnail_url(
        &self,
        video_id: Uuid,
        thumbnail_url: &str,
    ) -> Result<Video, AppError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, video_url, thumbnail_url,
                      created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(thumbnail_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::PersistenceFailed(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        tracing::info!(video_id = %video_id, "Thumbnail locator persisted");
        Ok(video)
    }
}
