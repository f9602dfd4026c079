//! Thumbnail persistence.
//!
//! Thumbnails live on the local filesystem under the assets root, named
//! `{video_id}.{extension}`, and are served statically. The trait exists so
//! the upload pipeline can be tested without touching the filesystem.

use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

use vidhost_core::constants::THUMBNAIL_CONTENT_TYPES;
use vidhost_core::AppError;

#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Persist the thumbnail bytes and return the URL they will be served
    /// from. Replaces any previous thumbnail for the same video.
    async fn put(
        &self,
        video_id: Uuid,
        extension: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError>;

    /// Fetch the stored thumbnail as (bytes, content type), if any.
    async fn get(&self, video_id: Uuid) -> Result<Option<(Vec<u8>, String)>, AppError>;
}

pub struct FsThumbnailStore {
    root: PathBuf,
    base_url: String,
}

impl FsThumbnailStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn path_for(&self, video_id: Uuid, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", video_id, extension))
    }
}

#[async_trait]
impl ThumbnailStore for FsThumbnailStore {
    async fn put(
        &self,
        video_id: Uuid,
        extension: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError> {
        // A re-upload may switch formats; drop stale variants so the newest
        // write is the only one on disk.
        for (_, ext) in THUMBNAIL_CONTENT_TYPES {
            if *ext != extension {
                match tokio::fs::remove_file(self.path_for(video_id, ext)).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let path = self.path_for(video_id, extension);
        tokio::fs::write(&path, &data).await?;

        tracing::info!(
            video_id = %video_id,
            size_bytes = data.len(),
            path = %path.display(),
            "Thumbnail written"
        );

        Ok(format!("{}/{}.{}", self.base_url, video_id, extension))
    }

    async fn get(&self, video_id: Uuid) -> Result<Option<(Vec<u8>, String)>, AppError> {
        for (content_type, ext) in THUMBNAIL_CONTENT_TYPES {
            let path = self.path_for(video_id, ext);
            match tokio::fs::read(&path).await {
                Ok(data) => return Ok(Some((data, content_type.to_string()))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}
