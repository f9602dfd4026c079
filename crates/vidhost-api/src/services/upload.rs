//! Upload orchestration.
//!
//! The pipeline that turns an inbound multipart upload into a publishable
//! video asset: validate -> stage -> rewrite -> classify -> key -> store ->
//! persist. Steps run strictly sequentially and fail fast; nothing is
//! retried. Staged and rewritten files are RAII-guarded so they are deleted
//! on every exit path.
//!
//! The pipeline depends only on trait seams (records, storage, inspector,
//! rewriter, thumbnail store), so the sequencing and failure paths are
//! tested below with fakes.

use std::sync::Arc;
use uuid::Uuid;

use vidhost_core::constants::{
    thumbnail_extension, MAX_THUMBNAIL_UPLOAD_BYTES, MAX_VIDEO_UPLOAD_BYTES, VIDEO_CONTENT_TYPE,
    VIDEO_EXTENSION,
};
use vidhost_core::models::Video;
use vidhost_core::AppError;
use vidhost_db::VideoRecords;
use vidhost_processing::{AspectClass, ContainerRewriter, MediaInspector};
use vidhost_storage::{derive_video_key, ObjectStorage};

use crate::services::thumbnails::ThumbnailStore;

/// One extracted multipart file part.
#[derive(Debug)]
pub struct FilePart {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct UploadPipeline {
    records: Arc<dyn VideoRecords>,
    storage: Arc<dyn ObjectStorage>,
    inspector: Arc<dyn MediaInspector>,
    rewriter: Arc<dyn ContainerRewriter>,
    thumbnails: Arc<dyn ThumbnailStore>,
}

/// Strip MIME parameters: "video/mp4; some=param" -> "video/mp4".
fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

impl UploadPipeline {
    pub fn new(
        records: Arc<dyn VideoRecords>,
        storage: Arc<dyn ObjectStorage>,
        inspector: Arc<dyn MediaInspector>,
        rewriter: Arc<dyn ContainerRewriter>,
        thumbnails: Arc<dyn ThumbnailStore>,
    ) -> Self {
        Self {
            records,
            storage,
            inspector,
            rewriter,
            thumbnails,
        }
    }

    /// Enforce record existence and ownership without touching the body.
    /// Handlers call this before reading the multipart stream so a
    /// non-owning caller is rejected before any bytes are buffered.
    pub async fn verify_owner(&self, video_id: Uuid, caller: Uuid) -> Result<(), AppError> {
        self.owned_video(video_id, caller).await.map(|_| ())
    }

    /// Load the record and enforce ownership. Runs before any temp file is
    /// created on either upload path.
    async fn owned_video(&self, video_id: Uuid, caller: Uuid) -> Result<Video, AppError> {
        let video = self.records.get_video(video_id).await?;
        if video.user_id != caller {
            return Err(AppError::Unauthorized(
                "You do not own this video".to_string(),
            ));
        }
        Ok(video)
    }

    /// Full video publish pipeline. On success the record's video locator
    /// reflects this upload; concurrent uploads to the same id resolve
    /// last-write-wins.
    pub async fn publish_video(
        &self,
        video_id: Uuid,
        caller: Uuid,
        part: FilePart,
    ) -> Result<Video, AppError> {
        self.owned_video(video_id, caller).await?;

        let declared = media_type(&part.content_type);
        if declared != VIDEO_CONTENT_TYPE {
            return Err(AppError::InvalidInput(format!(
                "Unsupported media type '{}': only {} is accepted",
                declared, VIDEO_CONTENT_TYPE
            )));
        }

        if part.data.len() > MAX_VIDEO_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Video exceeds the {} MB limit",
                MAX_VIDEO_UPLOAD_BYTES / 1024 / 1024
            )));
        }

        // Stage to a uniquely named temp file; NamedTempFile removes it on
        // drop, covering every exit path below.
        let staged = tempfile::Builder::new()
            .prefix("vidhost-upload-")
            .suffix(".mp4")
            .tempfile()
            .map_err(|e| AppError::Internal(format!("Failed to create staging file: {}", e)))?;
        tokio::fs::write(staged.path(), &part.data).await?;

        tracing::info!(
            video_id = %video_id,
            size_bytes = part.data.len(),
            "Upload staged"
        );

        // Rewrite for progressive playback; the guard deletes the output
        // whether or not the remaining steps succeed.
        let processed = self.rewriter.rewrite(staged.path()).await?;

        let geometry = self.inspector.probe(processed.path()).await?;
        let class = AspectClass::classify(geometry);

        let key = derive_video_key(class.prefix(), VIDEO_EXTENSION)?;

        let data = tokio::fs::read(processed.path()).await?;
        self.storage.put(&key, VIDEO_CONTENT_TYPE, data).await?;

        let locator = self.storage.locator(&key);
        let updated = self
            .records
            .set_video_url(video_id, &locator)
            .await
            .map_err(|e| {
                // The object is already durable at this point; the record
                // never learned about it. Surfaced, not reconciled.
                tracing::error!(
                    video_id = %video_id,
                    key = %key,
                    error = %e,
                    "Record update failed after storage write; stored object is orphaned"
                );
                AppError::PersistenceFailed(e.to_string())
            })?;

        tracing::info!(
            video_id = %video_id,
            key = %key,
            class = class.prefix(),
            "Video published"
        );

        Ok(updated)
    }

    /// Thumbnail variant: no rewrite or classification, raw bytes stored
    /// keyed by the video id.
    pub async fn attach_thumbnail(
        &self,
        video_id: Uuid,
        caller: Uuid,
        part: FilePart,
    ) -> Result<Video, AppError> {
        self.owned_video(video_id, caller).await?;

        let declared = media_type(&part.content_type);
        let extension = thumbnail_extension(declared).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unsupported thumbnail media type '{}'",
                declared
            ))
        })?;

        if part.data.len() > MAX_THUMBNAIL_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Thumbnail exceeds the {} MB limit",
                MAX_THUMBNAIL_UPLOAD_BYTES / 1024 / 1024
            )));
        }

        let url = self
            .thumbnails
            .put(video_id, extension, declared, part.data)
            .await?;

        let updated = self.records.set_thumbnail_url(video_id, &url).await?;

        tracing::info!(video_id = %video_id, "Thumbnail attached");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use vidhost_processing::{ProcessedFile, VideoGeometry};
    use vidhost_storage::{StorageError, StorageResult};

    fn test_video(id: Uuid, owner: Uuid) -> Video {
        let now = Utc::now();
        Video {
            id,
            user_id: owner,
            title: "clip".to_string(),
            description: None,
            video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[derive(Default)]
    struct FakeRecords {
        videos: Mutex<HashMap<Uuid, Video>>,
        fail_updates: bool,
    }

    impl FakeRecords {
        fn video(&self, id: Uuid) -> Video {
            self.videos.lock().unwrap().get(&id).unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoRecords for FakeRecords {
        async fn get_video(&self, video_id: Uuid) -> Result<Video, AppError> {
            self.videos
                .lock()
                .unwrap()
                .get(&video_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))
        }

        async fn set_video_url(&self, video_id: Uuid, url: &str) -> Result<Video, AppError> {
            if self.fail_updates {
                return Err(AppError::PersistenceFailed("update failed".to_string()));
            }
            let mut videos = self.videos.lock().unwrap();
            let video = videos
                .get_mut(&video_id)
                .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
            video.video_url = Some(url.to_string());
            Ok(video.clone())
        }

        async fn set_thumbnail_url(&self, video_id: Uuid, url: &str) -> Result<Video, AppError> {
            let mut videos = self.videos.lock().unwrap();
            let video = videos
                .get_mut(&video_id)
                .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
            video.thumbnail_url = Some(url.to_string());
            Ok(video.clone())
        }
    }

    #[derive(Default)]
    struct FakeStorage {
        objects: Mutex<HashMap<String, Vec<u8>>>,
        fail_puts: bool,
    }

    #[async_trait]
    impl ObjectStorage for FakeStorage {
        async fn put(&self, key: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<()> {
            if self.fail_puts {
                return Err(StorageError::WriteFailed("unavailable".to_string()));
            }
            self.objects.lock().unwrap().insert(key.to_string(), data);
            Ok(())
        }

        async fn presigned_get_url(
            &self,
            key: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            Ok(format!(
                "https://signed.example/{}?expires={}",
                key,
                expires_in.as_secs()
            ))
        }

        fn locator(&self, key: &str) -> String {
            format!("testbucket,{}", key)
        }
    }

    /// Copies the staged file to `{input}.processing`, recording invocations
    /// and the paths it produced.
    #[derive(Default)]
    struct FakeRewriter {
        calls: AtomicUsize,
        outputs: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    #[async_trait]
    impl ContainerRewriter for FakeRewriter {
        async fn rewrite(&self, input: &Path) -> Result<ProcessedFile, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::ProcessingFailed("tool exited 1".to_string()));
            }
            let mut output = input.as_os_str().to_owned();
            output.push(".processing");
            let output = PathBuf::from(output);
            std::fs::copy(input, &output).unwrap();
            self.outputs.lock().unwrap().push(output.clone());
            Ok(ProcessedFile::new(output))
        }
    }

    #[derive(Default)]
    struct FakeInspector {
        calls: AtomicUsize,
        geometry: VideoGeometry,
        fail: bool,
    }

    #[async_trait]
    impl MediaInspector for FakeInspector {
        async fn probe(&self, _path: &Path) -> Result<VideoGeometry, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::InspectionFailed("bad output".to_string()));
            }
            Ok(self.geometry)
        }
    }

    #[derive(Default)]
    struct FakeThumbnails {
        stored: Mutex<HashMap<Uuid, Vec<u8>>>,
    }

    #[async_trait]
    impl ThumbnailStore for FakeThumbnails {
        async fn put(
            &self,
            video_id: Uuid,
            extension: &str,
            _content_type: &str,
            data: Vec<u8>,
        ) -> Result<String, AppError> {
            self.stored.lock().unwrap().insert(video_id, data);
            Ok(format!(
                "http://localhost:8091/assets/{}.{}",
                video_id, extension
            ))
        }

        async fn get(&self, video_id: Uuid) -> Result<Option<(Vec<u8>, String)>, AppError> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .get(&video_id)
                .map(|data| (data.clone(), "image/png".to_string())))
        }
    }

    struct Harness {
        records: Arc<FakeRecords>,
        storage: Arc<FakeStorage>,
        inspector: Arc<FakeInspector>,
        rewriter: Arc<FakeRewriter>,
        thumbnails: Arc<FakeThumbnails>,
        pipeline: UploadPipeline,
        video_id: Uuid,
        owner: Uuid,
    }

    fn harness_with(
        records: FakeRecords,
        storage: FakeStorage,
        inspector: FakeInspector,
        rewriter: FakeRewriter,
    ) -> Harness {
        let video_id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let records = Arc::new(FakeRecords {
            videos: Mutex::new(HashMap::from([(
                video_id,
                test_video(video_id, owner),
            )])),
            ..records
        });
        let storage = Arc::new(storage);
        let inspector = Arc::new(inspector);
        let rewriter = Arc::new(rewriter);
        let thumbnails = Arc::new(FakeThumbnails::default());
        let pipeline = UploadPipeline::new(
            records.clone(),
            storage.clone(),
            inspector.clone(),
            rewriter.clone(),
            thumbnails.clone(),
        );
        Harness {
            records,
            storage,
            inspector,
            rewriter,
            thumbnails,
            pipeline,
            video_id,
            owner,
        }
    }

    fn harness() -> Harness {
        harness_with(
            FakeRecords::default(),
            FakeStorage::default(),
            FakeInspector {
                geometry: VideoGeometry {
                    width: 1920,
                    height: 1080,
                },
                ..FakeInspector::default()
            },
            FakeRewriter::default(),
        )
    }

    fn mp4_part() -> FilePart {
        FilePart {
            content_type: "video/mp4".to_string(),
            data: b"fake mp4 bytes".to_vec(),
        }
    }

    fn assert_temp_files_gone(h: &Harness) {
        for path in h.rewriter.outputs.lock().unwrap().iter() {
            assert!(!path.exists(), "processed file left behind: {:?}", path);
            // The staged file is the processed path minus the suffix.
            let staged = path.with_extension("");
            assert!(
                !Path::new(&staged).exists(),
                "staged file left behind: {:?}",
                staged
            );
        }
    }

    #[tokio::test]
    async fn test_publish_video_happy_path() {
        let h = harness();
        let video = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap();

        let locator = video.video_url.expect("locator set");
        let (bucket, key) = locator.split_once(',').expect("bucket,key form");
        assert_eq!(bucket, "testbucket");
        assert!(key.starts_with("wide/"));
        assert!(key.ends_with(".mp4"));

        // The stored object holds the rewritten bytes under the derived key.
        let objects = h.storage.objects.lock().unwrap();
        assert_eq!(objects.get(key).map(Vec::as_slice), Some(&b"fake mp4 bytes"[..]));
        drop(objects);

        assert_eq!(h.records.video(h.video_id).video_url, Some(locator));
        assert_temp_files_gone(&h);
    }

    #[tokio::test]
    async fn test_tall_video_namespaced_under_tall() {
        let h = harness_with(
            FakeRecords::default(),
            FakeStorage::default(),
            FakeInspector {
                geometry: VideoGeometry {
                    width: 1080,
                    height: 1920,
                },
                ..FakeInspector::default()
            },
            FakeRewriter::default(),
        );
        let video = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap();
        assert!(video.video_url.unwrap().contains(",tall/"));
    }

    #[tokio::test]
    async fn test_non_owner_fails_before_any_tool_runs() {
        let h = harness();
        let stranger = Uuid::new_v4();

        let err = h
            .pipeline
            .publish_video(h.video_id, stranger, mp4_part())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(h.rewriter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.inspector.calls.load(Ordering::SeqCst), 0);
        assert!(h.storage.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_owner_rejects_stranger_without_side_effects() {
        let h = harness();
        let err = h
            .pipeline
            .verify_owner(h.video_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = h
            .pipeline
            .verify_owner(Uuid::new_v4(), h.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(h.pipeline.verify_owner(h.video_id, h.owner).await.is_ok());
        assert_eq!(h.rewriter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.inspector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_video_is_not_found() {
        let h = harness();
        let err = h
            .pipeline
            .publish_video(Uuid::new_v4(), h.owner, mp4_part())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejected_content_type_invokes_no_tools() {
        let h = harness();
        let err = h
            .pipeline
            .publish_video(
                h.video_id,
                h.owner,
                FilePart {
                    content_type: "video/avi".to_string(),
                    data: b"riff".to_vec(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(h.rewriter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.inspector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_content_type_parameters_are_ignored() {
        let h = harness();
        let video = h
            .pipeline
            .publish_video(
                h.video_id,
                h.owner,
                FilePart {
                    content_type: "video/mp4; codecs=avc1".to_string(),
                    data: b"fake mp4 bytes".to_vec(),
                },
            )
            .await
            .unwrap();
        assert!(video.video_url.is_some());
    }

    #[tokio::test]
    async fn test_rewrite_failure_aborts_before_storage() {
        let h = harness_with(
            FakeRecords::default(),
            FakeStorage::default(),
            FakeInspector::default(),
            FakeRewriter {
                fail: true,
                ..FakeRewriter::default()
            },
        );

        let err = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ProcessingFailed(_)));
        assert_eq!(h.inspector.calls.load(Ordering::SeqCst), 0);
        assert!(h.storage.objects.lock().unwrap().is_empty());
        assert!(h.records.video(h.video_id).video_url.is_none());
    }

    #[tokio::test]
    async fn test_inspection_failure_fails_upload_and_cleans_up() {
        let h = harness_with(
            FakeRecords::default(),
            FakeStorage::default(),
            FakeInspector {
                fail: true,
                ..FakeInspector::default()
            },
            FakeRewriter::default(),
        );

        let err = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InspectionFailed(_)));
        assert!(h.storage.objects.lock().unwrap().is_empty());
        assert_temp_files_gone(&h);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_record_unchanged() {
        let h = harness_with(
            FakeRecords::default(),
            FakeStorage {
                fail_puts: true,
                ..FakeStorage::default()
            },
            FakeInspector::default(),
            FakeRewriter::default(),
        );

        let err = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageWriteFailed(_)));
        assert!(h.records.video(h.video_id).video_url.is_none());
        assert_temp_files_gone(&h);
    }

    #[tokio::test]
    async fn test_persistence_failure_after_storage_write() {
        let h = harness_with(
            FakeRecords {
                fail_updates: true,
                ..FakeRecords::default()
            },
            FakeStorage::default(),
            FakeInspector::default(),
            FakeRewriter::default(),
        );

        let err = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PersistenceFailed(_)));
        // Documented inconsistency: the object was written before the
        // record update failed.
        assert_eq!(h.storage.objects.lock().unwrap().len(), 1);
        assert_temp_files_gone(&h);
    }

    #[tokio::test]
    async fn test_sequential_uploads_last_write_wins() {
        let h = harness();
        let first = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap();
        let second = h
            .pipeline
            .publish_video(h.video_id, h.owner, mp4_part())
            .await
            .unwrap();

        assert_ne!(first.video_url, second.video_url);
        assert_eq!(h.records.video(h.video_id).video_url, second.video_url);
    }

    #[tokio::test]
    async fn test_attach_thumbnail_happy_path() {
        let h = harness();
        let video = h
            .pipeline
            .attach_thumbnail(
                h.video_id,
                h.owner,
                FilePart {
                    content_type: "image/png".to_string(),
                    data: b"png bytes".to_vec(),
                },
            )
            .await
            .unwrap();

        let url = video.thumbnail_url.expect("thumbnail url set");
        assert!(url.ends_with(&format!("{}.png", h.video_id)));
        assert!(h.thumbnails.stored.lock().unwrap().contains_key(&h.video_id));
        // Video locator untouched by the thumbnail path.
        assert!(video.video_url.is_none());
    }

    #[tokio::test]
    async fn test_attach_thumbnail_rejects_non_image() {
        let h = harness();
        let err = h
            .pipeline
            .attach_thumbnail(
                h.video_id,
                h.owner,
                FilePart {
                    content_type: "video/mp4".to_string(),
                    data: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(h.thumbnails.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attach_thumbnail_enforces_ownership() {
        let h = harness();
        let err = h
            .pipeline
            .attach_thumbnail(
                h.video_id,
                Uuid::new_v4(),
                FilePart {
                    content_type: "image/jpeg".to_string(),
                    data: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_oversized_thumbnail_rejected() {
        let h = harness();
        let err = h
            .pipeline
            .attach_thumbnail(
                h.video_id,
                h.owner,
                FilePart {
                    content_type: "image/png".to_string(),
                    data: vec![0u8; MAX_THUMBNAIL_UPLOAD_BYTES + 1],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }
}
