//! Application state shared across handlers.

use std::sync::Arc;

use vidhost_core::Config;
use vidhost_db::VideoRecords;
use vidhost_storage::ObjectStorage;

use crate::services::thumbnails::ThumbnailStore;
use crate::services::upload::UploadPipeline;

pub struct AppState {
    pub config: Config,
    pub records: Arc<dyn VideoRecords>,
    pub storage: Arc<dyn ObjectStorage>,
    pub thumbnails: Arc<dyn ThumbnailStore>,
    pub pipeline: UploadPipeline,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
