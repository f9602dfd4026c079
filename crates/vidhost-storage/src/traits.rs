//! Storage abstraction trait
//!
//! Defines the `ObjectStorage` trait both storage backends implement. The
//! gateway is stateless: all durable state lives in the external store.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use vidhost_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    WriteFailed(String),

    #[error("URL signing failed: {0}")]
    SignFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::WriteFailed(msg) => AppError::StorageWriteFailed(msg),
            StorageError::SignFailed(msg) => AppError::StorageSignFailed(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::StorageWriteFailed(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store gateway.
///
/// Two real operations: a durable write (no automatic retry; any transport
/// or server error surfaces as `WriteFailed`) and signed-read-URL issuance.
/// `locator` reports the value recorded on the asset after a write under
/// the given key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `data` under `key` with the given content type.
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Mint a time-limited URL permitting anonymous read of `key`.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// The locator to persist on the asset record for `key`.
    fn locator(&self, key: &str) -> String;
}
