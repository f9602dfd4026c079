//! Error types module
//!
//! All failures in the upload-and-publish pipeline are unified under the
//! `AppError` enum. Each variant carries the internal detail; the
//! `ErrorMetadata` trait maps a variant to the HTTP status, machine code,
//! and client-facing message the API layer renders. Internal detail is
//! logged, never echoed to callers.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROCESSING_FAILED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether internal details must be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Container rewrite failed: {0}")]
    ProcessingFailed(String),

    #[error("Media inspection failed: {0}")]
    InspectionFailed(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Storage URL signing failed: {0}")]
    StorageSignFailed(String),

    #[error("Record persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => AppError::PersistenceFailed(other.to_string()),
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid ID: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, sensitive, log_level).
/// Client message stays per-variant below for dynamic content.
fn static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::ProcessingFailed(_) => (500, "PROCESSING_FAILED", true, LogLevel::Error),
        AppError::InspectionFailed(_) => (500, "INSPECTION_FAILED", true, LogLevel::Error),
        AppError::StorageWriteFailed(_) => (500, "STORAGE_WRITE_FAILED", true, LogLevel::Error),
        AppError::StorageSignFailed(_) => (500, "STORAGE_SIGN_FAILED", true, LogLevel::Error),
        AppError::PersistenceFailed(_) => (500, "PERSISTENCE_FAILED", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Error type name for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::ProcessingFailed(_) => "ProcessingFailed",
            AppError::InspectionFailed(_) => "InspectionFailed",
            AppError::StorageWriteFailed(_) => "StorageWriteFailed",
            AppError::StorageSignFailed(_) => "StorageSignFailed",
            AppError::PersistenceFailed(_) => "PersistenceFailed",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::ProcessingFailed(_) => "Failed to process video".to_string(),
            AppError::InspectionFailed(_) => "Failed to inspect video".to_string(),
            AppError::StorageWriteFailed(_) => "Failed to store file".to_string(),
            AppError::StorageSignFailed(_) => "Failed to sign playback URL".to_string(),
            AppError::PersistenceFailed(_) => "Failed to update record".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
