//! Vidhost Storage Library
//!
//! Object store gateway: the `ObjectStorage` trait with S3 and local
//! filesystem backends, plus storage key derivation for processed videos.
//!
//! # Locator format
//!
//! The S3 backend reports locators as `{bucket},{key}`; playback resolution
//! recognizes that two-part form and signs a time-limited GET URL for it.
//! The local backend reports a directly servable URL instead, which passes
//! through resolution unchanged.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use keys::derive_video_key;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
