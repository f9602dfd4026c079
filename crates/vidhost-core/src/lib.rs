//! Vidhost Core Library
//!
//! Shared foundations for the vidhost workspace: the unified error type,
//! environment-driven configuration, domain constants, and the video record
//! models exchanged between the API, database, and storage crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
