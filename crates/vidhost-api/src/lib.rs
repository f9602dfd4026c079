//! Vidhost API
//!
//! HTTP handlers, middleware, and application wiring for the video hosting
//! backend.

mod api_doc;
mod handlers;
mod utils;

pub mod auth;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use routes::build_router;
pub use state::AppState;
