//! Bearer-token authentication.
//!
//! Identity verification is delegated to the token issuer; this module only
//! validates HS256 JWTs and exposes the caller identity to handlers.

pub mod middleware;
pub mod models;

pub use middleware::auth_middleware;
pub use models::Caller;
