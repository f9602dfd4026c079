//! Route configuration.
//!
//! Public routes (health, static assets, OpenAPI) are merged with the
//! bearer-authenticated API group. Body limits are applied per route: each
//! upload route allows its media cap plus multipart framing overhead.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api_doc;
use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use vidhost_core::constants::{MAX_THUMBNAIL_UPLOAD_BYTES, MAX_VIDEO_UPLOAD_BYTES};

/// Slack for multipart boundaries and headers on top of the media cap.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .route(
            "/api/openapi.json",
            get(|| async { Json(api_doc::openapi_spec()) }),
        )
        .nest_service("/assets", ServeDir::new(state.config.assets_root.clone()));

    let protected = Router::new()
        .route(
            "/api/videos/{video_id}/upload",
            post(handlers::video_upload::upload_video).layer(DefaultBodyLimit::max(
                MAX_VIDEO_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/api/videos/{video_id}/thumbnail",
            post(handlers::thumbnail_upload::upload_thumbnail)
                .get(handlers::thumbnail_upload::get_thumbnail)
                .layer(DefaultBodyLimit::max(
                    MAX_THUMBNAIL_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
                )),
        )
        .route(
            "/api/videos/{video_id}",
            get(handlers::video_get::get_video),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
