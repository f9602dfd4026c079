use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::playback::to_video_response;
use crate::state::AppState;
use crate::utils::extract_file_field;
use vidhost_core::models::VideoResponse;
use vidhost_core::AppError;

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/thumbnail",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video record to attach the thumbnail to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail attached", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Video record not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(video_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    // Ownership first: reject foreign callers before buffering the body.
    state
        .pipeline
        .verify_owner(video_id, caller.user_id)
        .await?;

    let part = extract_file_field(multipart, "thumbnail").await?;

    let video = state
        .pipeline
        .attach_thumbnail(video_id, caller.user_id, part)
        .await?;

    let response = to_video_response(&state.storage, video).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}/thumbnail",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video record whose thumbnail to fetch")
    ),
    responses(
        (status = 200, description = "Thumbnail bytes"),
        (status = 404, description = "No thumbnail stored", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let (data, content_type) = state
        .thumbnails
        .get(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No thumbnail for video {}", video_id)))?;

    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}
