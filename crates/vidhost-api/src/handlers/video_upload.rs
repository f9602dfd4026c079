use axum::{
    extract::{Multipart, Path, State},
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

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video record to publish the upload under")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video published", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Video record not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
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

    let part = extract_file_field(multipart, "video").await?;

    let video = state
        .pipeline
        .publish_video(video_id, caller.user_id, part)
        .await?;

    let response = to_video_response(&state.storage, video).await?;
    Ok(Json(response))
}
