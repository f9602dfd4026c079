use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::playback::to_video_response;
use crate::state::AppState;
use vidhost_core::models::VideoResponse;
use vidhost_core::AppError;

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video record to fetch")
    ),
    responses(
        (status = 200, description = "Video with resolved playback URL", body = VideoResponse),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Video record not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(video_id): Path<Uuid>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = state.records.get_video(video_id).await?;
    if video.user_id != caller.user_id {
        return Err(AppError::Unauthorized("You do not own this video".to_string()).into());
    }

    let response = to_video_response(&state.storage, video).await?;
    Ok(Json(response))
}
