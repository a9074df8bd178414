use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::video_access::{load_owned_video, signed_view};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vaultstream_core::models::{CreateVideoRequest, UpdateVideoRequest};
use vaultstream_core::{AppError, VideoRecord};

#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, operation = "create_video")
)]
pub async fn create_video(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()).into());
    }

    let record = VideoRecord::new(user.user_id, request.title, request.description);
    let video = state.videos.create_video(record).await?;

    tracing::info!(video_id = %video.id, "Video record created");

    Ok((StatusCode::CREATED, Json(video)))
}

#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, operation = "list_videos")
)]
pub async fn list_videos(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_videos(user.user_id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list videos");
        HttpAppError::from(e)
    })?;

    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        responses.push(signed_view(&state, video).await?);
    }

    Ok(Json(responses))
}

#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, video_id = %id, operation = "get_video")
)]
pub async fn get_video(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = load_owned_video(&state, &user, id).await?;
    Ok(Json(signed_view(&state, video).await?))
}

#[tracing::instrument(
    skip(state, update),
    fields(user_id = %user.user_id, video_id = %id, operation = "update_video")
)]
pub async fn update_video(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(update): ValidatedJson<UpdateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut video = load_owned_video(&state, &user, id).await?;

    if !update.apply(&mut video) {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()).into());
    }
    state.videos.update_video(&video).await?;

    Ok(Json(signed_view(&state, video).await?))
}
