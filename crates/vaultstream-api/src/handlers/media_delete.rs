//! Deletion of whole records, or of a record's video file or thumbnail.
//!
//! Storage deletion is best-effort: the reference is cleared from the record even
//! when the object is already gone or the backend refuses.

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::video_access::load_owned_video;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vaultstream_storage::{Storage, StorageError};

async fn delete_best_effort(storage: &dyn Storage, reference: &str) {
    match storage.delete(reference).await {
        Ok(()) => {}
        Err(StorageError::NotFound(key)) => {
            tracing::debug!(key = %key, "Stored object already absent");
        }
        Err(e) => {
            tracing::warn!(error = %e, reference = %reference, "Failed to delete stored object");
        }
    }
}

#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, video_id = %id, operation = "delete_video")
)]
pub async fn delete_video(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = load_owned_video(&state, &user, id).await?;

    for reference in [&video.video_url, &video.thumbnail_url].into_iter().flatten() {
        delete_best_effort(state.storage.as_ref(), reference).await;
    }
    state.videos.delete_video(id).await?;

    tracing::info!("Video record deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, video_id = %id, operation = "delete_thumbnail")
)]
pub async fn delete_thumbnail(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut video = load_owned_video(&state, &user, id).await?;

    if let Some(reference) = video.thumbnail_url.take() {
        delete_best_effort(state.storage.as_ref(), &reference).await;
    }
    video.touch();
    state.videos.update_video(&video).await?;

    Ok(Json(serde_json::json!({
        "message": "Thumbnail deleted successfully"
    })))
}

#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, video_id = %id, operation = "delete_video_file")
)]
pub async fn delete_video_file(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut video = load_owned_video(&state, &user, id).await?;

    if let Some(reference) = video.video_url.take() {
        delete_best_effort(state.storage.as_ref(), &reference).await;
    }
    video.touch();
    state.videos.update_video(&video).await?;

    Ok(Json(serde_json::json!({
        "message": "Video file deleted successfully"
    })))
}
