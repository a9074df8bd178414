use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{missing_field, multipart_error, read_field_capped};
use crate::utils::video_access::{load_owned_video, signed_view};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

const THUMBNAIL_FIELD: &str = "thumbnail";

#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %id, operation = "upload_thumbnail")
)]
pub async fn upload_thumbnail(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut video = load_owned_video(&state, &user, id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = read_field_capped(field, state.thumbnails.max_bytes()).await?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) = upload.ok_or_else(|| missing_field(THUMBNAIL_FIELD))?;
    let thumbnail = state.thumbnails.ingest(id, &content_type, data).await?;

    // jpg and png thumbnails live under different keys.
    let reference = thumbnail.reference.to_string();
    if let Some(previous) = video.thumbnail_url.replace(reference.clone()) {
        if previous != reference {
            if let Err(e) = state.storage.delete(&previous).await {
                tracing::warn!(error = %e, reference = %previous, "Failed to delete replaced thumbnail");
            }
        }
    }
    video.touch();
    state.videos.update_video(&video).await?;

    Ok(Json(signed_view(&state, video).await?))
}
