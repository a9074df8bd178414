use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{missing_field, multipart_error, multipart_io_error, upload_error};
use crate::utils::video_access::{load_owned_video, signed_view};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use uuid::Uuid;

const VIDEO_FIELD: &str = "video";

/// Stream the `video` form field through the upload pipeline and attach the
/// committed reference to the record.
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %id, operation = "upload_video")
)]
pub async fn upload_video(
    user: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut video = load_owned_video(&state, &user, id).await?;

    let mut ingested = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let reader = StreamReader::new(Box::pin(field.map_err(multipart_io_error)));

        ingested = Some(
            state
                .pipeline
                .ingest(id, &content_type, reader)
                .await
                .map_err(upload_error)?,
        );
        break;
    }

    let ingested = ingested.ok_or_else(|| missing_field(VIDEO_FIELD))?;

    // Replacing an upload leaves the old object behind when the aspect changed.
    let reference = ingested.reference.to_string();
    if let Some(previous) = video.video_url.replace(reference.clone()) {
        if previous != reference {
            if let Err(e) = state.storage.delete(&previous).await {
                tracing::warn!(error = %e, reference = %previous, "Failed to delete replaced video");
            }
        }
    }
    video.touch();
    state.videos.update_video(&video).await?;

    tracing::info!(
        key = %ingested.key,
        aspect = %ingested.aspect,
        size_bytes = ingested.size_bytes,
        "Video upload attached to record"
    );

    Ok(Json(signed_view(&state, video).await?))
}
