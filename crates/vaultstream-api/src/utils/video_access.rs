//! Record lookup and the signed view returned to clients.

use crate::auth::AuthUser;
use crate::state::AppState;
use uuid::Uuid;
use vaultstream_core::{AppError, VideoRecord};

/// Load a record and check the caller owns it: 404 when absent, 403 when foreign.
pub async fn load_owned_video(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<VideoRecord, AppError> {
    let video = state
        .videos
        .get_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    user.ensure_owns(&video)?;
    Ok(video)
}

/// Replace stored references with presigned URLs.
///
/// A stored reference that cannot be presigned is a server-side fault, so the
/// failure surfaces as a storage error rather than a bad request.
pub async fn signed_view(state: &AppState, mut video: VideoRecord) -> Result<VideoRecord, AppError> {
    let ttl = state.presigned_url_ttl();

    for slot in [&mut video.video_url, &mut video.thumbnail_url] {
        if let Some(reference) = slot.as_deref() {
            let url = state
                .storage
                .presigned_url(reference, ttl)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, reference = %reference, "Failed to presign stored reference");
                    AppError::Storage(format!("Couldn't generate presigned URL: {}", e))
                })?;
            *slot = Some(url);
        }
    }

    Ok(video)
}
