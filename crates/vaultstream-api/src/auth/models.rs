use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;
use vaultstream_core::{AppError, VideoRecord};

/// Authenticated principal, inserted by `auth_middleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl AuthUser {
    /// 403 unless the record belongs to this user.
    pub fn ensure_owns(&self, record: &VideoRecord) -> Result<(), AppError> {
        if record.is_owned_by(self.user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("You don't own this video".to_string()))
        }
    }
}

// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("User not authenticated".to_string())))
    }
}
