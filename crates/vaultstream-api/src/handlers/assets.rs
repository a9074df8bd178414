//! Serving of locally stored assets behind signed URLs.
//!
//! URLs are minted by the local backend as
//! `<base>/<key>?expires=<unix>&signature=<hex>`. The signature is checked before
//! the filesystem is touched; range requests and content types are handled by
//! `tower_http::services::ServeFile`.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::io::ErrorKind;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use vaultstream_core::AppError;
use vaultstream_storage::validate_key;

const ASSET_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

#[derive(Debug, Default, Deserialize)]
pub struct AssetQuery {
    #[serde(default)]
    pub expires: String,
    #[serde(default)]
    pub signature: String,
}

#[tracing::instrument(skip(state, query, request), fields(key = %key))]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<AssetQuery>,
    request: Request,
) -> Result<Response, HttpAppError> {
    validate_key(&key).map_err(|_| AppError::BadRequest("Invalid path".to_string()))?;

    if let Some(verifier) = state.storage.signature_verifier() {
        if !verifier.verify(&key, &query.expires, &query.signature) {
            return Err(AppError::Unauthorized("Invalid or expired signature".to_string()).into());
        }
    }

    let path = state.config.storage.assets_root.join(&key);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()).into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };
    if metadata.is_dir() {
        return Err(AppError::BadRequest("Invalid path".to_string()).into());
    }

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = response.map(Body::new).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(ASSET_CACHE_CONTROL),
    );

    tracing::debug!(status = %response.status(), size_bytes = metadata.len(), "Served asset");
    Ok(response)
}
