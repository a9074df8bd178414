//! Common utilities for multipart upload handlers

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use std::io;
use vaultstream_core::AppError;
use vaultstream_processing::PipelineError;

use crate::error::HttpAppError;

/// Map a multipart read failure, keeping the body-limit case distinct.
pub fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
    } else {
        AppError::BadRequest(format!("Couldn't parse form: {}", err.body_text()))
    }
}

/// Adapter so a multipart field can feed an `AsyncRead`.
pub fn multipart_io_error(err: MultipartError) -> io::Error {
    io::Error::other(err)
}

/// Pipeline errors whose staging failure came from the multipart stream are
/// client errors, not storage faults.
pub fn upload_error(err: PipelineError) -> HttpAppError {
    if let PipelineError::Io(io_err) = &err {
        if let Some(multipart_err) = io_err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
        {
            return HttpAppError(multipart_error(multipart_err));
        }
    }
    err.into()
}

/// Buffer a multipart field, giving up as soon as it grows past `limit` bytes.
pub async fn read_field_capped(
    mut field: Field<'_>,
    limit: usize,
) -> Result<Bytes, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(&e))? {
        if buf.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

fn too_large(limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!("Upload exceeds max {} bytes", limit))
}

pub fn missing_field(name: &str) -> AppError {
    AppError::InvalidInput(format!("Missing form field '{}'", name))
}
