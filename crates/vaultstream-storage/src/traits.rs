//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::body::UploadBody;
use crate::reference::StorageReference;
use crate::signing::SignatureVerifier;
use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Boxed error from a remote object store client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed after {attempts} attempt(s): {source}")]
    Remote {
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid storage reference: {0}")]
    InvalidReference(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait. The
/// backend is built once at startup and shared as `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `body` under `key` and return the reference to persist.
    ///
    /// Writes to an existing key replace it.
    async fn save(
        &self,
        key: &str,
        body: UploadBody,
        content_type: &str,
    ) -> StorageResult<StorageReference>;

    /// Generate a time-limited GET URL for a persisted reference.
    async fn presigned_url(&self, reference: &str, expires_in: Duration) -> StorageResult<String>;

    /// Delete the object behind a persisted reference.
    async fn delete(&self, reference: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Verifier for URLs this backend signs itself, if any.
    fn signature_verifier(&self) -> Option<&dyn SignatureVerifier> {
        None
    }
}
