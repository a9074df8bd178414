#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::{RetryPolicy, S3Storage};
use crate::{Storage, StorageBackend, StorageError, StorageResult, UrlSigner};
use std::sync::Arc;
use std::time::Duration;
use vaultstream_core::Config;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let settings = &config.storage;

    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = settings
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = settings.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let retry = RetryPolicy::new(
                settings.max_attempts,
                Duration::from_millis(settings.retry_base_ms),
            );

            tracing::info!(bucket = %bucket, region = %region, "Using S3 storage backend");
            let storage = S3Storage::new(bucket, region, settings.s3_endpoint.clone(), retry)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let signer = UrlSigner::new(settings.url_signing_secret.as_bytes())?;

            tracing::info!(
                root = %settings.assets_root.display(),
                base_url = %settings.assets_base_url,
                "Using local storage backend"
            );
            let storage = LocalStorage::new(
                settings.assets_root.clone(),
                settings.assets_base_url.clone(),
                signer,
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
