use crate::body::UploadBody;
use crate::keys::validate_key;
use crate::reference::StorageReference;
use crate::traits::{BoxError, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Minimal object store operations used by `S3Storage`.
///
/// Kept narrow so retry and reference handling can be exercised without a
/// network.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Upload the remaining bytes of `body` to `key`. Returns the number of bytes sent.
    async fn put_object(
        &self,
        key: &str,
        body: &mut UploadBody,
        content_type: &str,
    ) -> Result<u64, BoxError>;

    async fn delete_object(&self, key: &str) -> Result<(), BoxError>;

    async fn signed_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, BoxError>;
}

/// Retry schedule for uploads: the delay before retry `n` is `base_delay * n`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// `ObjectClient` backed by `object_store`'s Amazon S3 implementation
pub struct AmazonS3Client {
    store: Arc<AmazonS3>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl AmazonS3Client {
    /// Create a new client
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let store = Self::build_store(&bucket, &region, endpoint_url.as_deref())?;
        Ok(Self {
            store: Arc::new(store),
            bucket,
            region,
            endpoint_url,
        })
    }

    fn build_store(bucket: &str, region: &str, endpoint: Option<&str>) -> StorageResult<AmazonS3> {
        // Credentials come from the environment; region, bucket and endpoint are explicit.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }
}

#[async_trait]
impl ObjectClient for AmazonS3Client {
    async fn put_object(
        &self,
        key: &str,
        body: &mut UploadBody,
        content_type: &str,
    ) -> Result<u64, BoxError> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let store: Arc<dyn ObjectStore> = self.store.clone();
        let mut writer = BufWriter::new(store, Path::from(key)).with_attributes(attributes);

        let written = match tokio::io::copy(body, &mut writer).await {
            Ok(n) => n,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(error = %abort_err, key = %key, "Failed to abort S3 upload");
                }
                return Err(e.into());
            }
        };
        writer.shutdown().await?;

        Ok(written)
    }

    async fn delete_object(&self, key: &str) -> Result<(), BoxError> {
        self.store.delete(&Path::from(key)).await?;
        Ok(())
    }

    async fn signed_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, BoxError> {
        let location = Path::from(key);
        let url = if bucket == self.bucket {
            self.store
                .signed_url(Method::GET, &location, expires_in)
                .await?
        } else {
            // References may name a bucket other than the configured one.
            let store = Self::build_store(bucket, &self.region, self.endpoint_url.as_deref())?;
            store.signed_url(Method::GET, &location, expires_in).await?
        };
        Ok(url.to_string())
    }
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    retry: RetryPolicy,
}

impl S3Storage {
    /// Create a new S3Storage instance talking to AWS or an S3-compatible provider
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        retry: RetryPolicy,
    ) -> StorageResult<Self> {
        let client = AmazonS3Client::new(bucket.clone(), region, endpoint_url)?;
        Self::with_client(Arc::new(client), bucket, retry)
    }

    pub fn with_client(
        client: Arc<dyn ObjectClient>,
        bucket: String,
        retry: RetryPolicy,
    ) -> StorageResult<Self> {
        // Fail early on a bucket name that could not be encoded in a reference.
        StorageReference::new(bucket.as_str(), "")?;
        Ok(Self {
            client,
            bucket,
            retry,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn save(
        &self,
        key: &str,
        mut body: UploadBody,
        content_type: &str,
    ) -> StorageResult<StorageReference> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let mut attempt = 0;

        let last_error = loop {
            attempt += 1;
            body.rewind().await?;

            match self.client.put_object(key, &mut body, content_type).await {
                Ok(size) => {
                    tracing::info!(
                        bucket = %self.bucket,
                        key = %key,
                        size_bytes = size,
                        attempt = attempt,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 upload successful"
                    );
                    return StorageReference::new(self.bucket.as_str(), key);
                }
                Err(e) => {
                    // A consumed stream cannot be replayed.
                    let retryable = body.is_seekable() && attempt < self.retry.max_attempts;
                    tracing::warn!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %key,
                        attempt = attempt,
                        will_retry = retryable,
                        "S3 upload attempt failed"
                    );
                    if !retryable {
                        break e;
                    }
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                }
            }
        };

        tracing::error!(
            bucket = %self.bucket,
            key = %key,
            attempts = attempt,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload failed"
        );

        Err(StorageError::Remote {
            attempts: attempt,
            source: last_error,
        })
    }

    async fn presigned_url(&self, reference: &str, expires_in: Duration) -> StorageResult<String> {
        let reference = StorageReference::parse(reference)?;
        if reference.is_local() {
            return Err(StorageError::InvalidReference(format!(
                "not an S3 reference: {}",
                reference
            )));
        }
        validate_key(reference.key())?;

        self.client
            .signed_get_url(reference.namespace(), reference.key(), expires_in)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))
    }

    async fn delete(&self, reference: &str) -> StorageResult<()> {
        let reference = StorageReference::parse(reference)?;
        if reference.namespace() != self.bucket {
            return Err(StorageError::InvalidReference(format!(
                "reference does not belong to bucket {}: {}",
                self.bucket, reference
            )));
        }
        let start = std::time::Instant::now();

        self.client
            .delete_object(reference.key())
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %reference.key(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %reference.key(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
