use crate::body::UploadBody;
use crate::keys::validate_key;
use crate::reference::StorageReference;
use crate::signing::{SignatureVerifier, UrlSigner};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

/// Local filesystem storage implementation
///
/// Files live under `base_path`; URLs point at `base_url` (the API's `/assets`
/// route) and carry an HMAC signature that the route verifies.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signer: UrlSigner,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    /// * `signer` - Signs and verifies asset URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signer: UrlSigner,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that escape the base directory, either lexically or through an
    /// existing symlink.
    pub fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate the unsigned public URL for a key
    fn generate_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }

    fn local_key(reference: &str) -> StorageResult<String> {
        let reference = StorageReference::parse(reference)?;
        if !reference.is_local() {
            return Err(StorageError::InvalidReference(format!(
                "not a local reference: {}",
                reference
            )));
        }
        Ok(reference.key().to_string())
    }

    /// Unique sibling path for an in-progress write to `path`.
    fn partial_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.partial", name, Uuid::new_v4().simple()))
    }

    async fn write_file(path: &Path, body: &mut UploadBody) -> std::io::Result<u64> {
        let mut file = fs::File::create(path).await?;
        let copied = tokio::io::copy(body, &mut file).await?;
        file.sync_all().await?;
        Ok(copied)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(
        &self,
        key: &str,
        mut body: UploadBody,
        _content_type: &str,
    ) -> StorageResult<StorageReference> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        // Write beside the target and rename into place, so a failed re-upload
        // leaves the committed object untouched.
        let partial = Self::partial_path(&path);
        let bytes_copied = match Self::write_file(&partial, &mut body).await {
            Ok(n) => n,
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&partial).await {
                    if remove_err.kind() != ErrorKind::NotFound {
                        tracing::warn!(
                            error = %remove_err,
                            path = %partial.display(),
                            "Failed to remove partially written file"
                        );
                    }
                }
                tracing::error!(
                    error = %e,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage save failed"
                );
                return Err(StorageError::IoError(e));
            }
        };

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::IoError(e));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage save successful"
        );

        Ok(StorageReference::local(key))
    }

    async fn presigned_url(&self, reference: &str, expires_in: Duration) -> StorageResult<String> {
        let key = Self::local_key(reference)?;
        validate_key(&key)?;

        let (expires, signature) = self.signer.sign_key(&key, expires_in);
        Ok(format!(
            "{}?expires={}&signature={}",
            self.generate_url(&key),
            expires,
            signature
        ))
    }

    async fn delete(&self, reference: &str) -> StorageResult<()> {
        let key = Self::local_key(reference)?;
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    fn signature_verifier(&self) -> Option<&dyn SignatureVerifier> {
        Some(&self.signer)
    }
}
