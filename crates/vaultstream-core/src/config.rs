//! Configuration module
//!
//! Configuration is read once at startup from the environment (optionally seeded
//! from a `.env` file) and validated before any component is built.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8091;
const PRESIGNED_URL_TTL_SECS: u64 = 15 * 60;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const STORAGE_MAX_ATTEMPTS: u32 = 3;
const STORAGE_RETRY_BASE_MS: u64 = 1000;
const MIN_SECRET_LEN: usize = 32;
const MB: usize = 1024 * 1024;

fn mb_to_bytes(mb: usize) -> Option<usize> {
    mb.checked_mul(MB)
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub log_format: String,
}

/// Storage backend settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    pub url_signing_secret: String,
    pub presigned_url_ttl_secs: u64,
    pub max_attempts: u32,
    pub retry_base_ms: u64,
}

/// Media ingestion settings
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_video_size_mb: usize,
    pub max_thumbnail_size_mb: usize,
    pub upload_temp_dir: PathBuf,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server_port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?;

        let base = BaseConfig {
            server_port,
            environment: var("ENVIRONMENT")
                .or_else(|| var("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            cors_origins: var("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            jwt_secret: jwt_secret.clone(),
            log_format: var("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
        };

        let s3_bucket = var("S3_BUCKET");
        let s3_region = var("S3_REGION").or_else(|| var("AWS_REGION"));

        // Without an explicit choice, a fully specified bucket selects S3.
        let backend = match var("STORAGE_BACKEND") {
            Some(name) => name.parse()?,
            None if s3_bucket.is_some() && s3_region.is_some() => StorageBackend::S3,
            None => StorageBackend::Local,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket,
            s3_region,
            s3_endpoint: var("S3_ENDPOINT"),
            assets_root: var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./assets")),
            assets_base_url: var("ASSETS_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/assets", server_port)),
            url_signing_secret: var("URL_SIGNING_SECRET").unwrap_or(jwt_secret),
            presigned_url_ttl_secs: var("PRESIGNED_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PRESIGNED_URL_TTL_SECS),
            max_attempts: var("STORAGE_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(STORAGE_MAX_ATTEMPTS),
            retry_base_ms: var("STORAGE_RETRY_BASE_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(STORAGE_RETRY_BASE_MS),
        };

        let media = MediaConfig {
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: var("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            max_video_size_mb: var("MAX_VIDEO_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_VIDEO_SIZE_MB),
            max_thumbnail_size_mb: var("MAX_THUMBNAIL_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_THUMBNAIL_SIZE_MB),
            upload_temp_dir: var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        };

        let config = Config {
            base,
            storage,
            media,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_SECRET_LEN
            ));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        for (name, mb) in [
            ("MAX_VIDEO_SIZE_MB", self.media.max_video_size_mb),
            ("MAX_THUMBNAIL_SIZE_MB", self.media.max_thumbnail_size_mb),
        ] {
            if mb == 0 || mb_to_bytes(mb).is_none() {
                return Err(anyhow::anyhow!(
                    "{} must be between 1 and {}",
                    name,
                    usize::MAX / MB
                ));
            }
        }

        if self.storage.max_attempts == 0 {
            return Err(anyhow::anyhow!("STORAGE_MAX_ATTEMPTS must be at least 1"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                match self.storage.s3_bucket.as_deref() {
                    None => {
                        return Err(anyhow::anyhow!(
                            "S3_BUCKET must be set when using S3 storage backend"
                        ))
                    }
                    // Storage references use ',' as the backend separator.
                    Some(bucket) if bucket.contains(',') => {
                        return Err(anyhow::anyhow!("S3_BUCKET must not contain ','"))
                    }
                    Some(_) => {}
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.url_signing_secret.len() < MIN_SECRET_LEN {
                    return Err(anyhow::anyhow!(
                        "URL_SIGNING_SECRET must be at least {} characters long",
                        MIN_SECRET_LEN
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn presigned_url_ttl_secs(&self) -> u64 {
        self.storage.presigned_url_ttl_secs
    }

    pub fn max_video_size_bytes(&self) -> usize {
        mb_to_bytes(self.media.max_video_size_mb).unwrap_or(usize::MAX)
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        mb_to_bytes(self.media.max_thumbnail_size_mb).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults_select_local_backend() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Local);
        assert_eq!(config.server_port(), 8091);
        assert_eq!(
            config.storage.assets_base_url,
            "http://localhost:8091/assets"
        );
        assert_eq!(config.storage.url_signing_secret, SECRET);
        assert_eq!(config.presigned_url_ttl_secs(), 900);
        assert_eq!(config.storage.max_attempts, 3);
        assert_eq!(config.max_video_size_bytes(), 1 << 30);
    }

    #[test]
    fn test_bucket_and_region_select_s3() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "vaultstream-media"),
            ("S3_REGION", "us-east-2"),
        ])
        .unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::S3);
    }

    #[test]
    fn test_explicit_backend_wins() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("STORAGE_BACKEND", "local"),
            ("S3_BUCKET", "vaultstream-media"),
            ("S3_REGION", "us-east-2"),
        ])
        .unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Local);
    }

    #[test]
    fn test_s3_requires_bucket() {
        let err = load(&[("JWT_SECRET", SECRET), ("STORAGE_BACKEND", "s3")]).unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));
    }

    #[test]
    fn test_bucket_with_comma_rejected() {
        let err = load(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "a,b"),
            ("S3_REGION", "us-east-2"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("','"));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(load(&[("JWT_SECRET", "short")]).is_err());
        assert!(load(&[]).is_err());
    }

    #[test]
    fn test_oversized_upload_caps_rejected() {
        let huge = (usize::MAX / MB + 1).to_string();
        let err =
            load(&[("JWT_SECRET", SECRET), ("MAX_VIDEO_SIZE_MB", huge.as_str())]).unwrap_err();
        assert!(err.to_string().contains("MAX_VIDEO_SIZE_MB"));

        let err = load(&[("JWT_SECRET", SECRET), ("MAX_THUMBNAIL_SIZE_MB", "0")]).unwrap_err();
        assert!(err.to_string().contains("MAX_THUMBNAIL_SIZE_MB"));

        let config = load(&[("JWT_SECRET", SECRET), ("MAX_THUMBNAIL_SIZE_MB", "2")]).unwrap();
        assert_eq!(config.max_thumbnail_size_bytes(), 2 * MB);
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let err = load(&[("JWT_SECRET", SECRET), ("ENVIRONMENT", "production")]).unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));
    }
}
