//! Application setup and initialization
//!
//! Builds every component from the validated configuration so `main` only has to
//! load the config and start the server.

pub mod routes;
pub mod server;

use crate::auth::JwtIdentityResolver;
use crate::repository::InMemoryVideoRepository;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vaultstream_core::Config;
use vaultstream_processing::{ThumbnailIngest, UploadPipeline};
use vaultstream_storage::create_storage;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config.base.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;

    let pipeline = UploadPipeline::from_config(&config, storage.clone())
        .context("Failed to initialize upload pipeline")?;
    let thumbnails = ThumbnailIngest::new(storage.clone(), config.max_thumbnail_size_bytes());

    let state = Arc::new(AppState {
        identity: Arc::new(JwtIdentityResolver::new(config.jwt_secret())),
        videos: Arc::new(InMemoryVideoRepository::new()),
        storage,
        pipeline,
        thumbnails,
        config,
    });

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
