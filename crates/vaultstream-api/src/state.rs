//! Application state shared by all handlers.

use crate::auth::IdentityResolver;
use std::sync::Arc;
use std::time::Duration;
use vaultstream_core::{Config, VideoRepository};
use vaultstream_processing::{ThumbnailIngest, UploadPipeline};
use vaultstream_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub videos: Arc<dyn VideoRepository>,
    pub pipeline: UploadPipeline,
    pub thumbnails: ThumbnailIngest,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Lifetime of the URLs handed out in signed record views.
    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.config.presigned_url_ttl_secs())
    }
}
