//! Record layer seam.
//!
//! The storage and processing crates never talk to persistence directly; the API
//! reads and writes `VideoRecord`s through this trait.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::VideoRecord;

/// Trait for video record operations
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, record: VideoRecord) -> Result<VideoRecord, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    async fn update_video(&self, record: &VideoRecord) -> Result<(), AppError>;

    /// Records owned by `user_id`, newest first.
    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError>;

    /// Remove a record. Returns false when it did not exist.
    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError>;
}
