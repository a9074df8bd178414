//! Thumbnail ingestion.
//!
//! Thumbnails are small enough to buffer, so they skip staging and go straight
//! to storage under `thumbnails/<video_id>.<ext>`.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use vaultstream_storage::{Storage, StorageReference, UploadBody};

use super::essence;
use super::pipeline::PipelineError;

/// Accepted media types and the extension each is stored with.
const THUMBNAIL_TYPES: &[(&str, &str)] = &[("image/jpeg", "jpg"), ("image/png", "png")];

#[derive(Debug, Clone)]
pub struct IngestedThumbnail {
    pub reference: StorageReference,
    pub key: String,
}

#[derive(Clone)]
pub struct ThumbnailIngest {
    storage: Arc<dyn Storage>,
    max_bytes: usize,
}

impl ThumbnailIngest {
    pub fn new(storage: Arc<dyn Storage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn storage_key(video_id: Uuid, extension: &str) -> String {
        format!("thumbnails/{}.{}", video_id, extension)
    }

    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    pub async fn ingest(
        &self,
        video_id: Uuid,
        content_type: &str,
        data: Bytes,
    ) -> Result<IngestedThumbnail, PipelineError> {
        let media_type = essence(content_type);
        let extension = THUMBNAIL_TYPES
            .iter()
            .find(|(mime, _)| *mime == media_type)
            .map(|(_, ext)| *ext)
            .ok_or(PipelineError::UnsupportedMediaType(media_type.clone()))?;

        if data.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }
        if data.len() > self.max_bytes {
            return Err(PipelineError::TooLarge {
                size: data.len() as u64,
                limit: self.max_bytes as u64,
            });
        }

        let key = Self::storage_key(video_id, extension);
        let reference = self
            .storage
            .save(&key, UploadBody::from_bytes(data), &media_type)
            .await?;

        tracing::info!(key = %key, "Thumbnail stored");

        Ok(IngestedThumbnail { reference, key })
    }
}
