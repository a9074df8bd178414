//! Video upload pipeline: stage → probe → repackage → commit.
//!
//! Each inbound upload gets its own `UploadPipeline::ingest` call. Stages run in
//! order and the two scratch files (the staged upload and its fast-start copy)
//! are removed on every exit path.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

use vaultstream_core::Config;
use vaultstream_storage::{Storage, StorageError, StorageReference, UploadBody};

use super::essence;
use super::scratch::ScratchFile;
use crate::error::ProcessingError;
use crate::video::{AspectClass, FastStartRepackager, FfprobeProbe, MediaProbe, Repackager};

pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
const STAGING_PREFIX: &str = "vaultstream-upload";
const STAGING_SUFFIX: &str = ".mp4";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to stage upload: {0}")]
    Io(#[from] io::Error),

    #[error("Upload is empty")]
    EmptyUpload,

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Position of an upload in the pipeline, reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Staged,
    Probed,
    Repackaged,
    Committed,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Staged => "staged",
            PipelineStage::Probed => "probed",
            PipelineStage::Repackaged => "repackaged",
            PipelineStage::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Result of a committed upload
#[derive(Debug, Clone)]
pub struct IngestedVideo {
    pub reference: StorageReference,
    pub key: String,
    pub aspect: AspectClass,
    pub size_bytes: u64,
}

#[derive(Clone)]
pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    probe: Arc<dyn MediaProbe>,
    repackager: Arc<dyn Repackager>,
    temp_dir: PathBuf,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        probe: Arc<dyn MediaProbe>,
        repackager: Arc<dyn Repackager>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            probe,
            repackager,
            temp_dir: temp_dir.into(),
        }
    }

    /// Build a pipeline around ffprobe and ffmpeg as configured.
    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> Result<Self, ProcessingError> {
        let probe = FfprobeProbe::new(config.media.ffprobe_path.clone())?;
        let repackager = FastStartRepackager::new(config.media.ffmpeg_path.clone())?;
        Ok(Self::new(
            storage,
            Arc::new(probe),
            Arc::new(repackager),
            config.media.upload_temp_dir.clone(),
        ))
    }

    /// Storage key for a committed video: `<aspect>/<video_id>.mp4`
    pub fn storage_key(aspect: AspectClass, video_id: Uuid) -> String {
        format!("{}/{}.mp4", aspect.prefix(), video_id)
    }

    #[tracing::instrument(skip(self, upload))]
    pub async fn ingest<R>(
        &self,
        video_id: Uuid,
        content_type: &str,
        upload: R,
    ) -> Result<IngestedVideo, PipelineError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = std::time::Instant::now();

        let media_type = essence(content_type);
        if media_type != VIDEO_CONTENT_TYPE {
            return Err(PipelineError::UnsupportedMediaType(media_type));
        }
        tracing::debug!(stage = %PipelineStage::Received, "Upload received");

        let (mut staged, size_bytes) = self.stage(upload).await?;
        tracing::debug!(
            stage = %PipelineStage::Staged,
            size_bytes = size_bytes,
            path = %staged.path().display(),
            "Upload staged"
        );

        let mut repackaged = None;
        let result = self
            .process(video_id, &staged, size_bytes, &mut repackaged)
            .await;

        staged.cleanup().await;
        if let Some(mut repackaged) = repackaged {
            repackaged.cleanup().await;
        }

        match &result {
            Ok(video) => tracing::info!(
                stage = %PipelineStage::Committed,
                key = %video.key,
                size_bytes = video.size_bytes,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Video upload committed"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Video upload failed"
            ),
        }

        result
    }

    /// Copy the upload into a private temp file.
    async fn stage<R>(&self, mut upload: R) -> Result<(ScratchFile, u64), PipelineError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.temp_dir)?;
        let (file, path) = named.keep().map_err(|e| e.error)?;
        let mut scratch = ScratchFile::new(path);

        let mut file = tokio::fs::File::from_std(file);
        let copied = async {
            let size = tokio::io::copy(&mut upload, &mut file).await?;
            file.flush().await?;
            Ok::<_, io::Error>(size)
        }
        .await;
        drop(file);

        match copied {
            Ok(size) => Ok((scratch, size)),
            Err(e) => {
                scratch.cleanup().await;
                Err(PipelineError::Io(e))
            }
        }
    }

    async fn process(
        &self,
        video_id: Uuid,
        staged: &ScratchFile,
        size_bytes: u64,
        repackaged: &mut Option<ScratchFile>,
    ) -> Result<IngestedVideo, PipelineError> {
        if size_bytes == 0 {
            return Err(PipelineError::EmptyUpload);
        }

        let aspect = self.probe.classify(staged.path()).await?;
        tracing::debug!(stage = %PipelineStage::Probed, aspect = %aspect, "Upload probed");

        let output = self.repackager.output_path(staged.path());
        if output == staged.path() {
            return Err(ProcessingError::Repackage(
                "repackager output would overwrite its input".to_string(),
            )
            .into());
        }
        // Guard the output before the tool runs so partial output is removed too.
        let output = repackaged.insert(ScratchFile::new(output));
        self.repackager
            .repackage(staged.path(), output.path())
            .await?;
        tracing::debug!(stage = %PipelineStage::Repackaged, "Upload repackaged");

        let key = Self::storage_key(aspect, video_id);
        let file = tokio::fs::File::open(output.path()).await?;
        let size_bytes = file.metadata().await?.len();

        let reference = self
            .storage
            .save(&key, UploadBody::seekable(file), VIDEO_CONTENT_TYPE)
            .await?;

        Ok(IngestedVideo {
            reference,
            key,
            aspect,
            size_bytes,
        })
    }
}
