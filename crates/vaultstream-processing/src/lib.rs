//! Vaultstream Processing Library
//!
//! Media ingestion for uploaded videos and thumbnails:
//!
//! - `video`: ffprobe-based aspect classification and ffmpeg fast-start repackaging
//! - `upload`: the staged upload pipeline, scratch-file guards and thumbnail ingestion
//!
//! The external tools sit behind the `MediaProbe` and `Repackager` traits so the
//! pipeline can run against fakes in tests.

pub mod error;
pub mod upload;
pub mod video;

pub use error::ProcessingError;
pub use upload::{
    IngestedThumbnail, IngestedVideo, PipelineError, PipelineStage, ScratchFile, ThumbnailIngest,
    UploadPipeline,
};
pub use video::{AspectClass, FastStartRepackager, FfprobeProbe, MediaProbe, Repackager};
