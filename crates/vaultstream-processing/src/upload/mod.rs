//! Upload ingestion: stage → probe → repackage → commit.

pub mod pipeline;
pub mod scratch;
pub mod thumbnail;

pub use pipeline::{IngestedVideo, PipelineError, PipelineStage, UploadPipeline};
pub use scratch::ScratchFile;
pub use thumbnail::{IngestedThumbnail, ThumbnailIngest};

/// Lowercased media type without parameters: `"Video/MP4; codecs=avc1"` → `"video/mp4"`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
