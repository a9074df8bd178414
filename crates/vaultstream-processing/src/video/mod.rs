//! Video inspection and repackaging

pub mod faststart;
pub mod probe;

pub use faststart::{processing_path, FastStartRepackager, Repackager};
pub use probe::{AspectClass, FfprobeProbe, MediaProbe};
