use async_trait::async_trait;
use std::path::Path;
use vaultstream_processing::{AspectClass, MediaProbe, ProcessingError, Repackager};

/// Marker appended by `AppendingRepackager`.
pub const FASTSTART_MARKER: &[u8] = b"+faststart";

/// Classifies every upload as landscape without running ffprobe.
pub struct LandscapeProbe;

#[async_trait]
impl MediaProbe for LandscapeProbe {
    async fn classify(&self, _path: &Path) -> Result<AspectClass, ProcessingError> {
        Ok(AspectClass::Landscape)
    }
}

/// Copies the input and appends a marker, so tests can tell the stored bytes
/// came from the repackaged file.
pub struct AppendingRepackager;

#[async_trait]
impl Repackager for AppendingRepackager {
    async fn repackage(&self, input: &Path, output: &Path) -> Result<(), ProcessingError> {
        let mut data = tokio::fs::read(input)
            .await
            .map_err(|e| ProcessingError::Repackage(e.to_string()))?;
        data.extend_from_slice(FASTSTART_MARKER);
        tokio::fs::write(output, data)
            .await
            .map_err(|e| ProcessingError::Repackage(e.to_string()))
    }
}

/// Stand-in MP4 payload.
pub fn sample_video() -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.extend(std::iter::repeat(0x42).take(4096));
    data
}

/// Smallest valid PNG signature plus a few bytes of payload.
pub fn sample_png() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(b"thumbnail-bytes");
    data
}
