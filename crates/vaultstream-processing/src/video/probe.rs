//! Aspect-ratio classification through ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{validate_tool_path, ProcessingError};

/// Orientation bucket for a video, used as its storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectClass {
    /// Exactly 16:9
    Landscape,
    /// Exactly 9:16
    Portrait,
    Other,
}

impl AspectClass {
    /// Exact integer comparison; a zero dimension is never a ratio.
    pub fn from_dimensions(width: u64, height: u64) -> Self {
        if width == 0 || height == 0 {
            return AspectClass::Other;
        }
        if width * 9 == height * 16 {
            AspectClass::Landscape
        } else if width * 16 == height * 9 {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.prefix())
    }
}

#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn classify(&self, path: &Path) -> Result<AspectClass, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    width: u64,
    #[serde(default)]
    height: u64,
}

/// Classify ffprobe's `-print_format json -show_streams` output by its first stream.
fn classify_probe_output(stdout: &[u8]) -> Result<AspectClass, ProcessingError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Probe(format!("unexpected ffprobe output: {}", e)))?;

    Ok(match output.streams.first() {
        Some(stream) => AspectClass::from_dimensions(stream.width, stream.height),
        None => AspectClass::Other,
    })
}

pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: String) -> Result<Self, ProcessingError> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn classify(&self, path: &Path) -> Result<AspectClass, ProcessingError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProcessingError::Probe(format!("failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            tracing::warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "ffprobe exited with failure"
            );
            return Err(ProcessingError::Probe(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        let aspect = classify_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            aspect = %aspect,
            "Video probe completed"
        );

        Ok(aspect)
    }
}
