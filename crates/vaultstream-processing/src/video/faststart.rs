//! Fast-start remux through ffmpeg.
//!
//! Moves the MP4 `moov` atom to the front of the file so playback can begin before
//! the download finishes. Streams are copied, not re-encoded.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{validate_tool_path, ProcessingError};

/// `<input>.processing`
pub fn processing_path(input: &Path) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(".processing");
    PathBuf::from(path)
}

#[async_trait]
pub trait Repackager: Send + Sync {
    /// Where `repackage` writes its output for `input`. Never equal to `input`.
    fn output_path(&self, input: &Path) -> PathBuf {
        processing_path(input)
    }

    /// Write a repackaged copy of `input` to `output`. The input is left untouched.
    async fn repackage(&self, input: &Path, output: &Path) -> Result<(), ProcessingError>;
}

pub struct FastStartRepackager {
    ffmpeg_path: String,
}

impl FastStartRepackager {
    pub fn new(ffmpeg_path: String) -> Result<Self, ProcessingError> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl Repackager for FastStartRepackager {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn repackage(&self, input: &Path, output: &Path) -> Result<(), ProcessingError> {
        if input == output {
            return Err(ProcessingError::Repackage(
                "output path must differ from input".to_string(),
            ));
        }

        let start = std::time::Instant::now();

        let result = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProcessingError::Repackage(format!("failed to execute ffmpeg: {}", e)))?;

        if !result.status.success() {
            tracing::warn!(
                status = %result.status,
                stderr = %String::from_utf8_lossy(&result.stderr),
                "ffmpeg exited with failure"
            );
            return Err(ProcessingError::Repackage(format!(
                "ffmpeg exited with {}",
                result.status
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fast-start repackage completed"
        );

        Ok(())
    }
}
