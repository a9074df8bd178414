//! Owned temp files that are removed exactly once.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Guard for a scratch file on local disk.
///
/// `cleanup` removes the file and is idempotent. A guard that is dropped
/// without being cleaned up (an aborted request task, an early return) removes
/// its file synchronously. Removal errors are logged and never propagated; a
/// file that is already gone counts as removed.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    removed: bool,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub async fn cleanup(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove scratch file"
            ),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed scratch file on drop"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove scratch file on drop"
            ),
        }
    }
}
