use thiserror::Error;

/// Errors raised by the external media tools
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Invalid tool path: {0}")]
    InvalidToolPath(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Repackage failed: {0}")]
    Repackage(String),
}

/// Validate that a tool path doesn't contain shell metacharacters or traversal
pub(crate) fn validate_tool_path(path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidToolPath(path.to_string()));
    }

    if path.contains("..") {
        return Err(ProcessingError::InvalidToolPath(path.to_string()));
    }

    Ok(())
}
