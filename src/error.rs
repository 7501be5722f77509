use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which half of the two-step compression protocol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionPhase {
    Submit,
    Download,
}

impl fmt::Display for CompressionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionPhase::Submit => write!(f, "submit"),
            CompressionPhase::Download => write!(f, "download"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("No image found at the source")]
    NoInput,

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Compression {phase} failed{}: {message}", status_suffix(.status))]
    Compression {
        phase: CompressionPhase,
        status: Option<u16>,
        message: String,
    },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {})", code)).unwrap_or_default()
}

impl PublishError {
    pub fn compression(
        phase: CompressionPhase,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        PublishError::Compression {
            phase,
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_error_names_phase_and_status() {
        let err = PublishError::compression(CompressionPhase::Submit, Some(401), "Unauthorized");
        assert_eq!(
            err.to_string(),
            "Compression submit failed (HTTP 401): Unauthorized"
        );
    }

    #[test]
    fn test_compression_error_without_status() {
        let err = PublishError::compression(CompressionPhase::Download, None, "connection reset");
        assert_eq!(
            err.to_string(),
            "Compression download failed: connection reset"
        );
    }
}
