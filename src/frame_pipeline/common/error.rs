use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No camera device found. Is the Kinect plugged in?")]
    DeviceUnavailable,

    #[error("Camera frame pull failed: {0}")]
    DeviceIo(String),

    #[error("Failed to write snapshot {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration mismatch for {what}: expected {expected}, got {actual}")]
    ConfigurationMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid buffer length: expected {expected_len} bytes, got {actual_len}")]
    InvalidBuffer { expected_len: usize, actual_len: usize },

    #[error("Failed to encode preview image: {0}")]
    Preview(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn dimensions(what: &'static str, expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::ConfigurationMismatch {
            what,
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
