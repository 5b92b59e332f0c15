//! Host errors module

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by host world operations
#[derive(Error, Debug)]
pub enum HostError {
    #[error("World '{name}' not found")]
    WorldNotFound { name: String },

    #[error("World '{name}' is not loaded")]
    NotLoaded { name: String },

    #[error("Invalid world name: '{name}'")]
    InvalidName { name: String },

    #[error("Host has shut down")]
    ShutDown,

    #[error("Failed to save world '{name}' during shutdown: {source}")]
    ShutdownSave { name: String, source: Box<HostError> },

    #[error("I/O error at {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Corrupt level data for world '{name}': {source}")]
    Corrupt { name: String, source: serde_json::Error },

    #[error("Host operation failed: {reason}")]
    Other { reason: String },
}

impl HostError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::Io { path: path.into(), source }
    }
}
