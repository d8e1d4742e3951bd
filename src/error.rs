//! Error types for dircat

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DircatError {
    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No entries matched: {0}")]
    EmptyResult(String),

    #[error("Invalid encoding mode '{0}'. Use 'multi-class' or 'multi-label'")]
    InvalidMode(String),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Symlink cycle detected at {}", .0.display())]
    SymlinkCycle(PathBuf),

    #[error("Directory already visited: {} resolves to {}", path.display(), target.display())]
    DirectoryRevisited { path: PathBuf, target: PathBuf },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DircatError {
    /// Wraps an IO error with the path it occurred at
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DircatError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DircatError>;
