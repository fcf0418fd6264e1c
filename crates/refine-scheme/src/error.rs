//! Error types for scheme documents

use std::path::PathBuf;

use refine_core::RefineError;
use thiserror::Error;

/// Result type for scheme operations
pub type Result<T> = std::result::Result<T, SchemeError>;

/// Errors that can occur while reading, filtering or writing a scheme
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("Failed to read scheme at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write scheme at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML scheme at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON scheme at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Only `building` and `testing` are supported
    #[error("Unknown build action {action:?}, expected `building` or `testing`")]
    UnknownBuildAction { action: String },

    /// Computing target changes failed
    #[error(transparent)]
    Analysis(#[from] RefineError),
}
