//! Error types for project-graph manifests

use std::path::PathBuf;

use thiserror::Error;

/// Result type for manifest loading
pub type Result<T> = std::result::Result<T, ManifestError>;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
