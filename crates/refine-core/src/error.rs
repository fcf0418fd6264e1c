//! Error types for change-impact analysis

use std::path::PathBuf;
use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, RefineError>;

/// Errors that can occur while building or querying the analysis
#[derive(Debug, Error)]
pub enum RefineError {
    /// Conflicting or missing analyzer inputs
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A changeset query was made against an empty list
    #[error("Must provide at least one changeset")]
    NoChangesets,

    /// The declared-or-inferred dependency graph is not acyclic
    #[error("Dependency cycle detected involving target `{target}`")]
    DependencyCycle { target: String },

    /// A change level token that is not `full-transitive`, `itself` or an integer
    #[error("Unknown change level {level:?}, expected `full-transitive`, `itself`, or an integer")]
    UnknownChangeLevel { level: String },

    /// A bounded change level below zero
    #[error("Change level distance must be non-negative, not {distance}")]
    NegativeChangeLevel { distance: i64 },

    /// An augmenting-path entry with an unsupported shape
    #[error("Unhandled set of keys in augmenting paths entry for target `{target}`: {keys:?}")]
    AugmentingEntry { target: String, keys: Vec<String> },

    /// An augmenting-path file could not be parsed
    #[error("Failed to load YAML file at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An input file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RefineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        RefineError::Configuration {
            message: message.into(),
        }
    }
}
