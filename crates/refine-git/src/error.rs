//! Error types for git access

use thiserror::Error;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Errors that can occur while running git or reading its output
#[derive(Debug, Error)]
pub enum GitError {
    /// git ran and exited unsuccessfully
    #[error("Running git {command} failed ({status}):\n\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// git could not be started at all
    #[error("Failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A `--raw -z` record without the expected status and path chunks
    #[error("Malformed raw diff record: {record:?}")]
    MalformedRecord { record: String },

    /// A status letter outside `ACDMRTUX`
    #[error("Unknown change status {letter:?} in raw diff")]
    UnknownStatus { letter: char },
}
