//! Changesets computed from a git repository

pub mod error;
pub mod raw_diff;
pub mod repository;

#[cfg(test)]
pub mod tests;

pub use error::{GitError, Result};
pub use raw_diff::{RawChange, parse_raw_diff};
pub use repository::{Git, GitDiffSource};
