//! Project graphs described in YAML or JSON manifests

pub mod error;
pub mod manifest;

#[cfg(test)]
pub mod tests;

pub use error::{ManifestError, Result};
pub use manifest::{ManifestSource, parse_manifest};
