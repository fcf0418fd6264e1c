//! Augmenting paths: extra inputs per target, declared in YAML
//!
//! ```yaml
//! "*":
//!   - { path: Gemfile.lock, inclusion_reason: ruby dependencies }
//! App:
//!   - { glob: "resources/**/*.json", inclusion_reason: bundled data }
//!   - { path: metadata.yaml, yaml_keypath: [app], inclusion_reason: app metadata }
//! ```
//!
//! The `*` entry applies to every target and is consulted first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{RefineError, Result};
use crate::paths;
use crate::used_path::UsedPath;

/// Target name whose entries apply to every target.
pub const WILDCARD_TARGET: &str = "*";

/// One augmenting-path declaration, with repository-relative locations.
#[derive(Debug, Clone, PartialEq)]
pub enum AugmentingPath {
    Path {
        path: String,
        inclusion_reason: String,
    },
    Keypath {
        path: String,
        yaml_keypath: Vec<Value>,
        inclusion_reason: String,
    },
    Glob {
        glob: String,
        inclusion_reason: String,
    },
}

impl AugmentingPath {
    /// Validate one raw entry. Exactly `{path, inclusion_reason}`,
    /// `{path, yaml_keypath, inclusion_reason}` or `{glob, inclusion_reason}`
    /// are accepted.
    pub fn from_mapping(target: &str, entry: &Mapping) -> Result<Self> {
        let mut keys: Vec<String> = entry
            .keys()
            .map(|key| match key.as_str() {
                Some(key) => key.to_string(),
                None => format!("{key:?}"),
            })
            .collect();
        keys.sort();

        let shape_error = || RefineError::AugmentingEntry {
            target: target.to_string(),
            keys: keys.clone(),
        };
        let string = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(shape_error)
        };

        let shape: Vec<&str> = keys.iter().map(String::as_str).collect();
        match shape.as_slice() {
            ["inclusion_reason", "path"] => Ok(AugmentingPath::Path {
                path: string("path")?,
                inclusion_reason: string("inclusion_reason")?,
            }),
            ["inclusion_reason", "path", "yaml_keypath"] => Ok(AugmentingPath::Keypath {
                path: string("path")?,
                yaml_keypath: entry
                    .get("yaml_keypath")
                    .and_then(Value::as_sequence)
                    .cloned()
                    .ok_or_else(shape_error)?,
                inclusion_reason: string("inclusion_reason")?,
            }),
            ["glob", "inclusion_reason"] => Ok(AugmentingPath::Glob {
                glob: string("glob")?,
                inclusion_reason: string("inclusion_reason")?,
            }),
            _ => Err(shape_error()),
        }
    }

    /// Anchor this declaration at `repository`.
    pub fn resolve(&self, repository: &Path) -> UsedPath {
        match self {
            AugmentingPath::Path {
                path,
                inclusion_reason,
            } => UsedPath::path(paths::expand(path, repository), inclusion_reason.as_str()),
            AugmentingPath::Keypath {
                path,
                yaml_keypath,
                inclusion_reason,
            } => UsedPath::keypath(
                paths::expand(path, repository),
                yaml_keypath.clone(),
                inclusion_reason.as_str(),
            ),
            AugmentingPath::Glob {
                glob,
                inclusion_reason,
            } => UsedPath::glob(
                paths::expand(glob, repository).to_string_lossy(),
                inclusion_reason.as_str(),
            ),
        }
    }
}

/// Augmenting paths keyed by target name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AugmentingPaths {
    by_target: IndexMap<String, Vec<AugmentingPath>>,
}

impl AugmentingPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: impl Into<String>, entries: Vec<AugmentingPath>) {
        self.by_target
            .entry(target.into())
            .or_default()
            .extend(entries);
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    pub fn entries(&self, target: &str) -> &[AugmentingPath] {
        self.by_target.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parse a YAML document mapping target names to lists of entries.
    /// `origin` is only used in error messages.
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self> {
        let document: IndexMap<String, Vec<Mapping>> =
            serde_yaml::from_str(text).map_err(|source| RefineError::Yaml {
                path: origin.to_path_buf(),
                source,
            })?;

        let mut augmenting = Self::new();
        for (target, entries) in document {
            let entries = entries
                .iter()
                .map(|entry| AugmentingPath::from_mapping(&target, entry))
                .collect::<Result<Vec<_>>>()?;
            augmenting.insert(target, entries);
        }
        Ok(augmenting)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RefineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let augmenting = Self::from_yaml_str(&text, path)?;
        debug!(
            "Loaded augmenting paths for {} targets from {}",
            augmenting.by_target.len(),
            path.display()
        );
        Ok(augmenting)
    }

    /// Load and merge several files; later files append to earlier ones.
    pub fn load_all(files: &[PathBuf]) -> Result<Self> {
        let mut merged = Self::new();
        for file in files {
            merged.merge(Self::load(file)?);
        }
        Ok(merged)
    }

    pub fn merge(&mut self, other: AugmentingPaths) {
        for (target, entries) in other.by_target {
            self.insert(target, entries);
        }
    }

    /// Anchor every declaration at `repository`.
    pub fn resolve(&self, repository: &Path) -> ResolvedAugmentingPaths {
        let mut resolved = ResolvedAugmentingPaths::default();
        for (target, entries) in &self.by_target {
            let used: Vec<UsedPath> = entries
                .iter()
                .map(|entry| entry.resolve(repository))
                .collect();
            if target == WILDCARD_TARGET {
                resolved.wildcard.extend(used);
            } else {
                resolved
                    .by_target
                    .entry(target.clone())
                    .or_default()
                    .extend(used);
            }
        }
        resolved
    }
}

/// Augmenting paths as absolute used paths.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAugmentingPaths {
    wildcard: Vec<UsedPath>,
    by_target: HashMap<String, Vec<UsedPath>>,
}

impl ResolvedAugmentingPaths {
    /// Wildcard entries first, then the target's own.
    pub fn for_target<'a>(&'a self, target: &str) -> impl Iterator<Item = &'a UsedPath> + 'a {
        self.wildcard
            .iter()
            .chain(self.by_target.get(target).into_iter().flatten())
    }
}
