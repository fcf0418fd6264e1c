//! Changesets: the modifications between two revisions of a repository

pub mod glob;
pub mod modification;
pub mod yaml_diff;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::debug;

pub use modification::{ContentReader, Contents, Modification, ModificationKind};

use crate::paths;

/// An immutable set of modifications relative to a repository root, indexed
/// by absolute path.
#[derive(Debug)]
pub struct Changeset {
    repository: PathBuf,
    modifications: Vec<Modification>,
    by_absolute_path: IndexMap<PathBuf, usize>,
    description: Option<String>,
}

impl Changeset {
    /// Build a changeset, closing `modifications` over their ancestor
    /// directories.
    pub fn new(repository: impl Into<PathBuf>, modifications: Vec<Modification>) -> Self {
        let repository = paths::normalize(&repository.into());
        let modifications = add_directories(modifications);

        let mut by_absolute_path = IndexMap::with_capacity(modifications.len());
        for (index, modification) in modifications.iter().enumerate() {
            by_absolute_path
                .entry(paths::expand(modification.path(), &repository))
                .or_insert(index);
        }
        for (index, modification) in modifications.iter().enumerate() {
            if let Some(prior_path) = modification.prior_path() {
                by_absolute_path
                    .entry(paths::expand(prior_path, &repository))
                    .or_insert(index);
            }
        }

        debug!(
            "Changeset for {} with {} modifications",
            repository.display(),
            modifications.len()
        );

        Changeset {
            repository,
            modifications,
            by_absolute_path,
            description: None,
        }
    }

    /// Attach a human-readable description, appended to every explanation.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn repository(&self) -> &Path {
        &self.repository
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// All modifications, originals first, then synthesized directories.
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    /// The modification recorded at an absolute path, current or prior.
    pub fn find_modification(&self, absolute_path: &Path) -> Option<&Modification> {
        self.by_absolute_path
            .get(&paths::normalize(absolute_path))
            .map(|&index| &self.modifications[index])
    }

    /// The first modification whose absolute path matches `absolute_glob`.
    pub fn find_modification_for_glob(&self, absolute_glob: &str) -> Option<&Modification> {
        let matcher = glob::compile(absolute_glob);
        self.by_absolute_path
            .iter()
            .find(|(path, _)| matcher.is_match(path))
            .map(|(_, &index)| &self.modifications[index])
    }

    /// The modification at `absolute_path` together with a diff of the value
    /// at `keypath`, if that value changed.
    pub fn find_modification_for_keypath(
        &self,
        absolute_path: &Path,
        keypath: &[Value],
    ) -> Option<(&Modification, String)> {
        let modification = self.find_modification(absolute_path)?;
        let diff = modification.yaml_diff(keypath)?;
        Some((modification, diff))
    }
}

/// Append a directory modification for every ancestor of each changed path
/// (current and prior), including the repository root, then drop duplicates.
pub fn add_directories(modifications: Vec<Modification>) -> Vec<Modification> {
    let mut directories: Vec<PathBuf> = Vec::new();
    let mut known: HashSet<PathBuf> = HashSet::new();

    for modification in &modifications {
        let changed = std::iter::once(modification.path()).chain(modification.prior_path());
        for path in changed {
            let mut ancestor = path.parent();
            while let Some(directory) = ancestor {
                if !known.insert(directory.to_path_buf()) {
                    break;
                }
                directories.push(directory.to_path_buf());
                ancestor = directory.parent();
            }
        }
    }

    let mut seen = HashSet::new();
    modifications
        .into_iter()
        .chain(directories.into_iter().map(Modification::directory))
        .filter(|modification| seen.insert(modification.identity()))
        .collect()
}
