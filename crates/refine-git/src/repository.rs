//! Runs git in a repository and turns its diff into a changeset

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use refine_core::{Changeset, DiffSource, Modification};
use tracing::{debug, info};

use crate::error::{GitError, Result};
use crate::raw_diff::{RawChange, parse_raw_diff};

/// A git working tree.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Git { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git with `args` in the repository root and return its stdout.
    pub fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_string()).collect();
        let command = args.join(" ");
        debug!("Running git {} in {}", command, self.root.display());

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn merge_base(&self, revision: &str) -> Result<String> {
        Ok(self.run(["merge-base", revision, "HEAD"])?.trim().to_string())
    }

    /// `git diff --raw -z <revision>` against the working tree.
    pub fn raw_diff(&self, revision: &str) -> Result<String> {
        self.run(["diff", "--raw", "-z", revision])
    }

    /// Contents of `path` at `revision`.
    pub fn show(&self, revision: &str, path: &Path) -> Result<String> {
        self.run(["show".to_string(), format!("{}:{}", revision, path.display())])
    }
}

/// The changes between the merge base of a revision and `HEAD`, plus any
/// uncommitted changes in the working tree.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    git: Git,
    base_revision: String,
}

impl GitDiffSource {
    pub fn new(repository: impl Into<PathBuf>, base_revision: impl Into<String>) -> Self {
        GitDiffSource {
            git: Git::new(repository),
            base_revision: base_revision.into(),
        }
    }

    pub fn load_changeset(&self) -> Result<Changeset> {
        let merge_base = self.git.merge_base(&self.base_revision)?;
        let changes = parse_raw_diff(&self.git.raw_diff(&merge_base)?)?;
        info!(
            "Found {} changed paths since {} (merge base {})",
            changes.len(),
            self.base_revision,
            merge_base
        );

        let modifications = changes
            .into_iter()
            .map(|change| self.modification(change, &merge_base))
            .collect();
        Ok(Changeset::new(self.git.root(), modifications)
            .with_description(format!("since {}", self.base_revision)))
    }

    // Current contents come from the working tree, prior contents from the
    // merge base at the prior path (or the same path if it did not move).
    fn modification(&self, change: RawChange, merge_base: &str) -> Modification {
        let working_copy = self.git.root().join(&change.path);
        let prior_path = change.prior_path.clone().unwrap_or_else(|| change.path.clone());
        let git = self.git.clone();
        let revision = merge_base.to_string();

        let modification = Modification::new(change.path, change.kind)
            .with_contents_reader(move || read_working_copy(&working_copy))
            .with_prior_contents_reader(move || Ok(Some(git.show(&revision, &prior_path)?)));
        match change.prior_path {
            Some(prior_path) => modification.with_prior_path(prior_path),
            None => modification,
        }
    }
}

impl DiffSource for GitDiffSource {
    fn changeset(&self) -> anyhow::Result<Changeset> {
        self.load_changeset()
            .with_context(|| format!("Failed to compute changes since {}", self.base_revision))
    }
}

fn read_working_copy(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}
