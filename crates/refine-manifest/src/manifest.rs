//! Reads the project graph from a YAML or JSON manifest
//!
//! ```yaml
//! path: App.xcworkspace          # optional
//! projects:
//!   - path: App/App.xcodeproj
//!     targets:
//!       - name: App
//!         dependencies: [{ name: Core }]
//!         build_phases:
//!           - { kind: sources, files: [Sources/main.swift] }
//! ```
//!
//! Relative workspace and project paths resolve against the manifest's
//! directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use refine_core::{ProjectGraphSource, Workspace, paths};
use tracing::{debug, info};

use crate::error::{ManifestError, Result};

/// A manifest file on disk.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ManifestSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Workspace> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ManifestError::Read {
            path: self.path.clone(),
            source,
        })?;
        let base = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let workspace = parse_manifest(&text, &base).map_err(|source| ManifestError::Parse {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "Loaded {} projects with {} targets from {}",
            workspace.projects.len(),
            workspace
                .projects
                .iter()
                .map(|project| project.targets.len())
                .sum::<usize>(),
            self.path.display()
        );
        Ok(workspace)
    }
}

impl ProjectGraphSource for ManifestSource {
    fn load_workspace(&self) -> anyhow::Result<Workspace> {
        self.load()
            .with_context(|| format!("Failed to load project graph from {}", self.path.display()))
    }
}

/// Parse manifest text, anchoring relative paths at `base`.
pub fn parse_manifest(text: &str, base: &Path) -> std::result::Result<Workspace, serde_yaml::Error> {
    let mut workspace: Workspace = serde_yaml::from_str(text)?;
    if let Some(path) = workspace.path.take() {
        workspace.path = Some(paths::expand(path, base));
    }
    for project in &mut workspace.projects {
        project.path = paths::expand(&project.path, base);
        debug!(
            "Project {} has {} targets",
            project.path.display(),
            project.targets.len()
        );
    }
    Ok(workspace)
}
