//! Computes which targets are affected by a set of changesets

use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::annotated::{AnnotatedTargets, TargetIndex};
use crate::changeset::Changeset;
use crate::config::{AugmentingPaths, ResolvedAugmentingPaths};
use crate::error::{RefineError, Result};
use crate::graph::{DependencyGraph, TargetRef};
use crate::level::ChangeLevel;
use crate::model::{Project, Workspace};
use crate::references::{project_used_paths, target_used_paths};
use crate::used_path::UsedPath;

/// Collects analyzer inputs and validates them.
#[derive(Debug, Default)]
pub struct AnalyzerBuilder {
    changesets: Vec<Changeset>,
    workspace: Option<Workspace>,
    projects: Option<Vec<Project>>,
    augmenting_paths_files: Option<Vec<PathBuf>>,
    augmenting_paths: Option<AugmentingPaths>,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changeset(mut self, changeset: Changeset) -> Self {
        self.changesets.push(changeset);
        self
    }

    pub fn changesets(mut self, changesets: impl IntoIterator<Item = Changeset>) -> Self {
        self.changesets.extend(changesets);
        self
    }

    /// Analyze the projects of a workspace; the workspace path is itself an input.
    pub fn workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Analyze loose projects with no owning workspace.
    pub fn projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = Some(projects);
        self
    }

    /// YAML files of augmenting paths, relative to the repository.
    pub fn augmenting_paths_files(mut self, files: Vec<PathBuf>) -> Self {
        self.augmenting_paths_files = Some(files);
        self
    }

    pub fn augmenting_paths(mut self, augmenting_paths: AugmentingPaths) -> Self {
        self.augmenting_paths = Some(augmenting_paths);
        self
    }

    pub fn build(self) -> Result<Analyzer> {
        let Some(repository) = self
            .changesets
            .first()
            .map(|changeset| changeset.repository().to_path_buf())
        else {
            return Err(RefineError::NoChangesets);
        };

        let workspace = match (self.workspace, self.projects) {
            (Some(_), Some(_)) => {
                return Err(RefineError::configuration(
                    "Can only specify one of workspace and projects",
                ));
            }
            (None, None) => {
                return Err(RefineError::configuration(
                    "Must specify either a workspace or projects",
                ));
            }
            (Some(workspace), None) => workspace,
            (None, Some(projects)) => Workspace {
                path: None,
                projects,
            },
        };

        let augmenting_paths = match (self.augmenting_paths_files, self.augmenting_paths) {
            (Some(_), Some(_)) => {
                return Err(RefineError::configuration(
                    "Can only specify one of augmenting paths files and augmenting paths",
                ));
            }
            (Some(files), None) => {
                let files: Vec<PathBuf> = files
                    .iter()
                    .map(|file| crate::paths::expand(file, &repository))
                    .collect();
                AugmentingPaths::load_all(&files)?
            }
            (None, Some(augmenting_paths)) => augmenting_paths,
            (None, None) => AugmentingPaths::new(),
        };

        Ok(Analyzer {
            augmenting_paths: augmenting_paths.resolve(&repository),
            changesets: self.changesets,
            workspace,
            annotated: OnceCell::new(),
        })
    }
}

/// Answers "did this target change, and why?" for every target in a workspace.
#[derive(Debug)]
pub struct Analyzer {
    changesets: Vec<Changeset>,
    workspace: Workspace,
    augmenting_paths: ResolvedAugmentingPaths,
    annotated: OnceCell<AnnotatedTargets>,
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn changesets(&self) -> &[Changeset] {
        &self.changesets
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// The annotated target set, computed on first use.
    pub fn annotated_targets(&self) -> Result<&AnnotatedTargets> {
        if let Some(annotated) = self.annotated.get() {
            return Ok(annotated);
        }
        let annotated = self.annotate()?;
        Ok(self.annotated.get_or_init(|| annotated))
    }

    fn annotate(&self) -> Result<AnnotatedTargets> {
        let workspace_change = match &self.workspace.path {
            Some(path) => {
                UsedPath::path(path, "workspace directory").find_in_changesets(&self.changesets)?
            }
            None => None,
        };

        let mut project_changes: HashMap<&Path, Option<String>> = HashMap::new();
        for project in &self.workspace.projects {
            let change = self
                .first_change(&project_used_paths(project))?
                .or_else(|| workspace_change.clone());
            if let Some(reason) = &change {
                debug!("Project {} changed: {}", project.path.display(), reason);
            }
            project_changes.entry(project.path.as_path()).or_insert(change);
        }

        let graph = DependencyGraph::build(&self.workspace.projects);
        let annotated = AnnotatedTargets::from_graph(&graph, |target_ref| {
            match project_changes.get(target_ref.project.path.as_path()) {
                Some(Some(reason)) => Ok(Some(reason.clone())),
                _ => self.target_change(target_ref),
            }
        })?;

        info!(
            "Annotated {} targets across {} projects",
            annotated.len(),
            self.workspace.projects.len()
        );
        Ok(annotated)
    }

    // Augmenting paths are checked before the target's own inputs.
    fn target_change(&self, target_ref: TargetRef<'_>) -> Result<Option<String>> {
        for used_path in self.augmenting_paths.for_target(&target_ref.target.name) {
            if let Some(reason) = used_path.find_in_changesets(&self.changesets)? {
                return Ok(Some(reason));
            }
        }
        self.first_change(&target_used_paths(target_ref.project, target_ref.target))
    }

    fn first_change(&self, used_paths: &[UsedPath]) -> Result<Option<String>> {
        for used_path in used_paths {
            if let Some(reason) = used_path.find_in_changesets(&self.changesets)? {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    /// The change reason of the first target with `name`.
    pub fn change_reason(&self, name: &str, level: ChangeLevel) -> Result<Option<String>> {
        let annotated = self.annotated_targets()?;
        Ok(annotated
            .find(name)
            .and_then(|index| annotated.change_reason(index, level)))
    }

    /// Change reasons by target name, in dependency order. Only the first
    /// target with a given name is kept.
    pub fn changes_by_target(&self, level: ChangeLevel) -> Result<IndexMap<String, Option<String>>> {
        let annotated = self.annotated_targets()?;
        let mut changes = IndexMap::with_capacity(annotated.len());
        for (index, target) in annotated.iter() {
            changes
                .entry(target.name().to_string())
                .or_insert_with(|| annotated.change_reason(index, level));
        }
        Ok(changes)
    }

    /// A report grouped by project path, then by target name:
    ///
    /// ```text
    /// /repo/App.xcodeproj:
    /// 	App: main.swift (source file) was modified
    /// ```
    ///
    /// Unchanged targets appear as `did not change` when `include_unchanged`
    /// is set; projects with nothing to show are omitted.
    pub fn format_changes(&self, include_unchanged: bool, level: ChangeLevel) -> Result<String> {
        let annotated = self.annotated_targets()?;

        // Projects sort by their path string, so `A.xcodeproj` precedes `A/B.xcodeproj`.
        let mut by_project: BTreeMap<String, Vec<TargetIndex>> = BTreeMap::new();
        for (index, target) in annotated.iter() {
            by_project
                .entry(target.project_path().to_string_lossy().into_owned())
                .or_default()
                .push(index);
        }

        let mut sections = Vec::new();
        for (project, mut indices) in by_project {
            indices.sort_by_key(|&index| annotated.get(index).map(|target| target.name()));
            let lines: Vec<String> = indices
                .into_iter()
                .filter_map(|index| {
                    let name = annotated.get(index)?.name();
                    match annotated.change_reason(index, level) {
                        Some(reason) => Some(format!("\t{name}: {reason}")),
                        None if include_unchanged => Some(format!("\t{name}: did not change")),
                        None => None,
                    }
                })
                .collect();
            if !lines.is_empty() {
                sections.push(format!("{}:\n{}", project, lines.join("\n")));
            }
        }
        Ok(sections.join("\n"))
    }
}
