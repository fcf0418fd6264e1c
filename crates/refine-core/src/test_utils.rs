//! Test utilities for refine-core

use crate::changeset::{Changeset, Modification, ModificationKind};
use crate::model::{BuildPhase, BuildPhaseKind, Project, Target, TargetDependency};

pub const REPO: &str = "/repo";

/// A modified file at a repository-relative path.
pub fn modified(path: &str) -> Modification {
    Modification::new(path, ModificationKind::Modified)
}

pub fn changeset(paths: &[&str]) -> Changeset {
    Changeset::new(REPO, paths.iter().map(|path| modified(path)).collect())
}

/// A target with one Sources phase.
pub fn target_with_sources(name: &str, sources: &[&str]) -> Target {
    let mut target = Target::new(name);
    target
        .build_phases
        .push(BuildPhase::new(BuildPhaseKind::Sources).with_files(sources.iter().copied()));
    target
}

pub fn depending_on(mut target: Target, dependencies: &[&str]) -> Target {
    target
        .dependencies
        .extend(dependencies.iter().map(|name| TargetDependency::named(*name)));
    target
}

/// A project at `/repo/<name>.xcodeproj` holding `targets`.
pub fn project(name: &str, targets: Vec<Target>) -> Project {
    let mut project = Project::new(format!("{REPO}/{name}.xcodeproj"));
    project.targets = targets;
    project
}

/// `a -> b -> c`, each with a single source file named after it.
pub fn chain_project() -> Project {
    project(
        "Chain",
        vec![
            depending_on(target_with_sources("a", &["a.swift"]), &["b"]),
            depending_on(target_with_sources("b", &["b.swift"]), &["c"]),
            target_with_sources("c", &["c.swift"]),
        ],
    )
}
