//! Refine Core — project model, changesets, dependency graph and change analysis

pub mod analyzer;
pub mod annotated;
pub mod changeset;
pub mod config;
pub mod error;
pub mod graph;
pub mod level;
pub mod model;
pub mod paths;
pub mod references;
pub mod source;
pub mod used_path;


#[cfg(test)]
pub mod test_utils;

pub use analyzer::{Analyzer, AnalyzerBuilder};
pub use annotated::{AnnotatedTarget, AnnotatedTargets, TargetIndex};
pub use changeset::{Changeset, Contents, Modification, ModificationKind};
pub use config::{AugmentingPath, AugmentingPaths, WILDCARD_TARGET};
pub use error::{RefineError, Result};
pub use graph::{DependencyGraph, DependencyKind, TargetRef};
pub use level::ChangeLevel;
pub use model::{
    BaseConfiguration, BuildConfiguration, BuildPhase, BuildPhaseKind, PATH_BUILD_SETTINGS,
    ProductReference, Project, SettingValue, Target, TargetDependency, Workspace,
};
pub use source::{DiffSource, ProjectGraphSource};
pub use used_path::UsedPath;
