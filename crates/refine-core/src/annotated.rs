//! Targets annotated with why (and whether) they changed

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::graph::{DependencyGraph, TargetRef};
use crate::level::ChangeLevel;
use crate::model::Target;

/// Position of a target in an [`AnnotatedTargets`] set.
pub type TargetIndex = usize;

/// A target, its direct change reason, and its place in the graph.
#[derive(Debug)]
pub struct AnnotatedTarget {
    target: Target,
    project: PathBuf,
    direct_change_reason: Option<String>,
    dependencies: Vec<TargetIndex>,
    depended_upon_by: Vec<TargetIndex>,
    change_reasons: RefCell<HashMap<ChangeLevel, Option<String>>>,
}

impl AnnotatedTarget {
    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Path of the owning project.
    pub fn project_path(&self) -> &Path {
        &self.project
    }

    /// Why this target's own inputs changed, if they did.
    pub fn direct_change_reason(&self) -> Option<&str> {
        self.direct_change_reason.as_deref()
    }

    pub fn dependencies(&self) -> &[TargetIndex] {
        &self.dependencies
    }

    /// Targets that depend directly on this one.
    pub fn depended_upon_by(&self) -> &[TargetIndex] {
        &self.depended_upon_by
    }
}

/// Every annotated target, dependencies before dependents.
#[derive(Debug, Default)]
pub struct AnnotatedTargets {
    targets: Vec<AnnotatedTarget>,
}

impl AnnotatedTargets {
    /// Annotate each graph node with the reason returned by `direct_reason`.
    pub fn from_graph<F>(graph: &DependencyGraph<'_>, mut direct_reason: F) -> Result<Self>
    where
        F: FnMut(TargetRef<'_>) -> Result<Option<String>>,
    {
        let order = graph.sorted()?;
        let mut position = vec![0; graph.node_count()];
        for (index, node) in order.iter().enumerate() {
            position[node.index()] = index;
        }

        let mut targets = Vec::with_capacity(order.len());
        for &node in &order {
            let target_ref = graph.target(node);
            targets.push(AnnotatedTarget {
                target: target_ref.target.clone(),
                project: target_ref.project.path.clone(),
                direct_change_reason: direct_reason(target_ref)?,
                dependencies: graph
                    .dependencies(node)
                    .iter()
                    .map(|dep| position[dep.index()])
                    .collect(),
                depended_upon_by: Vec::new(),
                change_reasons: RefCell::new(HashMap::new()),
            });
        }

        for index in 0..targets.len() {
            for dep in targets[index].dependencies.clone() {
                targets[dep].depended_upon_by.push(index);
            }
        }

        Ok(AnnotatedTargets { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: TargetIndex) -> Option<&AnnotatedTarget> {
        self.targets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetIndex, &AnnotatedTarget)> {
        self.targets.iter().enumerate()
    }

    /// First target with the given name.
    pub fn find(&self, name: &str) -> Option<TargetIndex> {
        self.targets.iter().position(|target| target.name() == name)
    }

    /// Why the target changed at `level`, memoized per target and level.
    ///
    /// A direct change always wins. Otherwise the first dependency (in
    /// declaration order) that changed one level further down is reported as
    /// `dependency <name> changed because <reason>`.
    pub fn change_reason(&self, index: TargetIndex, level: ChangeLevel) -> Option<String> {
        let target = &self.targets[index];
        if let Some(cached) = target.change_reasons.borrow().get(&level) {
            return cached.clone();
        }

        let reason = match &target.direct_change_reason {
            Some(direct) => Some(direct.clone()),
            None => level
                .one_step_further()
                .and_then(|next| self.first_changed_dependency(target, next)),
        };

        target
            .change_reasons
            .borrow_mut()
            .insert(level, reason.clone());
        reason
    }

    fn first_changed_dependency(&self, target: &AnnotatedTarget, level: ChangeLevel) -> Option<String> {
        target.dependencies.iter().find_map(|&dep| {
            self.change_reason(dep, level).map(|reason| {
                format!(
                    "dependency {} changed because {}",
                    self.targets[dep].name(),
                    reason
                )
            })
        })
    }
}
