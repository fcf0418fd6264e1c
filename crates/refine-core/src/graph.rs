//! Target dependency graph using petgraph::DiGraph
//!
//! Edges point from a target to what it depends on. Dependencies come from
//! explicit declarations and from link-libraries files that name another
//! target's product.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::error::{RefineError, Result};
use crate::model::{Project, Target};
use crate::paths;

/// A target together with the project that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TargetRef<'a> {
    pub project: &'a Project,
    pub target: &'a Target,
}

/// Why an edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Declared on the target.
    Declared,
    /// Inferred from a linked product.
    Linked,
}

/// The dependency graph over every target of every project.
pub struct DependencyGraph<'a> {
    inner: DiGraph<TargetRef<'a>, DependencyKind>,
    /// Outgoing edges per node, in the order they were discovered.
    dependencies: Vec<Vec<NodeIndex>>,
}

impl std::fmt::Debug for DependencyGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph. Declared dependencies resolve by id, then by name;
    /// linked files resolve by product basename. When two targets share a
    /// key the first one registered wins.
    pub fn build(projects: &'a [Project]) -> Self {
        let mut inner = DiGraph::new();
        let mut by_id: HashMap<&'a str, NodeIndex> = HashMap::new();
        let mut by_name: HashMap<&'a str, NodeIndex> = HashMap::new();
        let mut by_product: HashMap<String, NodeIndex> = HashMap::new();

        for project in projects {
            for target in &project.targets {
                let idx = inner.add_node(TargetRef { project, target });
                by_id.entry(target.id()).or_insert(idx);
                by_name.entry(target.name.as_str()).or_insert(idx);
                if let Some(product) = &target.product {
                    let names = paths::basename(&product.path)
                        .into_iter()
                        .chain(product.name.as_deref().and_then(paths::basename));
                    for name in names {
                        by_product.entry(name).or_insert(idx);
                    }
                }
            }
        }

        let mut graph = DependencyGraph {
            dependencies: vec![Vec::new(); inner.node_count()],
            inner,
        };

        let nodes: Vec<NodeIndex> = graph.inner.node_indices().collect();
        for idx in nodes {
            let target = graph.inner[idx].target;

            for dependency in &target.dependencies {
                let resolved = dependency
                    .target_id
                    .as_deref()
                    .and_then(|id| by_id.get(id))
                    .or_else(|| by_name.get(dependency.name.as_str()))
                    .copied();
                match resolved {
                    Some(dep) => graph.link(idx, dep, DependencyKind::Declared),
                    None => warn!(
                        "Target {} depends on {}, which is not in any project; ignoring",
                        target.name, dependency.name
                    ),
                }
            }

            for file in target.linked_files() {
                let Some(name) = paths::basename(file) else {
                    continue;
                };
                match by_product.get(&name) {
                    Some(&dep) if dep != idx => graph.link(idx, dep, DependencyKind::Linked),
                    _ => {}
                }
            }
        }

        debug!(
            "Dependency graph has {} targets and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    fn link(&mut self, from: NodeIndex, to: NodeIndex, kind: DependencyKind) {
        let existing = &mut self.dependencies[from.index()];
        if existing.contains(&to) {
            return;
        }
        existing.push(to);
        self.inner.add_edge(from, to, kind);
    }

    /// Total number of targets.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn target(&self, idx: NodeIndex) -> TargetRef<'a> {
        self.inner[idx]
    }

    /// Direct dependencies, declared ones first.
    pub fn dependencies(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.dependencies[idx.index()]
    }

    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.inner
            .node_indices()
            .find(|&idx| self.inner[idx].target.name == name)
    }

    pub fn edge_kind(&self, from: NodeIndex, to: NodeIndex) -> Option<DependencyKind> {
        self.inner
            .find_edge(from, to)
            .map(|edge| self.inner[edge])
    }

    /// Every target with its dependencies ahead of it. Ties keep discovery
    /// order: projects as given, targets as declared.
    pub fn sorted(&self) -> Result<Vec<NodeIndex>> {
        if let Err(cycle) = toposort(&self.inner, None) {
            return Err(RefineError::DependencyCycle {
                target: self.inner[cycle.node_id()].target.name.clone(),
            });
        }

        let mut visited = vec![false; self.inner.node_count()];
        let mut order = Vec::with_capacity(self.inner.node_count());
        for idx in self.inner.node_indices() {
            self.visit(idx, &mut visited, &mut order);
        }
        Ok(order)
    }

    fn visit(&self, idx: NodeIndex, visited: &mut [bool], order: &mut Vec<NodeIndex>) {
        if visited[idx.index()] {
            return;
        }
        visited[idx.index()] = true;
        for &dep in self.dependencies(idx) {
            self.visit(dep, visited, order);
        }
        order.push(idx);
    }
}
