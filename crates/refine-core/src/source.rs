//! Seams to the outside world: where the project graph and diffs come from

use crate::changeset::Changeset;
use crate::model::Workspace;

/// Produces the project graph to analyze.
pub trait ProjectGraphSource {
    fn load_workspace(&self) -> anyhow::Result<Workspace>;
}

/// Produces the modifications between two revisions.
pub trait DiffSource {
    fn changeset(&self) -> anyhow::Result<Changeset>;
}

impl ProjectGraphSource for Workspace {
    fn load_workspace(&self) -> anyhow::Result<Workspace> {
        Ok(self.clone())
    }
}
