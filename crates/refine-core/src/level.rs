//! How far through the dependency graph a change propagates

use std::fmt;
use std::str::FromStr;

use crate::error::{RefineError, Result};

/// Propagation depth used when asking whether a target changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChangeLevel {
    /// Any transitive dependency counts.
    #[default]
    FullTransitive,
    /// Only the target's own inputs count.
    Itself,
    /// Dependencies at most this many edges away count.
    AtMostNAway(usize),
}

impl ChangeLevel {
    pub fn at_most_n_away(distance: i64) -> Result<Self> {
        usize::try_from(distance)
            .map(ChangeLevel::AtMostNAway)
            .map_err(|_| RefineError::NegativeChangeLevel { distance })
    }

    /// The level one edge further down, or `None` when nothing beyond the
    /// target itself may be considered.
    pub fn one_step_further(self) -> Option<Self> {
        match self {
            ChangeLevel::FullTransitive => Some(ChangeLevel::FullTransitive),
            ChangeLevel::Itself | ChangeLevel::AtMostNAway(0) => None,
            ChangeLevel::AtMostNAway(distance) => Some(ChangeLevel::AtMostNAway(distance - 1)),
        }
    }
}

impl FromStr for ChangeLevel {
    type Err = RefineError;

    fn from_str(level: &str) -> Result<Self> {
        match level {
            "full-transitive" | "full_transitive" => Ok(ChangeLevel::FullTransitive),
            "itself" => Ok(ChangeLevel::Itself),
            other => match other.parse::<i64>() {
                Ok(distance) => ChangeLevel::at_most_n_away(distance),
                Err(_) => Err(RefineError::UnknownChangeLevel {
                    level: other.to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for ChangeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeLevel::FullTransitive => f.write_str("full-transitive"),
            ChangeLevel::Itself => f.write_str("itself"),
            ChangeLevel::AtMostNAway(distance) => write!(f, "{distance}"),
        }
    }
}
