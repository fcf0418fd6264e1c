//! Paths, globs and YAML keypaths that a target's build reads

use std::fmt;
use std::path::PathBuf;

use serde_yaml::Value;

use crate::changeset::Changeset;
use crate::error::{RefineError, Result};

/// A reference to part of the repository, with the reason it is relevant.
#[derive(Debug, Clone, PartialEq)]
pub enum UsedPath {
    /// An absolute file or directory path.
    Path {
        path: PathBuf,
        inclusion_reason: String,
    },
    /// An absolute glob pattern.
    Glob {
        glob: String,
        inclusion_reason: String,
    },
    /// A value inside a YAML file, addressed by keys and sequence indices.
    Keypath {
        path: PathBuf,
        keypath: Vec<Value>,
        inclusion_reason: String,
    },
}

impl UsedPath {
    pub fn path(path: impl Into<PathBuf>, inclusion_reason: impl Into<String>) -> Self {
        UsedPath::Path {
            path: path.into(),
            inclusion_reason: inclusion_reason.into(),
        }
    }

    pub fn glob(glob: impl Into<String>, inclusion_reason: impl Into<String>) -> Self {
        UsedPath::Glob {
            glob: glob.into(),
            inclusion_reason: inclusion_reason.into(),
        }
    }

    pub fn keypath(
        path: impl Into<PathBuf>,
        keypath: Vec<Value>,
        inclusion_reason: impl Into<String>,
    ) -> Self {
        UsedPath::Keypath {
            path: path.into(),
            keypath,
            inclusion_reason: inclusion_reason.into(),
        }
    }

    pub fn inclusion_reason(&self) -> &str {
        match self {
            UsedPath::Path { inclusion_reason, .. }
            | UsedPath::Glob { inclusion_reason, .. }
            | UsedPath::Keypath { inclusion_reason, .. } => inclusion_reason,
        }
    }

    /// Explain how this reference was touched by `changeset`, if it was.
    pub fn find_in_changeset(&self, changeset: &Changeset) -> Option<String> {
        let explanation = match self {
            UsedPath::Path {
                path,
                inclusion_reason,
            } => {
                let modification = changeset.find_modification(path)?;
                format!(
                    "{} ({}) {}",
                    modification.display_path(),
                    inclusion_reason,
                    modification.kind()
                )
            }
            UsedPath::Glob {
                glob,
                inclusion_reason,
            } => {
                let modification = changeset.find_modification_for_glob(glob)?;
                format!(
                    "{} ({}) {}",
                    modification.display_path(),
                    inclusion_reason,
                    modification.kind()
                )
            }
            UsedPath::Keypath {
                path,
                keypath,
                inclusion_reason,
            } => {
                let (modification, _diff) = changeset.find_modification_for_keypath(path, keypath)?;
                let location = if keypath.is_empty() {
                    String::new()
                } else {
                    let keys: Vec<String> = keypath.iter().map(quoted_key).collect();
                    format!(" @ {}", keys.join("."))
                };
                format!(
                    "{}{} ({}) {}",
                    modification.display_path(),
                    location,
                    inclusion_reason,
                    modification.kind()
                )
            }
        };

        Some(match changeset.description() {
            Some(description) => format!("{explanation} ({description})"),
            None => explanation,
        })
    }

    /// Intersect over several changesets: every one must touch this
    /// reference, and the explanation comes from the last.
    pub fn find_in_changesets(&self, changesets: &[Changeset]) -> Result<Option<String>> {
        let (last, rest) = changesets.split_last().ok_or(RefineError::NoChangesets)?;
        if rest
            .iter()
            .any(|changeset| self.find_in_changeset(changeset).is_none())
        {
            return Ok(None);
        }
        Ok(self.find_in_changeset(last))
    }
}

impl fmt::Display for UsedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsedPath::Path {
                path,
                inclusion_reason,
            } => write!(f, "\"{}\" ({})", path.display(), inclusion_reason),
            UsedPath::Glob {
                glob,
                inclusion_reason,
            } => write!(f, "\"{}\" ({})", glob, inclusion_reason),
            UsedPath::Keypath {
                path,
                keypath,
                inclusion_reason,
            } => {
                let keys: Vec<String> = keypath.iter().map(plain_key).collect();
                write!(
                    f,
                    "\"{}\" @ {} ({})",
                    path.display(),
                    keys.join("."),
                    inclusion_reason
                )
            }
        }
    }
}

fn plain_key(key: &Value) -> String {
    match key {
        Value::String(key) => key.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// Keys made only of word characters print bare; anything else is quoted.
fn quoted_key(key: &Value) -> String {
    let plain = plain_key(key);
    let is_word = !plain.is_empty()
        && plain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_word { plain } else { format!("{plain:?}") }
}
