//! A single recorded change to a path, with lazily read contents

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use super::yaml_diff;

/// Reads one revision of a file. `Ok(None)` means the file does not exist at
/// that revision.
pub type ContentReader = Box<dyn Fn() -> anyhow::Result<Option<String>>>;

/// What happened to a path between the two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModificationKind {
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
    Unmerged,
    Unknown,
    /// Synthesized for every ancestor directory of a changed path.
    DirectoryContentsChanged,
}

impl ModificationKind {
    /// Map a `git diff --raw` status letter onto a kind.
    pub fn from_status_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(ModificationKind::Added),
            'C' => Some(ModificationKind::Copied),
            'D' => Some(ModificationKind::Deleted),
            'M' => Some(ModificationKind::Modified),
            'R' => Some(ModificationKind::Renamed),
            'T' => Some(ModificationKind::TypeChanged),
            'U' => Some(ModificationKind::Unmerged),
            'X' => Some(ModificationKind::Unknown),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModificationKind::Added => "was added",
            ModificationKind::Copied => "was copied",
            ModificationKind::Deleted => "was deleted",
            ModificationKind::Modified => "was modified",
            ModificationKind::Renamed => "was renamed",
            ModificationKind::TypeChanged => "changed type",
            ModificationKind::Unmerged => "is unmerged",
            ModificationKind::Unknown => "changed in an unknown way",
            ModificationKind::DirectoryContentsChanged => "had contents change",
        }
    }
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One revision's contents, or the sentinel for a missing/unreadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Present(String),
    DoesNotExist,
}

impl Contents {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Contents::Present(text) => Some(text),
            Contents::DoesNotExist => None,
        }
    }
}

impl fmt::Display for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Present(text) => f.write_str(text),
            Contents::DoesNotExist => f.write_str("DOES NOT EXIST"),
        }
    }
}

#[derive(Default)]
struct LazyContents {
    reader: Option<ContentReader>,
    contents: OnceCell<Contents>,
    document: OnceCell<Option<Value>>,
}

impl LazyContents {
    fn get(&self, path: &Path, revision: &str) -> &Contents {
        self.contents.get_or_init(|| {
            let Some(read) = &self.reader else {
                return Contents::DoesNotExist;
            };
            match read() {
                Ok(Some(text)) => Contents::Present(text),
                Ok(None) => Contents::DoesNotExist,
                Err(e) => {
                    debug!("Cannot read {} contents of {}: {:#}", revision, path.display(), e);
                    Contents::DoesNotExist
                }
            }
        })
    }

    fn document(&self, path: &Path, revision: &str) -> Option<&Value> {
        self.document
            .get_or_init(|| {
                let text = self.get(path, revision).as_str()?;
                match serde_yaml::from_str(text) {
                    Ok(document) => Some(document),
                    Err(e) => {
                        debug!("Cannot parse {} revision of {} as YAML: {}", revision, path.display(), e);
                        None
                    }
                }
            })
            .as_ref()
    }
}

/// A modification to a single file or directory, relative to the repository.
pub struct Modification {
    path: PathBuf,
    kind: ModificationKind,
    prior_path: Option<PathBuf>,
    contents: LazyContents,
    prior_contents: LazyContents,
}

impl Modification {
    pub fn new(path: impl Into<PathBuf>, kind: ModificationKind) -> Self {
        Modification {
            path: path.into(),
            kind,
            prior_path: None,
            contents: LazyContents::default(),
            prior_contents: LazyContents::default(),
        }
    }

    /// A synthetic "contents changed" record for a directory.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ModificationKind::DirectoryContentsChanged)
    }

    pub fn with_prior_path(mut self, prior_path: impl Into<PathBuf>) -> Self {
        self.prior_path = Some(prior_path.into());
        self
    }

    pub fn with_contents_reader<F>(mut self, reader: F) -> Self
    where
        F: Fn() -> anyhow::Result<Option<String>> + 'static,
    {
        self.contents.reader = Some(Box::new(reader));
        self
    }

    pub fn with_prior_contents_reader<F>(mut self, reader: F) -> Self
    where
        F: Fn() -> anyhow::Result<Option<String>> + 'static,
    {
        self.prior_contents.reader = Some(Box::new(reader));
        self
    }

    pub fn with_contents(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_contents_reader(move || Ok(Some(text.clone())))
    }

    pub fn with_prior_contents(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_prior_contents_reader(move || Ok(Some(text.clone())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ModificationKind {
        self.kind
    }

    pub fn prior_path(&self) -> Option<&Path> {
        self.prior_path.as_deref()
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ModificationKind::DirectoryContentsChanged
    }

    /// Path as shown to users: directories end in `/`, the root is `./`.
    pub fn display_path(&self) -> String {
        if !self.is_directory() {
            return self.path.display().to_string();
        }
        if self.path.as_os_str().is_empty() {
            "./".to_string()
        } else {
            format!("{}/", self.path.display())
        }
    }

    /// Current contents, read at most once.
    pub fn contents(&self) -> &Contents {
        self.contents.get(&self.path, "current")
    }

    /// Prior contents, read at most once.
    pub fn prior_contents(&self) -> &Contents {
        self.prior_contents.get(&self.path, "prior")
    }

    /// A YAML rendering of how the value at `keypath` differs between the two
    /// revisions, or `None` when it is the same (or absent from both).
    pub fn yaml_diff(&self, keypath: &[Value]) -> Option<String> {
        let prior = self
            .prior_contents
            .document(&self.path, "prior")
            .and_then(|document| yaml_diff::dig(document, keypath));
        let current = self
            .contents
            .document(&self.path, "current")
            .and_then(|document| yaml_diff::dig(document, keypath));

        let diff = yaml_diff::diff(prior, current)?;
        Some(yaml_diff::render(&self.display_path(), keypath, &diff))
    }

    pub(crate) fn identity(&self) -> (PathBuf, ModificationKind, Option<PathBuf>) {
        (self.path.clone(), self.kind, self.prior_path.clone())
    }
}

impl PartialEq for Modification {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.kind == other.kind && self.prior_path == other.prior_path
    }
}

impl Eq for Modification {}

impl Hash for Modification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.kind.hash(state);
        self.prior_path.hash(state);
    }
}

impl fmt::Debug for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modification")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("prior_path", &self.prior_path)
            .finish()
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_directory() {
            return write!(f, "contents of dir `{}` changed", self.display_path());
        }
        write!(f, "file `{}` {}", self.path.display(), self.kind)?;
        if let Some(prior_path) = &self.prior_path {
            write!(f, " (from {})", prior_path.display())?;
        }
        Ok(())
    }
}
