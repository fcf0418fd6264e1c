//! Scheme document model and file I/O
//!
//! A scheme lists the targets to build and the test targets to run:
//!
//! ```yaml
//! build:
//!   - { target: App, build_for_testing: true }
//!   - { target: AppTests }
//! test:
//!   - { target: AppTests, parallelizable: true }
//! ```
//!
//! Keys this crate does not know about are kept and written back unchanged.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use tracing::debug;

use crate::error::{Result, SchemeError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build: Vec<BuildEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<TestEntry>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A target the build action builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildEntry {
    pub target: String,
    #[serde(default = "build_for_testing_default")]
    pub build_for_testing: bool,
    #[serde(flatten)]
    pub extra: Mapping,
}

fn build_for_testing_default() -> bool {
    true
}

impl BuildEntry {
    pub fn new(target: impl Into<String>) -> Self {
        BuildEntry {
            target: target.into(),
            build_for_testing: true,
            extra: Mapping::new(),
        }
    }
}

/// A test target the test action runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub target: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl TestEntry {
    pub fn new(target: impl Into<String>) -> Self {
        TestEntry {
            target: target.into(),
            extra: Mapping::new(),
        }
    }
}

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeFormat {
    Yaml,
    Json,
}

impl SchemeFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemeFormat::Json,
            _ => SchemeFormat::Yaml,
        }
    }
}

impl Scheme {
    /// Every target the scheme mentions, once each, build entries first.
    pub fn referenced_targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        let names = self
            .build
            .iter()
            .map(|entry| entry.target.as_str())
            .chain(self.test.iter().map(|entry| entry.target.as_str()));
        for name in names {
            if !targets.contains(&name) {
                targets.push(name);
            }
        }
        targets
    }

    pub fn parse(text: &str, format: SchemeFormat, path: &Path) -> Result<Self> {
        match format {
            SchemeFormat::Yaml => serde_yaml::from_str(text).map_err(|source| SchemeError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
            SchemeFormat::Json => serde_json::from_str(text).map_err(|source| SchemeError::Json {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let scheme = Self::parse(&text, SchemeFormat::for_path(path), path)?;
        debug!(
            "Loaded scheme {} with {} build and {} test entries",
            path.display(),
            scheme.build.len(),
            scheme.test.len()
        );
        Ok(scheme)
    }

    pub fn render(&self, format: SchemeFormat, path: &Path) -> Result<String> {
        match format {
            SchemeFormat::Yaml => serde_yaml::to_string(self).map_err(|source| SchemeError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
            SchemeFormat::Json => serde_json::to_string_pretty(self)
                .map(|text| text + "\n")
                .map_err(|source| SchemeError::Json {
                    path: path.to_path_buf(),
                    source,
                }),
        }
    }

    /// Write the scheme in the format implied by `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.render(SchemeFormat::for_path(path), path)?;
        std::fs::write(path, text).map_err(|source| SchemeError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The xcodebuild-style action a scheme is being filtered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildAction {
    /// Drop unchanged targets from both build and test lists.
    Building,
    /// Drop unchanged test entries; keep unchanged build entries but stop
    /// building them for testing.
    #[default]
    Testing,
}

impl FromStr for BuildAction {
    type Err = SchemeError;

    fn from_str(action: &str) -> Result<Self> {
        match action {
            "building" => Ok(BuildAction::Building),
            "testing" => Ok(BuildAction::Testing),
            other => Err(SchemeError::UnknownBuildAction {
                action: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildAction::Building => f.write_str("building"),
            BuildAction::Testing => f.write_str("testing"),
        }
    }
}
