//! Core data structures for the project graph

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Build settings that name paths a target reads from.
pub const PATH_BUILD_SETTINGS: &[&str] = &[
    "INFOPLIST_FILE",
    "HEADER_SEARCH_PATHS",
    "FRAMEWORK_SEARCH_PATHS",
    "USER_HEADER_SEARCH_PATHS",
];

/// The root of the project graph: a set of projects, optionally owned by a
/// workspace on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Absolute path to the workspace, if the projects were found through one.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// A project containing buildable targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Absolute path to the project bundle (e.g. `/repo/App.xcodeproj`).
    pub path: PathBuf,
    /// Project-level base configuration files.
    #[serde(default)]
    pub base_configurations: Vec<BaseConfiguration>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Project {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Project {
            path: path.into(),
            base_configurations: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Directory that relative paths inside the project resolve against.
    pub fn project_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }
}

/// A named base configuration file (`.xcconfig` style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseConfiguration {
    /// Build configuration name, e.g. `Debug`.
    pub name: String,
    pub path: PathBuf,
}

/// A buildable/testable unit in the project graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Stable identifier; defaults to the target name.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<TargetDependency>,
    #[serde(default)]
    pub build_configurations: Vec<BuildConfiguration>,
    #[serde(default)]
    pub build_phases: Vec<BuildPhase>,
    #[serde(default)]
    pub product: Option<ProductReference>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Target {
            id: None,
            name: name.into(),
            dependencies: Vec::new(),
            build_configurations: Vec::new(),
            build_phases: Vec::new(),
            product: None,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// File references of every link-libraries phase, in declaration order.
    pub fn linked_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.build_phases
            .iter()
            .filter(|phase| phase.kind == BuildPhaseKind::Frameworks)
            .flat_map(|phase| phase.files.iter())
    }

    /// Every value a build setting resolves to across configurations,
    /// deduplicated, in configuration order.
    pub fn resolved_build_setting(&self, key: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for configuration in &self.build_configurations {
            let Some(setting) = configuration.settings.get(key) else {
                continue;
            };
            for value in setting.values() {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
        values
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reference from a target to one it depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDependency {
    #[serde(default)]
    pub target_id: Option<String>,
    pub name: String,
}

impl TargetDependency {
    pub fn named(name: impl Into<String>) -> Self {
        TargetDependency {
            target_id: None,
            name: name.into(),
        }
    }
}

/// Per-configuration settings of a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub name: String,
    #[serde(default)]
    pub base_configuration: Option<PathBuf>,
    #[serde(default)]
    pub settings: IndexMap<String, SettingValue>,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        BuildConfiguration {
            name: name.into(),
            base_configuration: None,
            settings: IndexMap::new(),
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A build setting is either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Single(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            SettingValue::Single(value) => std::slice::from_ref(value),
            SettingValue::List(values) => values.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Single(value.to_string())
    }
}

impl From<Vec<&str>> for SettingValue {
    fn from(values: Vec<&str>) -> Self {
        SettingValue::List(values.into_iter().map(String::from).collect())
    }
}

/// What kind of build phase this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhaseKind {
    Sources,
    Headers,
    Resources,
    /// Link-libraries phase; its files drive inferred dependencies.
    Frameworks,
    CopyFiles,
    ShellScript,
}

impl BuildPhaseKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            BuildPhaseKind::Sources => "Sources",
            BuildPhaseKind::Headers => "Headers",
            BuildPhaseKind::Resources => "Resources",
            BuildPhaseKind::Frameworks => "Frameworks",
            BuildPhaseKind::CopyFiles => "Copy Files",
            BuildPhaseKind::ShellScript => "Run Script",
        }
    }
}

/// A build phase with its file references and, for script phases, declared I/O.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPhase {
    pub kind: BuildPhaseKind,
    #[serde(default)]
    pub name: Option<String>,
    /// File references, relative to the project directory or absolute.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub input_file_list_paths: Vec<String>,
    #[serde(default)]
    pub output_file_list_paths: Vec<String>,
    #[serde(default)]
    pub input_paths: Vec<String>,
    #[serde(default)]
    pub output_paths: Vec<String>,
}

impl BuildPhase {
    pub fn new(kind: BuildPhaseKind) -> Self {
        BuildPhase {
            kind,
            name: None,
            files: Vec::new(),
            input_file_list_paths: Vec::new(),
            output_file_list_paths: Vec::new(),
            input_paths: Vec::new(),
            output_paths: Vec::new(),
        }
    }

    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Name used in explanations, e.g. `Sources` or a script phase's own name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.display_name())
    }

    /// Script I/O declarations labelled by the kind of path they hold.
    pub fn script_paths(&self) -> [(&'static str, &[String]); 4] {
        [
            ("input file list path", self.input_file_list_paths.as_slice()),
            ("output file list path", self.output_file_list_paths.as_slice()),
            ("input path", self.input_paths.as_slice()),
            ("output path", self.output_paths.as_slice()),
        ]
    }
}

/// The artifact a target produces, used for link-time inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReference {
    pub path: PathBuf,
    /// Logical product name when it differs from the path's basename.
    #[serde(default)]
    pub name: Option<String>,
}
