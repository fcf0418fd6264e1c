//! Enumerates the repository paths a project or target reads

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::model::{BuildPhaseKind, PATH_BUILD_SETTINGS, Project, Target};
use crate::paths;
use crate::used_path::UsedPath;

/// `$(NAME)` or `${NAME}`.
static BUILD_SETTING_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([_a-zA-Z0-9]+?)\}|\(([_a-zA-Z0-9]+?)\))")
        .expect("build setting reference pattern is valid")
});

const MAX_EXPANSION_DEPTH: usize = 32;

/// Paths that, when changed, change every target in the project.
pub fn project_used_paths(project: &Project) -> Vec<UsedPath> {
    let mut used = vec![UsedPath::path(&project.path, "project directory")];
    for base in &project.base_configurations {
        used.push(UsedPath::path(
            paths::expand(&base.path, project.project_dir()),
            format!("base configuration reference for {}", base.name),
        ));
    }
    used
}

/// Paths a target reads, in the order they are checked: base configuration
/// files, build phase files, script phase I/O, then path-valued settings.
pub fn target_used_paths(project: &Project, target: &Target) -> Vec<UsedPath> {
    let project_dir = project.project_dir();
    let mut used = Vec::new();

    for configuration in &target.build_configurations {
        if let Some(base) = &configuration.base_configuration {
            used.push(UsedPath::path(
                paths::expand(base, project_dir),
                format!("base configuration reference for {}", configuration),
            ));
        }
    }

    for phase in &target.build_phases {
        let reason = build_phase_file_reason(phase.display_name());
        for file in &phase.files {
            used.push(UsedPath::path(paths::expand(file, project_dir), reason.as_str()));
        }
    }

    for phase in target
        .build_phases
        .iter()
        .filter(|phase| phase.kind == BuildPhaseKind::ShellScript)
    {
        for (label, declared) in phase.script_paths() {
            let reason = format!("{} build phase {}", phase.display_name(), label);
            for path in declared {
                for expanded in expand_build_settings(target, path) {
                    used.push(UsedPath::path(paths::expand(expanded, project_dir), reason.as_str()));
                }
            }
        }
    }

    for setting in PATH_BUILD_SETTINGS {
        let reason = format!("{setting} value");
        for value in target.resolved_build_setting(setting) {
            for expanded in expand_build_settings(target, &value) {
                let expanded = expanded
                    .strip_suffix("/**")
                    .map(str::to_string)
                    .unwrap_or(expanded);
                if expanded.is_empty() {
                    continue;
                }
                used.push(UsedPath::path(paths::expand(expanded, project_dir), reason.as_str()));
            }
        }
    }

    used
}

/// `Sources` becomes `source file`, `Copy Files` becomes `copy file`.
fn build_phase_file_reason(phase_name: &str) -> String {
    let lowercase = phase_name.to_lowercase();
    let singular = lowercase.strip_suffix('s').unwrap_or(&lowercase);
    format!("{singular} file")
}

/// Substitute `$(NAME)` / `${NAME}` references with every value the target
/// resolves the setting to. A reference with no values drops the path.
pub fn expand_build_settings(target: &Target, value: &str) -> Vec<String> {
    expand_with_depth(target, value, 0)
}

fn expand_with_depth(target: &Target, value: &str, depth: usize) -> Vec<String> {
    let Some(captures) = BUILD_SETTING_REFERENCE.captures(value) else {
        return vec![value.to_string()];
    };
    if depth >= MAX_EXPANSION_DEPTH {
        warn!("Build setting expansion of {} in {} is too deep; ignoring", value, target.name);
        return Vec::new();
    }

    let reference = &captures[0];
    let Some(key) = captures.get(1).or_else(|| captures.get(2)) else {
        return vec![value.to_string()];
    };

    target
        .resolved_build_setting(key.as_str())
        .iter()
        .flat_map(|substitution| {
            expand_with_depth(target, &value.replace(reference, substitution), depth + 1)
        })
        .collect()
}
