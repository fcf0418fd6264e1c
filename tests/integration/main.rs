//! Integration tests for Refine
//!
//! These tests drive the manifest, analyzer and scheme crates together, and
//! run the `refine` binary against a scratch git repository.

use std::path::Path;
use std::process::Command;

use refine_core::{Analyzer, ChangeLevel, Changeset, Modification, ModificationKind};
use refine_manifest::ManifestSource;
use refine_scheme::{BuildAction, Scheme, SchemeFilter};
use tempfile::TempDir;

const MANIFEST: &str = "\
projects:
  - path: App.xcodeproj
    targets:
      - name: App
        dependencies: [{ name: Core }]
        build_phases:
          - { kind: sources, files: [App/main.swift] }
      - name: Core
        build_phases:
          - { kind: sources, files: [Core/core.swift] }
      - name: Tools
        build_phases:
          - { kind: sources, files: [Tools/tool.swift] }
      - name: AppTests
        dependencies: [{ name: App }]
        build_phases:
          - { kind: sources, files: [AppTests/app_tests.swift] }
      - name: ToolsTests
        dependencies: [{ name: Tools }]
        build_phases:
          - { kind: sources, files: [ToolsTests/tools_tests.swift] }
";

const SCHEME: &str = "\
build:
  - target: App
  - target: Tools
test:
  - target: AppTests
  - target: ToolsTests
";

const AUGMENTING_PATHS: &str = "\
Tools:
  - glob: config/**/*.{yml,yaml}
    inclusion_reason: tool configuration
";

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn write_fixture(root: &Path) {
    write(root, "graph.yaml", MANIFEST);
    write(root, "App.scheme.yaml", SCHEME);
    write(root, "augmenting.yaml", AUGMENTING_PATHS);
    for source in [
        "App/main.swift",
        "Core/core.swift",
        "Tools/tool.swift",
        "AppTests/app_tests.swift",
        "ToolsTests/tools_tests.swift",
    ] {
        write(root, source, "// source\n");
    }
}

/// Test that a manifest, an in-memory changeset and the scheme filter agree
#[test]
fn test_manifest_analysis_and_scheme_filter() {
    let dir = TempDir::new().unwrap();
    let root = std::fs::canonicalize(dir.path()).unwrap();
    write_fixture(&root);

    let workspace = ManifestSource::new(root.join("graph.yaml")).load().unwrap();
    let changeset = Changeset::new(
        &root,
        vec![Modification::new("Core/core.swift", ModificationKind::Modified)],
    );
    let analyzer = Analyzer::builder()
        .changeset(changeset)
        .workspace(workspace)
        .build()
        .unwrap();

    let report = analyzer.format_changes(false, ChangeLevel::FullTransitive).unwrap();
    assert_eq!(
        report,
        format!(
            "{}:\n\
             \tApp: dependency Core changed because Core/core.swift (source file) was modified\n\
             \tAppTests: dependency App changed because dependency Core changed because Core/core.swift (source file) was modified\n\
             \tCore: Core/core.swift (source file) was modified",
            root.join("App.xcodeproj").display()
        )
    );

    let scheme_path = root.join("App.scheme.yaml");
    let filtered = SchemeFilter::new(&analyzer, BuildAction::Testing)
        .filter(&scheme_path, Scheme::load(&scheme_path).unwrap())
        .unwrap();
    filtered.save(&scheme_path).unwrap();

    let saved = Scheme::load(&scheme_path).unwrap();
    let tests: Vec<&str> = saved.test.iter().map(|entry| entry.target.as_str()).collect();
    assert_eq!(tests, vec!["AppTests"]);
    assert!(saved.build[0].build_for_testing);
    assert!(!saved.build[1].build_for_testing);
}

/// Test that the change level stops propagation short of dependents
#[test]
fn test_change_level_from_manifest() {
    let dir = TempDir::new().unwrap();
    let root = std::fs::canonicalize(dir.path()).unwrap();
    write_fixture(&root);

    let analyzer = Analyzer::builder()
        .changeset(Changeset::new(
            &root,
            vec![Modification::new("Core/core.swift", ModificationKind::Modified)],
        ))
        .workspace(ManifestSource::new(root.join("graph.yaml")).load().unwrap())
        .build()
        .unwrap();

    let mut changed: Vec<String> = analyzer
        .changes_by_target(ChangeLevel::AtMostNAway(1))
        .unwrap()
        .into_iter()
        .filter_map(|(name, reason)| reason.map(|_| name))
        .collect();
    changed.sort();
    assert_eq!(changed, vec!["App", "Core"]);
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args([
            "-c",
            "user.name=Refine Tests",
            "-c",
            "user.email=refine@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Test the binary end to end against a scratch repository
#[test]
fn test_cli_filters_scheme_in_place() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    if !git(root, &["init", "--quiet"]) {
        eprintln!("git is not installed; skipping");
        return;
    }
    write_fixture(root);
    assert!(git(root, &["add", "."]));
    assert!(git(root, &["commit", "--quiet", "-m", "initial"]));

    write(root, "config/tools/settings.yaml", "verbose: true\n");
    assert!(git(root, &["add", "."]));

    let output = Command::new(env!("CARGO_BIN_EXE_refine"))
        .args(["--repository", ".", "--manifest", "graph.yaml"])
        .args(["--scheme", "App.scheme.yaml"])
        .args(["--augmenting-paths-yaml-files", "augmenting.yaml"])
        .args(["--base-revision", "HEAD"])
        .args(["--filter-scheme-for-build-action", "building"])
        .arg("--print-changes")
        .current_dir(root)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "refine failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(
        "\tTools: config/tools/settings.yaml (tool configuration) was added (since HEAD)"
    ));
    assert!(stdout.contains("\tToolsTests: dependency Tools changed because"));
    assert!(!stdout.contains("\tApp:"));

    let saved = Scheme::load(&root.join("App.scheme.yaml")).unwrap();
    let build: Vec<&str> = saved.build.iter().map(|entry| entry.target.as_str()).collect();
    let test: Vec<&str> = saved.test.iter().map(|entry| entry.target.as_str()).collect();
    assert_eq!(build, vec!["Tools"]);
    assert_eq!(test, vec!["ToolsTests"]);
}

/// Test that a run with nothing to do fails before touching git
#[test]
fn test_cli_requires_an_output() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_refine"))
        .args(["--manifest", "graph.yaml", "--base-revision", "main"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nothing to do"));
}
