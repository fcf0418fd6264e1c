//! Unit tests for refine-manifest

use std::path::Path;

use refine_core::{BuildPhaseKind, ProjectGraphSource, SettingValue};
use tempfile::TempDir;

use crate::*;

const MANIFEST: &str = "\
path: App.xcworkspace
projects:
  - path: App/App.xcodeproj
    targets:
      - name: App
        dependencies:
          - name: Core
        build_configurations:
          - name: Debug
            settings:
              INFOPLIST_FILE: App/Info.plist
              HEADER_SEARCH_PATHS: [include, vendor/**]
        build_phases:
          - kind: sources
            files: [Sources/main.swift]
  - path: /elsewhere/Core.xcodeproj
    targets:
      - name: Core
        product:
          path: libCore.a
";

#[test]
fn test_relative_paths_resolve_against_manifest_dir() {
    let workspace = parse_manifest(MANIFEST, Path::new("/repo/config")).unwrap();

    assert_eq!(
        workspace.path.as_deref(),
        Some(Path::new("/repo/config/App.xcworkspace"))
    );
    assert_eq!(
        workspace.projects[0].path,
        Path::new("/repo/config/App/App.xcodeproj")
    );
    assert_eq!(workspace.projects[1].path, Path::new("/elsewhere/Core.xcodeproj"));
}

#[test]
fn test_targets_keep_their_shape() {
    let workspace = parse_manifest(MANIFEST, Path::new("/repo")).unwrap();
    let app = &workspace.projects[0].targets[0];

    assert_eq!(app.id(), "App");
    assert_eq!(app.dependencies[0].name, "Core");
    assert_eq!(app.build_phases[0].kind, BuildPhaseKind::Sources);
    assert_eq!(
        app.build_configurations[0].settings.get("HEADER_SEARCH_PATHS"),
        Some(&SettingValue::from(vec!["include", "vendor/**"]))
    );
    assert_eq!(
        workspace.projects[1].targets[0]
            .product
            .as_ref()
            .map(|product| product.path.as_path()),
        Some(Path::new("libCore.a"))
    );
}

#[test]
fn test_workspace_path_is_optional() {
    let workspace = parse_manifest("projects: []\n", Path::new("/repo")).unwrap();
    assert_eq!(workspace.path, None);
    assert!(workspace.projects.is_empty());
}

#[test]
fn test_json_manifest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    std::fs::write(
        &path,
        r#"{"projects": [{"path": "Lib.xcodeproj", "targets": [{"name": "Lib"}]}]}"#,
    )
    .unwrap();

    let workspace = ManifestSource::new(&path).load_workspace().unwrap();
    assert_eq!(workspace.projects[0].path, dir.path().join("Lib.xcodeproj"));
    assert_eq!(workspace.projects[0].targets[0].name, "Lib");
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let error = ManifestSource::new(dir.path().join("missing.yaml"))
        .load()
        .unwrap_err();
    assert!(matches!(error, ManifestError::Read { .. }));
}

#[test]
fn test_malformed_manifest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.yaml");
    std::fs::write(&path, "projects:\n  - targets: []\n").unwrap();

    let error = ManifestSource::new(&path).load().unwrap_err();
    assert!(matches!(error, ManifestError::Parse { .. }));
    assert!(error.to_string().contains("graph.yaml"));
}
