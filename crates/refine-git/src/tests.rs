//! Unit tests for refine-git

use std::path::{Path, PathBuf};
use std::process::Command;

use refine_core::{Contents, ModificationKind};
use tempfile::TempDir;

use crate::*;

#[test]
fn test_parse_modified_and_added() {
    let diff = ":100644 100644 abc1234 def5678 M\0src/main.swift\0:000000 100644 0000000 1234567 A\0README.md\0";
    let changes = parse_raw_diff(diff).unwrap();

    assert_eq!(
        changes,
        vec![
            RawChange {
                kind: ModificationKind::Modified,
                similarity: 0,
                path: PathBuf::from("src/main.swift"),
                prior_path: None,
            },
            RawChange {
                kind: ModificationKind::Added,
                similarity: 0,
                path: PathBuf::from("README.md"),
                prior_path: None,
            },
        ]
    );
}

#[test]
fn test_parse_rename_with_similarity() {
    let diff = ":100644 100644 abc1234 abc1234 R086\0old name.swift\0new name.swift\0";
    let changes = parse_raw_diff(diff).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ModificationKind::Renamed);
    assert_eq!(changes[0].similarity, 86);
    assert_eq!(changes[0].path, Path::new("new name.swift"));
    assert_eq!(changes[0].prior_path.as_deref(), Some(Path::new("old name.swift")));
}

#[test]
fn test_parse_every_status_letter() {
    let letters = ['A', 'C', 'D', 'M', 'R', 'T', 'U', 'X'];
    let diff: String = letters
        .iter()
        .map(|letter| format!(":100644 100644 a b {letter}\0file\0"))
        .collect();
    let kinds: Vec<ModificationKind> = parse_raw_diff(&diff)
        .unwrap()
        .into_iter()
        .map(|change| change.kind)
        .collect();

    assert_eq!(
        kinds,
        vec![
            ModificationKind::Added,
            ModificationKind::Copied,
            ModificationKind::Deleted,
            ModificationKind::Modified,
            ModificationKind::Renamed,
            ModificationKind::TypeChanged,
            ModificationKind::Unmerged,
            ModificationKind::Unknown,
        ]
    );
}

#[test]
fn test_parse_empty_diff() {
    assert!(parse_raw_diff("").unwrap().is_empty());
}

#[test]
fn test_parse_rejects_bad_input() {
    assert!(matches!(
        parse_raw_diff("no-header\0"),
        Err(GitError::MalformedRecord { .. })
    ));
    assert!(matches!(
        parse_raw_diff(":100644 100644 a b Q\0file\0"),
        Err(GitError::UnknownStatus { letter: 'Q' })
    ));
    assert!(matches!(
        parse_raw_diff(":100644 100644 a b M\0"),
        Err(GitError::MalformedRecord { .. })
    ));
}

fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
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
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn test_changeset_from_repository() {
    if !git_available() {
        eprintln!("git is not installed; skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let root = dir.path();
    git(root, &["init", "--quiet"]);
    std::fs::write(root.join("metadata.yaml"), "foo: 1\n").unwrap();
    std::fs::write(root.join("goodbye.txt"), "bye\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "--quiet", "-m", "initial"]);

    std::fs::write(root.join("metadata.yaml"), "foo: 2\n").unwrap();
    std::fs::remove_file(root.join("goodbye.txt")).unwrap();
    std::fs::write(root.join("hello.txt"), "hi\n").unwrap();
    git(root, &["add", "hello.txt"]);

    let changeset = GitDiffSource::new(root, "HEAD").load_changeset().unwrap();
    assert_eq!(changeset.description(), Some("since HEAD"));

    let metadata = changeset.find_modification(&root.join("metadata.yaml")).unwrap();
    assert_eq!(metadata.kind(), ModificationKind::Modified);
    assert_eq!(metadata.prior_contents(), &Contents::Present("foo: 1\n".into()));
    assert_eq!(metadata.contents(), &Contents::Present("foo: 2\n".into()));

    let deleted = changeset.find_modification(&root.join("goodbye.txt")).unwrap();
    assert_eq!(deleted.kind(), ModificationKind::Deleted);
    assert_eq!(deleted.contents(), &Contents::DoesNotExist);

    let added = changeset.find_modification(&root.join("hello.txt")).unwrap();
    assert_eq!(added.kind(), ModificationKind::Added);
    assert_eq!(added.prior_contents(), &Contents::DoesNotExist);
}

#[test]
fn test_git_failure_carries_command_and_stderr() {
    if !git_available() {
        eprintln!("git is not installed; skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let error = GitDiffSource::new(dir.path(), "main").load_changeset().unwrap_err();
    match error {
        GitError::CommandFailed { command, stderr, .. } => {
            assert_eq!(command, "merge-base main HEAD");
            assert!(!stderr.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}
