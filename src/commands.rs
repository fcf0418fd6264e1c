//! CLI command implementations

use anyhow::{Context, bail};
use refine_core::{Analyzer, ChangeLevel, Changeset, DiffSource, ProjectGraphSource};
use refine_git::GitDiffSource;
use refine_manifest::ManifestSource;
use refine_scheme::{BuildAction, Scheme, SchemeFilter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct RunOptions {
    pub repository: PathBuf,
    pub manifest: PathBuf,
    pub scheme: Option<PathBuf>,
    pub augmenting_paths_files: Vec<PathBuf>,
    pub base_revisions: Vec<String>,
    pub change_level: ChangeLevel,
    pub build_action: BuildAction,
    pub filter_when_scheme_changed: bool,
    pub print_changes: bool,
    pub include_unchanged: bool,
    pub print_scheme_changes: bool,
}

pub fn run(options: RunOptions) -> anyhow::Result<()> {
    validate(&options)?;

    let repository = std::fs::canonicalize(&options.repository).with_context(|| {
        format!("Repository not found at {}", options.repository.display())
    })?;
    let changesets = load_changesets(&repository, &options.base_revisions)?;

    let manifest = std::fs::canonicalize(&options.manifest)
        .with_context(|| format!("Manifest not found at {}", options.manifest.display()))?;
    let workspace = ManifestSource::new(manifest).load_workspace()?;

    let mut builder = Analyzer::builder().changesets(changesets).workspace(workspace);
    if !options.augmenting_paths_files.is_empty() {
        builder = builder.augmenting_paths_files(options.augmenting_paths_files.clone());
    }
    let analyzer = builder.build().context("Failed to set up change analysis")?;

    if options.print_changes {
        let report = analyzer
            .format_changes(options.include_unchanged, options.change_level)
            .context("Failed to compute target changes")?;
        if !report.is_empty() {
            println!("{report}");
        }
    }

    if let Some(scheme_path) = &options.scheme {
        filter_scheme(&analyzer, scheme_path, &options)?;
    }

    Ok(())
}

fn validate(options: &RunOptions) -> anyhow::Result<()> {
    if options.scheme.is_none() && !options.print_changes {
        bail!("Nothing to do: pass --scheme, --print-changes, or both");
    }
    if options.print_scheme_changes && options.scheme.is_none() {
        bail!("--print-scheme-changes requires --scheme");
    }
    if options.include_unchanged && !options.print_changes {
        bail!("--include-unchanged requires --print-changes");
    }
    Ok(())
}

fn load_changesets(repository: &Path, base_revisions: &[String]) -> anyhow::Result<Vec<Changeset>> {
    base_revisions
        .iter()
        .map(|base| {
            tracing::info!("Computing changes since {}", base);
            GitDiffSource::new(repository, base.as_str()).changeset()
        })
        .collect()
}

fn filter_scheme(analyzer: &Analyzer, path: &Path, options: &RunOptions) -> anyhow::Result<()> {
    let path = std::fs::canonicalize(path)
        .with_context(|| format!("Scheme not found at {}", path.display()))?;
    let scheme = Scheme::load(&path)?;

    let print_scheme_changes = options.print_scheme_changes;
    let filtered = SchemeFilter::new(analyzer, options.build_action)
        .change_level(options.change_level)
        .filter_when_scheme_changed(options.filter_when_scheme_changed)
        .observer(move |decision| {
            if print_scheme_changes {
                tracing::info!("{}", decision);
            }
        })
        .filter(&path, scheme)
        .with_context(|| format!("Failed to filter scheme {}", path.display()))?;

    filtered.save(&path)?;
    tracing::info!("Wrote filtered scheme to {}", path.display());
    Ok(())
}
