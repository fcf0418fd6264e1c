//! Refine CLI entry point

use clap::Parser;
use refine_core::ChangeLevel;
use refine_scheme::BuildAction;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "refine")]
#[command(
    about = "Work out which build targets changed since a base revision",
    long_about = None
)]
struct Cli {
    /// Repository root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    repository: PathBuf,

    /// Project-graph manifest (YAML or JSON)
    #[arg(short, long)]
    manifest: PathBuf,

    /// Scheme to filter in place (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    scheme: Option<PathBuf>,

    /// Files mapping target names to extra paths they depend on
    #[arg(long, value_delimiter = ',')]
    augmenting_paths_yaml_files: Vec<PathBuf>,

    /// Revision to compare against; repeat to require a change since each
    #[arg(short, long = "base-revision", required = true)]
    base_revisions: Vec<String>,

    /// How far along dependencies a change may travel:
    /// full-transitive, itself, or a number of edges
    #[arg(long, default_value = "full-transitive")]
    change_level: ChangeLevel,

    /// What the filtered scheme will be used for: building or testing
    #[arg(long, default_value = "testing")]
    filter_scheme_for_build_action: BuildAction,

    /// Filter the scheme even if the scheme file itself changed
    #[arg(long)]
    filter_when_scheme_changed: bool,

    /// Print every target's change reason to stdout
    #[arg(long)]
    print_changes: bool,

    /// Also list targets that did not change
    #[arg(long)]
    include_unchanged: bool,

    /// Log which scheme entries were kept or removed
    #[arg(long)]
    print_scheme_changes: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "refine={0},refine_core={0},refine_git={0},refine_scheme={0},refine_manifest={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Refine v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Repository root: {}", cli.repository.display());

    commands::run(commands::RunOptions {
        repository: cli.repository,
        manifest: cli.manifest,
        scheme: cli.scheme,
        augmenting_paths_files: cli.augmenting_paths_yaml_files,
        base_revisions: cli.base_revisions,
        change_level: cli.change_level,
        build_action: cli.filter_scheme_for_build_action,
        filter_when_scheme_changed: cli.filter_when_scheme_changed,
        print_changes: cli.print_changes,
        include_unchanged: cli.include_unchanged,
        print_scheme_changes: cli.print_scheme_changes,
    })
}
