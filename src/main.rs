//! lazyzsh - main entry point
//!
//! Wires logging, signal handling, CLI parsing and exit codes around the
//! library's orchestrator.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lazyzsh::backup::BackupStore;
use lazyzsh::cli::{Cli, Commands};
use lazyzsh::command_runner::{CommandRunner, DryRunRunner, SystemRunner};
use lazyzsh::error::{EXIT_COMPLETED, EXIT_FATAL};
use lazyzsh::orchestrator::{Orchestrator, RunOutcome, RunReport};
use lazyzsh::paths::Layout;
use lazyzsh::process_guard;
use lazyzsh::prompt::InquirePrompter;
use lazyzsh::registry::RepositoryRegistry;
use lazyzsh::{selection_file, synth};

/// Initialize tracing on stderr; `RUST_LOG` overrides the CLI verbosity
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level());
    info!("lazyzsh starting up");

    // Make sure clones are terminated if we receive SIGINT/SIGTERM
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }
    debug!("Signal handlers initialized");

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let layout = match &cli.home {
        Some(home) => Layout::from_home(home),
        None => Layout::detect().context("Cannot determine the home directory (use --home)")?,
    };
    debug!("Using home directory {}", layout.home().display());

    let registry = RepositoryRegistry::builtin();
    let system = SystemRunner::new(cli.command_timeout());
    let dry_run = DryRunRunner;
    let runner: &dyn CommandRunner = if cli.dry_run {
        warn!("Dry-run mode: commands will be printed, not executed");
        &dry_run
    } else {
        &system
    };
    let mut orchestrator = Orchestrator::new(&layout, &registry, runner);

    let outcome = match &cli.command {
        None => orchestrator.run(&mut InquirePrompter::new())?,
        Some(Commands::Setup { save_selection }) => {
            let outcome = orchestrator.run(&mut InquirePrompter::new())?;
            if let (Some(path), RunOutcome::Completed(RunReport::Installed { selection, .. })) =
                (save_selection, &outcome)
            {
                selection_file::save_selection(selection, path)?;
                println!("✓ Selection saved to {}", path.display());
            }
            outcome
        }
        Some(Commands::Apply { selection }) => {
            let selection = selection_file::load_selection(selection)?;
            info!("Applying saved selection: theme {}", selection.theme());
            orchestrator.apply(selection)?
        }
        Some(Commands::Render { selection }) => {
            let selection = selection_file::load_selection(selection)?;
            println!("{}", synth::render(&selection));
            return Ok(ExitCode::from(EXIT_COMPLETED));
        }
        Some(Commands::Backup) => orchestrator.backup()?,
        Some(Commands::Backups) => {
            list_backups(&layout)?;
            return Ok(ExitCode::from(EXIT_COMPLETED));
        }
        Some(Commands::Restore { snapshot, yes }) => {
            let snapshot = snapshot.as_deref().map(|p| resolve_snapshot_arg(&layout, p));
            orchestrator.restore(&mut InquirePrompter::new(), snapshot, *yes)?
        }
    };

    if let RunOutcome::Cancelled { at } = &outcome {
        println!("Cancelled by user at step: {}", at);
    }
    Ok(ExitCode::from(outcome.exit_status()))
}

fn list_backups(layout: &Layout) -> anyhow::Result<()> {
    let store = BackupStore::new(layout);
    let snapshots = store
        .list_snapshots()
        .with_context(|| format!("Failed to list backups in {:?}", store.dir()))?;
    if snapshots.is_empty() {
        println!("No backups found in {}", store.dir().display());
        return Ok(());
    }
    for snapshot in snapshots.iter().rev() {
        println!("{}", snapshot.path.display());
    }
    Ok(())
}

/// A bare snapshot file name refers to the backup directory
fn resolve_snapshot_arg(layout: &Layout, arg: &Path) -> PathBuf {
    if arg.components().count() == 1 && !arg.exists() {
        layout.backup_dir().join(arg)
    } else {
        arg.to_path_buf()
    }
}
