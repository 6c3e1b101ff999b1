use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// lazyzsh - set up Oh My Zsh themes, plugins, aliases and functions
#[derive(Parser, Debug)]
#[command(name = "lazyzsh")]
#[command(about = "Interactive Oh My Zsh setup with backup and restore of ~/.zshrc")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: print the clone and brew commands instead of running them.
    ///
    /// Backups and the generated ~/.zshrc are still written, so the result
    /// can be inspected.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Home directory to operate on (defaults to the current user's home)
    #[arg(long, global = true, env = "LAZYZSH_HOME")]
    pub home: Option<PathBuf>,

    /// Upper bound in seconds for every external command
    #[arg(long, global = true, env = "LAZYZSH_COMMAND_TIMEOUT", default_value_t = 600)]
    pub timeout: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive setup wizard (the default)
    Setup {
        /// Also save the chosen selection to this JSON file
        #[arg(long)]
        save_selection: Option<PathBuf>,
    },
    /// Install and write a previously saved selection without prompting
    Apply {
        /// Selection JSON file
        selection: PathBuf,
    },
    /// Print the configuration a saved selection would produce
    Render {
        /// Selection JSON file
        selection: PathBuf,
    },
    /// Snapshot the current ~/.zshrc
    Backup,
    /// List snapshots, newest first
    Backups,
    /// Restore ~/.zshrc from a snapshot
    Restore {
        /// Snapshot to restore (asks when omitted)
        snapshot: Option<PathBuf>,

        /// Do not ask for confirmation before overwriting ~/.zshrc
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
