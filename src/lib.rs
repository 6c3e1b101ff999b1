//! lazyzsh Library
//!
//! Core of the interactive Oh My Zsh setup tool: a registry of installable
//! plugins and themes, an installer that clones them, a backup store for
//! `~/.zshrc` snapshots, a synthesizer that renders the new configuration,
//! and the orchestrator state machine that ties them to user prompts.

pub mod backup;
pub mod catalog;
pub mod cli;
pub mod command_args;
pub mod command_runner;
pub mod error;
pub mod installer;
pub mod orchestrator;
pub mod paths;
pub mod process_guard;
pub mod prompt;
pub mod registry;
pub mod selection;
pub mod selection_file;
pub mod setup_state;
pub mod synth;
pub mod types;

// Re-export main types for convenience
pub use backup::{BackupStore, Snapshot, SnapshotOutcome};
pub use command_args::{BrewCaskArgs, CommandArgs, GitCloneArgs};
pub use command_runner::{
    CommandError, CommandOutput, CommandRunner, DryRunRunner, RecordingRunner, SystemRunner,
};
pub use error::{LazyZshError, Result};
pub use installer::{ComponentInstaller, InstallOutcome, InstallReport, NothingToFetchReason};
pub use orchestrator::{Orchestrator, RunOutcome, RunReport};
pub use paths::Layout;
pub use process_guard::{ChildRegistry, CommandProcessGroup, TerminalForeground};
pub use prompt::{Answer, Choice, InquirePrompter, PromptMode, PromptSpec, Prompter, ScriptedPrompter};
pub use registry::{RegistryEntry, RepositoryRegistry, Resolution};
pub use selection::Selection;
pub use setup_state::{SetupContext, SetupStep, SetupTransitionError};
pub use synth::render;
pub use types::{AliasMode, BackupAction, ComponentKind, FunctionMode, StartAction};
