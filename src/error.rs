//! Error handling module for lazyzsh
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Lower layers (command runner, setup state machine) have their own error
//! enums which convert into [`LazyZshError`] at the orchestrator boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::command_runner::CommandError;

/// Main error type for lazyzsh
#[derive(Error, Debug)]
pub enum LazyZshError {
    /// IO errors (backup store, component directories)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The prompt backend itself failed (no terminal, broken pipe, ...)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// An external command could not be run or exited non-zero
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Installing a single component failed
    #[error("Failed to install {identifier}: {cause}")]
    Install {
        identifier: String,
        #[source]
        cause: CommandError,
    },

    /// A snapshot path handed to restore does not exist
    #[error("Snapshot not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A path exists but does not follow the snapshot naming convention
    #[error("Not a snapshot of the live configuration: {}", .0.display())]
    InvalidSnapshot(PathBuf),

    /// Validation errors (identifiers, saved selections)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Writing the generated configuration failed (fatal for the run)
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Setup state machine transition errors
    #[error("Setup transition error: {0}")]
    Transition(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for lazyzsh operations
pub type Result<T> = std::result::Result<T, LazyZshError>;

impl LazyZshError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a prompt backend error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    /// Create an install error for one component
    pub fn install(identifier: impl Into<String>, cause: CommandError) -> Self {
        Self::Install {
            identifier: identifier.into(),
            cause,
        }
    }
}

/// Process exit code for a completed run.
pub const EXIT_COMPLETED: u8 = 0;
/// Process exit code when the user cancelled at a prompt.
pub const EXIT_CANCELLED: u8 = 1;
/// Process exit code for fatal errors.
pub const EXIT_FATAL: u8 = 2;
