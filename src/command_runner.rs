//! External command execution
//!
//! [`CommandRunner`] is the capability every component receives instead of
//! calling `std::process::Command` itself. Production code uses
//! [`SystemRunner`]; `--dry-run` swaps in [`DryRunRunner`]; tests use
//! [`RecordingRunner`], which never touches the network.
//!
//! # Execution rules
//!
//! - Commands are spawned directly (no shell), in a new process group
//! - stdin/stdout/stderr are inherited so clone progress stays visible
//! - When stdin is our terminal, the child's group becomes its foreground
//!   group for the duration of the run, so git and brew can prompt
//! - Every command is bounded by a timeout; on expiry the whole group is killed

use crate::command_args::CommandArgs;
use crate::process_guard::{
    terminate_group, CommandProcessGroup, RegisteredChild, TerminalForeground,
};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default bound on a single external command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors produced while running an external command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The program could not be started at all (not installed, permissions)
    #[error("Failed to spawn `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// The program ran and exited unsuccessfully
    #[error("`{command}` failed ({})", describe_exit(*code, stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The program did not finish within the configured bound
    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

fn describe_exit(code: Option<i32>, stderr: &str) -> String {
    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    if stderr.trim().is_empty() {
        format!("exit code {}", code)
    } else {
        format!("exit code {}: {}", code, stderr.trim())
    }
}

/// Output from a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Command line that was run.
    pub command: String,
    /// Exit code (None when the command was not actually executed).
    pub exit_code: Option<i32>,
    /// Whether this was a dry-run (command printed, not executed).
    pub dry_run: bool,
}

/// Capability for running external commands synchronously.
pub trait CommandRunner {
    fn run(&self, args: &dyn CommandArgs) -> Result<CommandOutput, CommandError>;

    /// True when commands are only printed; callers then skip their own
    /// filesystem side effects as well.
    fn is_dry_run(&self) -> bool {
        false
    }
}

// ============================================================================
// System runner
// ============================================================================

/// Runs commands on the host.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(100),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, args: &dyn CommandArgs) -> Result<CommandOutput, CommandError> {
        let command = args.display();
        let cli_args = args.to_cli_args();

        // Log exact command for transparency
        info!("run: {} args={:?}", args.program(), cli_args);

        // Handed back when this function returns, after the child is reaped
        let foreground = TerminalForeground::current();

        let mut process = Command::new(args.program());
        process
            .args(&cli_args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .in_new_process_group();
        if foreground.is_some() {
            process.with_terminal();
        }
        let mut child = process.spawn().map_err(|e| CommandError::Spawn {
            command: command.clone(),
            reason: e.to_string(),
        })?;

        let pid = child.id();
        let _registered = RegisteredChild::register(pid);
        if let Some(foreground) = &foreground {
            foreground.hand_to(pid);
        }
        let started = Instant::now();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= self.timeout => {
                    warn!("{} exceeded {:?}, terminating", command, self.timeout);
                    terminate_group(pid, Duration::from_secs(3));
                    let _ = child.wait();
                    return Err(CommandError::Timeout {
                        command,
                        timeout: self.timeout,
                    });
                }
                Ok(None) => std::thread::sleep(self.poll_interval),
                Err(e) => {
                    return Err(CommandError::Spawn {
                        command,
                        reason: format!("failed waiting for process: {}", e),
                    });
                }
            }
        };

        if status.success() {
            debug!("{} finished in {:?}", command, started.elapsed());
            Ok(CommandOutput {
                command,
                exit_code: status.code(),
                dry_run: false,
            })
        } else {
            Err(CommandError::Failed {
                command,
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

// ============================================================================
// Dry-run runner
// ============================================================================

/// Prints commands instead of running them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, args: &dyn CommandArgs) -> Result<CommandOutput, CommandError> {
        let command = args.display();
        info!("dry-run: {}", command);
        println!("[dry-run] {}", command);
        Ok(CommandOutput {
            command,
            exit_code: None,
            dry_run: true,
        })
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

// ============================================================================
// Recording runner (test double)
// ============================================================================

/// Records every command instead of executing it.
///
/// Commands whose display string contains one of the `fail_on` patterns
/// return [`CommandError::Failed`]. With `materialize` enabled, a successful
/// command that produces a directory (a clone) creates it with a `.git`
/// marker, so later "already installed" checks see it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<String>>,
    fail_on: Vec<String>,
    materialize: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command containing `pattern`.
    pub fn failing_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_on.push(pattern.into());
        self
    }

    /// Create clone targets on disk when a clone "succeeds".
    pub fn materializing(mut self) -> Self {
        self.materialize = true;
        self
    }

    /// Command lines recorded so far, in call order.
    pub fn invocations(&self) -> Vec<String> {
        self.invocations
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, args: &dyn CommandArgs) -> Result<CommandOutput, CommandError> {
        let command = args.display();
        if let Ok(mut calls) = self.invocations.lock() {
            calls.push(command.clone());
        }

        if self.fail_on.iter().any(|p| command.contains(p.as_str())) {
            return Err(CommandError::Failed {
                command,
                code: Some(128),
                stderr: "simulated failure".to_string(),
            });
        }

        if self.materialize {
            if let Some(dir) = args.output_dir() {
                materialize_clone(dir).map_err(|e| CommandError::Spawn {
                    command: command.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        Ok(CommandOutput {
            command,
            exit_code: Some(0),
            dry_run: false,
        })
    }
}

fn materialize_clone(dir: PathBuf) -> std::io::Result<()> {
    std::fs::create_dir_all(dir.join(".git"))
}
