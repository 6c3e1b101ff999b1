//! Setup State Machine
//!
//! The wizard is driven by an explicit step value and a transition table, so
//! every branch can be enumerated and tested without an interactive prompt.
//!
//! # Step Flow
//!
//! ```text
//!                       Start
//!        ┌────────────────┼─────────────────┐
//!        ↓                ↓                 ↓
//!   FreshInstall    DefaultInstall     BackupRestore
//!        └───────┬────────┘            ┌────┴────┐
//!                ↓                     ↓         ↓
//!           SelectTheme             Backup    Restore
//!                ↓                     └────┬────┘
//!           SelectPlugins                   ↓
//!                ↓                         Done
//!         SelectAliasMode
//!                ↓
//!        SelectFunctionMode
//!                ↓
//!        InstallComponents
//!                ↓
//!         SynthesizeWrite
//!                ↓
//!               Done
//!
//! (Any non-terminal step can transition to Cancelled)
//! ```

use std::fmt;
use thiserror::Error;

/// Steps of one setup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupStep {
    /// Asking which of the three top-level actions to take
    Start,
    /// User picked the custom installation
    FreshInstall,
    /// User picked the preset installation
    DefaultInstall,
    /// User picked backup/restore
    BackupRestore,
    SelectTheme,
    SelectPlugins,
    SelectAliasMode,
    SelectFunctionMode,
    /// Fetching the selected theme, plugins and fonts
    InstallComponents,
    /// Snapshot the live file, render, write
    SynthesizeWrite,
    /// Snapshot the live file on request
    Backup,
    /// Pick a snapshot and copy it over the live file
    Restore,
    /// Run finished (terminal state)
    Done,
    /// User declined a prompt (terminal state)
    Cancelled,
}

impl SetupStep {
    /// Returns true if this is a terminal state (Done or Cancelled)
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Steps allowed to follow this one, excluding Cancelled
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Start => &[Self::FreshInstall, Self::DefaultInstall, Self::BackupRestore],
            Self::FreshInstall | Self::DefaultInstall => &[Self::SelectTheme],
            Self::BackupRestore => &[Self::Backup, Self::Restore],
            Self::SelectTheme => &[Self::SelectPlugins],
            Self::SelectPlugins => &[Self::SelectAliasMode],
            Self::SelectAliasMode => &[Self::SelectFunctionMode],
            Self::SelectFunctionMode => &[Self::InstallComponents],
            Self::InstallComponents => &[Self::SynthesizeWrite],
            Self::SynthesizeWrite | Self::Backup | Self::Restore => &[Self::Done],
            Self::Done | Self::Cancelled => &[],
        }
    }

    /// Returns true if `target` is a legal next step
    pub fn can_transition_to(self, target: Self) -> bool {
        if target == Self::Cancelled {
            return !self.is_terminal();
        }
        self.successors().contains(&target)
    }

    /// Returns a human-readable description of this step
    pub const fn description(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::FreshInstall => "Fresh installation",
            Self::DefaultInstall => "Default installation",
            Self::BackupRestore => "Backup/restore",
            Self::SelectTheme => "Theme selection",
            Self::SelectPlugins => "Plugin selection",
            Self::SelectAliasMode => "Alias selection",
            Self::SelectFunctionMode => "Function selection",
            Self::InstallComponents => "Installing components",
            Self::SynthesizeWrite => "Writing configuration",
            Self::Backup => "Backup",
            Self::Restore => "Restore",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Every step, in roughly the order a run visits them
    pub const fn all_steps() -> &'static [Self] {
        &[
            Self::Start,
            Self::FreshInstall,
            Self::DefaultInstall,
            Self::BackupRestore,
            Self::SelectTheme,
            Self::SelectPlugins,
            Self::SelectAliasMode,
            Self::SelectFunctionMode,
            Self::InstallComponents,
            Self::SynthesizeWrite,
            Self::Backup,
            Self::Restore,
            Self::Done,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during step transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupTransitionError {
    /// The transition table has no edge between the two steps
    #[error("Cannot go from {from} to {to}")]
    NotAllowed { from: SetupStep, to: SetupStep },

    /// Attempted to leave a terminal state
    #[error("Cannot transition from terminal state {from}")]
    FromTerminalState { from: SetupStep },
}

impl From<SetupTransitionError> for crate::error::LazyZshError {
    fn from(err: SetupTransitionError) -> Self {
        crate::error::LazyZshError::Transition(err.to_string())
    }
}

/// Owns the current step of a run and its history.
///
/// # Example
///
/// ```
/// use lazyzsh::setup_state::{SetupContext, SetupStep};
///
/// let mut ctx = SetupContext::new();
/// ctx.transition_to(SetupStep::DefaultInstall).unwrap();
///
/// // Backup is not reachable from the installation path
/// assert!(ctx.transition_to(SetupStep::Backup).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SetupContext {
    current: SetupStep,
    /// Step at which the user cancelled, if any
    cancelled_at: Option<SetupStep>,
    history: Vec<SetupStep>,
}

impl Default for SetupContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupContext {
    pub fn new() -> Self {
        Self {
            current: SetupStep::Start,
            cancelled_at: None,
            history: vec![SetupStep::Start],
        }
    }

    #[inline]
    pub fn current(&self) -> SetupStep {
        self.current
    }

    #[inline]
    pub fn cancelled_at(&self) -> Option<SetupStep> {
        self.cancelled_at
    }

    /// Every step visited so far, starting with Start
    pub fn history(&self) -> &[SetupStep] {
        &self.history
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.current.is_terminal()
    }

    /// Move to `target`, which must be a successor of the current step.
    pub fn transition_to(&mut self, target: SetupStep) -> Result<SetupStep, SetupTransitionError> {
        if self.current.is_terminal() {
            return Err(SetupTransitionError::FromTerminalState { from: self.current });
        }
        if target == SetupStep::Cancelled || !self.current.can_transition_to(target) {
            return Err(SetupTransitionError::NotAllowed {
                from: self.current,
                to: target,
            });
        }

        tracing::debug!("Setup step: {} -> {}", self.current, target);
        self.current = target;
        self.history.push(target);
        Ok(target)
    }

    /// Record a cancellation at the current step.
    pub fn cancel(&mut self) -> Result<SetupStep, SetupTransitionError> {
        if self.current.is_terminal() {
            return Err(SetupTransitionError::FromTerminalState { from: self.current });
        }
        let at = self.current;
        self.cancelled_at = Some(at);
        self.current = SetupStep::Cancelled;
        self.history.push(SetupStep::Cancelled);
        Ok(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_non_terminal_step_reaches_done() {
        for start in SetupStep::all_steps() {
            if start.is_terminal() {
                continue;
            }
            let mut current = *start;
            let mut count = 0;
            while let Some(next) = current.successors().first() {
                current = *next;
                count += 1;
                assert!(count < 20, "Loop detected from {:?}", start);
            }
            assert_eq!(current, SetupStep::Done, "{:?} should reach Done", start);
        }
    }

    #[test]
    fn test_installation_path_is_linear() {
        let mut ctx = SetupContext::new();
        for step in [
            SetupStep::FreshInstall,
            SetupStep::SelectTheme,
            SetupStep::SelectPlugins,
            SetupStep::SelectAliasMode,
            SetupStep::SelectFunctionMode,
            SetupStep::InstallComponents,
            SetupStep::SynthesizeWrite,
            SetupStep::Done,
        ] {
            ctx.transition_to(step).unwrap();
        }
        assert!(ctx.is_finished());
        assert_eq!(ctx.history().len(), 9);
    }

    #[test]
    fn test_cannot_skip_steps() {
        let mut ctx = SetupContext::new();
        ctx.transition_to(SetupStep::FreshInstall).unwrap();
        let err = ctx.transition_to(SetupStep::InstallComponents).unwrap_err();
        assert_eq!(
            err,
            SetupTransitionError::NotAllowed {
                from: SetupStep::FreshInstall,
                to: SetupStep::InstallComponents,
            }
        );
        assert_eq!(ctx.current(), SetupStep::FreshInstall);
    }

    #[test]
    fn test_backup_branch_is_separate() {
        let mut ctx = SetupContext::new();
        ctx.transition_to(SetupStep::BackupRestore).unwrap();
        assert!(ctx.transition_to(SetupStep::SelectTheme).is_err());
        ctx.transition_to(SetupStep::Restore).unwrap();
        ctx.transition_to(SetupStep::Done).unwrap();
    }

    #[test]
    fn test_cancel_records_step() {
        let mut ctx = SetupContext::new();
        ctx.transition_to(SetupStep::FreshInstall).unwrap();
        ctx.transition_to(SetupStep::SelectTheme).unwrap();
        assert_eq!(ctx.cancel().unwrap(), SetupStep::SelectTheme);
        assert_eq!(ctx.current(), SetupStep::Cancelled);
        assert_eq!(ctx.cancelled_at(), Some(SetupStep::SelectTheme));

        assert!(matches!(
            ctx.cancel(),
            Err(SetupTransitionError::FromTerminalState { .. })
        ));
    }

    #[test]
    fn test_cancelled_only_through_cancel() {
        let mut ctx = SetupContext::new();
        assert!(ctx.transition_to(SetupStep::Cancelled).is_err());
        assert!(SetupStep::Start.can_transition_to(SetupStep::Cancelled));
        assert!(!SetupStep::Done.can_transition_to(SetupStep::Cancelled));
    }

    #[test]
    fn test_transition_error_converts() {
        let err: crate::error::LazyZshError = SetupTransitionError::FromTerminalState {
            from: SetupStep::Done,
        }
        .into();
        assert!(matches!(err, crate::error::LazyZshError::Transition(_)));
    }
}
