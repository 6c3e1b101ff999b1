//! Setup orchestrator: drives one run of the wizard through [`SetupContext`].
//!
//! Every step change goes through the transition table, so a branch the
//! table does not allow is a [`LazyZshError::Transition`] bug rather than a
//! silently skipped prompt. Declining a prompt ends the run with
//! [`RunOutcome::Cancelled`]; it is not an error.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::backup::{BackupStore, Snapshot, SnapshotOutcome};
use crate::catalog;
use crate::command_runner::CommandRunner;
use crate::error::{LazyZshError, Result, EXIT_CANCELLED, EXIT_COMPLETED};
use crate::installer::{ComponentInstaller, InstallReport};
use crate::paths::Layout;
use crate::prompt::{Answer, Choice, PromptSpec, Prompter};
use crate::registry::RepositoryRegistry;
use crate::selection::{validate_identifier, Selection, DEFAULT_FONT_CASK};
use crate::setup_state::{SetupContext, SetupStep};
use crate::synth;
use crate::types::{AliasMode, BackupAction, ComponentKind, FunctionMode, StartAction};

/// Value of the "Find more..." entry; never a valid identifier
pub const FIND_MORE: &str = "<find-more>";
const FIND_MORE_LABEL: &str = "Find more...";

/// What a completed run did
#[derive(Debug)]
pub enum RunReport {
    /// Components installed and the configuration written
    Installed {
        selection: Selection,
        install: InstallReport,
        /// Snapshot of the configuration that was replaced, if there was one
        previous: Option<Snapshot>,
        written: PathBuf,
    },
    BackedUp(SnapshotOutcome),
    Restored { snapshot: PathBuf },
    /// Restore was requested but the store is empty
    NothingToRestore,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    Cancelled { at: SetupStep },
}

impl RunOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Process exit status: `0` completed, `1` cancelled
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Completed(_) => EXIT_COMPLETED,
            Self::Cancelled { .. } => EXIT_CANCELLED,
        }
    }
}

/// Drives the setup state machine over injected collaborators
pub struct Orchestrator<'a> {
    layout: &'a Layout,
    registry: &'a RepositoryRegistry,
    runner: &'a dyn CommandRunner,
    store: BackupStore,
    ctx: SetupContext,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        layout: &'a Layout,
        registry: &'a RepositoryRegistry,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            layout,
            registry,
            runner,
            store: BackupStore::new(layout),
            ctx: SetupContext::new(),
        }
    }

    /// Steps visited by the most recent run
    pub fn history(&self) -> &[SetupStep] {
        self.ctx.history()
    }

    /// The full interactive wizard.
    pub fn run(&mut self, prompter: &mut dyn Prompter) -> Result<RunOutcome> {
        self.ctx = SetupContext::new();

        let spec = PromptSpec::single(
            "What would you like to do?",
            StartAction::iter()
                .map(|a| Choice::new(a.label(), a.to_string()))
                .collect(),
        );
        let Some(value) = ask_single(prompter, &spec)? else {
            return self.cancelled();
        };
        let action = StartAction::from_str(&value)
            .map_err(|_| LazyZshError::prompt(format!("unknown action '{}'", value)))?;
        info!("Start action: {}", action);

        match action {
            StartAction::FreshInstall => {
                self.ctx.transition_to(SetupStep::FreshInstall)?;
                match self.select_interactively(prompter)? {
                    Some(selection) => self.install_and_write(selection, &[]),
                    None => self.cancelled(),
                }
            }
            StartAction::DefaultInstall => {
                self.ctx.transition_to(SetupStep::DefaultInstall)?;
                let selection = Selection::default_install();
                self.pass_through_selection()?;
                self.install_and_write(selection, &[DEFAULT_FONT_CASK])
            }
            StartAction::BackupRestore => {
                self.ctx.transition_to(SetupStep::BackupRestore)?;
                self.backup_or_restore(prompter)
            }
        }
    }

    /// Install and write a selection that was decided beforehand (a saved file).
    pub fn apply(&mut self, selection: Selection) -> Result<RunOutcome> {
        self.ctx = SetupContext::new();
        self.ctx.transition_to(SetupStep::FreshInstall)?;
        self.pass_through_selection()?;
        self.install_and_write(selection, &[])
    }

    /// Snapshot the live configuration without prompting.
    pub fn backup(&mut self) -> Result<RunOutcome> {
        self.ctx = SetupContext::new();
        self.ctx.transition_to(SetupStep::BackupRestore)?;
        self.do_backup()
    }

    /// Restore a snapshot, asking which one unless `snapshot` is given and
    /// asking for confirmation unless `assume_yes`.
    pub fn restore(
        &mut self,
        prompter: &mut dyn Prompter,
        snapshot: Option<PathBuf>,
        assume_yes: bool,
    ) -> Result<RunOutcome> {
        self.ctx = SetupContext::new();
        self.ctx.transition_to(SetupStep::BackupRestore)?;
        self.do_restore(prompter, snapshot, assume_yes)
    }

    fn backup_or_restore(&mut self, prompter: &mut dyn Prompter) -> Result<RunOutcome> {
        let spec = PromptSpec::single(
            "Backup or restore?",
            BackupAction::iter()
                .map(|a| Choice::new(a.label(), a.to_string()))
                .collect(),
        );
        let Some(value) = ask_single(prompter, &spec)? else {
            return self.cancelled();
        };
        match BackupAction::from_str(&value)
            .map_err(|_| LazyZshError::prompt(format!("unknown backup action '{}'", value)))?
        {
            BackupAction::Backup => self.do_backup(),
            BackupAction::Restore => self.do_restore(prompter, None, false),
        }
    }

    /// Theme, plugins, aliases, functions; `None` if the user cancelled
    fn select_interactively(&mut self, prompter: &mut dyn Prompter) -> Result<Option<Selection>> {
        self.ctx.transition_to(SetupStep::SelectTheme)?;
        let spec = PromptSpec::single("Choose a theme", self.offered(ComponentKind::Theme));
        let Some(mut theme) = ask_single(prompter, &spec)? else {
            return Ok(None);
        };
        if theme == FIND_MORE {
            match self.find_more_theme(prompter)? {
                Some(bundled) => theme = bundled,
                None => return Ok(None),
            }
        }

        self.ctx.transition_to(SetupStep::SelectPlugins)?;
        let spec = PromptSpec::multiple(
            "Choose plugins (space to toggle, enter to confirm)",
            self.offered(ComponentKind::Plugin),
        );
        let Some(mut plugins) = ask_multiple(prompter, &spec)? else {
            return Ok(None);
        };
        if let Some(pos) = plugins.iter().position(|p| p == FIND_MORE) {
            plugins.remove(pos);
            match self.find_more_plugins(prompter)? {
                Some(more) => plugins.extend(more),
                None => return Ok(None),
            }
        }

        self.ctx.transition_to(SetupStep::SelectAliasMode)?;
        let spec = PromptSpec::single(
            "Choose aliases",
            AliasMode::iter()
                .map(|m| Choice::new(m.label(), m.to_string()))
                .collect(),
        );
        let Some(value) = ask_single(prompter, &spec)? else {
            return Ok(None);
        };
        let alias_mode = AliasMode::from_str(&value)
            .map_err(|_| LazyZshError::prompt(format!("unknown alias mode '{}'", value)))?;

        self.ctx.transition_to(SetupStep::SelectFunctionMode)?;
        let spec = PromptSpec::single(
            "Choose functions",
            FunctionMode::iter()
                .map(|m| Choice::new(m.label(), m.to_string()))
                .collect(),
        );
        let Some(value) = ask_single(prompter, &spec)? else {
            return Ok(None);
        };
        let function_mode = FunctionMode::from_str(&value)
            .map_err(|_| LazyZshError::prompt(format!("unknown function mode '{}'", value)))?;

        let (selection, _) = Selection::new(theme, plugins, alias_mode, function_mode);
        Ok(Some(selection))
    }

    /// Registered identifiers of one kind, then "Find more..."
    fn offered(&self, kind: ComponentKind) -> Vec<Choice> {
        self.registry
            .identifiers(kind)
            .map(Choice::plain)
            .chain(std::iter::once(Choice::new(FIND_MORE_LABEL, FIND_MORE)))
            .collect()
    }

    /// Bundled components of one kind that the registry does not list
    fn more_components(&self, kind: ComponentKind) -> Result<Vec<String>> {
        let registered: Vec<&str> = self.registry.identifiers(kind).collect();
        let more: Vec<String> = catalog::bundled(self.layout, kind)?
            .into_iter()
            .filter(|id| !registered.contains(&id.as_str()))
            .collect();
        if more.is_empty() {
            println!(
                "⚠ No other {}s found in {}",
                kind,
                self.layout.bundled_dir(kind).display()
            );
        }
        Ok(more)
    }

    /// Pick a bundled theme; falls back to the registered ones if none are found
    fn find_more_theme(&self, prompter: &mut dyn Prompter) -> Result<Option<String>> {
        let more = self.more_components(ComponentKind::Theme)?;
        let choices = if more.is_empty() {
            self.registry
                .identifiers(ComponentKind::Theme)
                .map(Choice::plain)
                .collect()
        } else {
            more.into_iter().map(Choice::plain).collect()
        };
        let spec = PromptSpec::single("Choose a theme bundled with Oh My Zsh", choices);
        let theme = ask_single(prompter, &spec)?;
        if let Some(theme) = &theme {
            validate_identifier(theme)?;
        }
        Ok(theme)
    }

    fn find_more_plugins(&self, prompter: &mut dyn Prompter) -> Result<Option<Vec<String>>> {
        let more = self.more_components(ComponentKind::Plugin)?;
        if more.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let spec = PromptSpec::multiple(
            "Choose more plugins bundled with Oh My Zsh",
            more.into_iter().map(Choice::plain).collect(),
        );
        let plugins = ask_multiple(prompter, &spec)?;
        for plugin in plugins.iter().flatten() {
            validate_identifier(plugin)?;
        }
        Ok(plugins)
    }

    /// Walk the Select* steps for a selection that needs no prompting
    fn pass_through_selection(&mut self) -> Result<()> {
        for step in [
            SetupStep::SelectTheme,
            SetupStep::SelectPlugins,
            SetupStep::SelectAliasMode,
            SetupStep::SelectFunctionMode,
        ] {
            self.ctx.transition_to(step)?;
        }
        Ok(())
    }

    fn install_and_write(&mut self, selection: Selection, extra_fonts: &[&str]) -> Result<RunOutcome> {
        selection.validate()?;

        self.ctx.transition_to(SetupStep::InstallComponents)?;
        let installer = ComponentInstaller::new(self.layout, self.registry, self.runner);
        let install = installer.install_all(&selection, extra_fonts);
        if !install.is_clean() {
            println!(
                "⚠ {} component(s) failed to install: {}",
                install.failures.len(),
                install.failed_identifiers().join(", ")
            );
        }

        self.ctx.transition_to(SetupStep::SynthesizeWrite)?;
        let text = synth::render(&selection);
        let previous = match self.store.create_snapshot()? {
            SnapshotOutcome::Created(snapshot) => {
                println!("✓ Previous configuration saved to {}", snapshot.path.display());
                Some(snapshot)
            }
            SnapshotOutcome::NothingToBackUp => None,
        };

        let written = self.layout.zshrc();
        fs::write(&written, text).map_err(|source| LazyZshError::Write {
            path: written.clone(),
            source,
        })?;
        println!("✓ Configuration written to {}", written.display());

        self.ctx.transition_to(SetupStep::Done)?;
        Ok(RunOutcome::Completed(RunReport::Installed {
            selection,
            install,
            previous,
            written,
        }))
    }

    fn do_backup(&mut self) -> Result<RunOutcome> {
        self.ctx.transition_to(SetupStep::Backup)?;
        let outcome = self.store.create_snapshot()?;
        match &outcome {
            SnapshotOutcome::Created(snapshot) => {
                println!("✓ Backup created at {}", snapshot.path.display())
            }
            SnapshotOutcome::NothingToBackUp => {
                println!("⚠ No {} to back up", self.layout.zshrc().display())
            }
        }
        self.ctx.transition_to(SetupStep::Done)?;
        Ok(RunOutcome::Completed(RunReport::BackedUp(outcome)))
    }

    fn do_restore(
        &mut self,
        prompter: &mut dyn Prompter,
        snapshot: Option<PathBuf>,
        assume_yes: bool,
    ) -> Result<RunOutcome> {
        self.ctx.transition_to(SetupStep::Restore)?;

        let path = match snapshot {
            Some(path) => path,
            None => {
                let mut snapshots = self.store.list_snapshots()?;
                if snapshots.is_empty() {
                    println!("⚠ No backups found in {}", self.store.dir().display());
                    self.ctx.transition_to(SetupStep::Done)?;
                    return Ok(RunOutcome::Completed(RunReport::NothingToRestore));
                }
                snapshots.reverse();
                let spec = PromptSpec::single(
                    "Choose a backup to restore (newest first)",
                    snapshots
                        .iter()
                        .map(|s| Choice::new(s.file_name(), s.path.display().to_string()))
                        .collect(),
                );
                let Some(value) = ask_single(prompter, &spec)? else {
                    return self.cancelled();
                };
                PathBuf::from(value)
            }
        };

        if !assume_yes {
            let spec = PromptSpec::confirm(
                format!(
                    "Overwrite {} with {}?",
                    self.layout.zshrc().display(),
                    path.display()
                ),
                false,
            );
            if ask_confirm(prompter, &spec)? != Some(true) {
                return self.cancelled();
            }
        }

        self.store.restore_snapshot(&path)?;
        println!("✓ {} restored from {}", self.layout.zshrc().display(), path.display());
        self.ctx.transition_to(SetupStep::Done)?;
        Ok(RunOutcome::Completed(RunReport::Restored { snapshot: path }))
    }

    fn cancelled(&mut self) -> Result<RunOutcome> {
        let at = self.ctx.cancel()?;
        info!("Cancelled by user at step: {}", at);
        Ok(RunOutcome::Cancelled { at })
    }
}

fn ask_single(prompter: &mut dyn Prompter, spec: &PromptSpec) -> Result<Option<String>> {
    match prompter.ask(spec)? {
        Answer::Single(value) => Ok(Some(value)),
        Answer::Cancelled => Ok(None),
        other => Err(unexpected(spec, &other)),
    }
}

fn ask_multiple(prompter: &mut dyn Prompter, spec: &PromptSpec) -> Result<Option<Vec<String>>> {
    match prompter.ask(spec)? {
        Answer::Multiple(values) => {
            debug!("{}: {:?}", spec.message, values);
            Ok(Some(values))
        }
        Answer::Cancelled => Ok(None),
        other => Err(unexpected(spec, &other)),
    }
}

fn ask_confirm(prompter: &mut dyn Prompter, spec: &PromptSpec) -> Result<Option<bool>> {
    match prompter.ask(spec)? {
        Answer::Confirmed(yes) => Ok(Some(yes)),
        Answer::Cancelled => Ok(None),
        other => Err(unexpected(spec, &other)),
    }
}

fn unexpected(spec: &PromptSpec, answer: &Answer) -> LazyZshError {
    LazyZshError::prompt(format!("unexpected answer {:?} to '{}'", answer, spec.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_runner::RecordingRunner;
    use crate::prompt::ScriptedPrompter;
    use tempfile::TempDir;

    #[test]
    fn test_cancel_at_start() {
        let home = TempDir::new().unwrap();
        let layout = Layout::from_home(home.path());
        let registry = RepositoryRegistry::builtin();
        let runner = RecordingRunner::new();
        let mut prompter = ScriptedPrompter::new([Answer::Cancelled]);

        let mut orchestrator = Orchestrator::new(&layout, &registry, &runner);
        let outcome = orchestrator.run(&mut prompter).unwrap();
        assert!(matches!(outcome, RunOutcome::Cancelled { at: SetupStep::Start }));
        assert_eq!(outcome.exit_status(), EXIT_CANCELLED);
        assert!(!layout.zshrc().exists());
    }

    #[test]
    fn test_wrong_answer_kind_is_prompt_error() {
        let home = TempDir::new().unwrap();
        let layout = Layout::from_home(home.path());
        let registry = RepositoryRegistry::builtin();
        let runner = RecordingRunner::new();
        let mut prompter = ScriptedPrompter::new([Answer::Confirmed(true)]);

        let mut orchestrator = Orchestrator::new(&layout, &registry, &runner);
        assert!(matches!(
            orchestrator.run(&mut prompter),
            Err(LazyZshError::Prompt(_))
        ));
    }

    #[test]
    fn test_find_more_is_offered_last() {
        let home = TempDir::new().unwrap();
        let layout = Layout::from_home(home.path());
        let registry = RepositoryRegistry::builtin();
        let runner = RecordingRunner::new();
        let orchestrator = Orchestrator::new(&layout, &registry, &runner);

        let themes = orchestrator.offered(ComponentKind::Theme);
        assert_eq!(themes.len(), registry.identifiers(ComponentKind::Theme).count() + 1);
        assert_eq!(themes.last(), Some(&Choice::new("Find more...", FIND_MORE)));
        assert!(validate_identifier(FIND_MORE).is_err());
    }

    #[test]
    fn test_backup_without_live_file() {
        let home = TempDir::new().unwrap();
        let layout = Layout::from_home(home.path());
        let registry = RepositoryRegistry::builtin();
        let runner = RecordingRunner::new();

        let mut orchestrator = Orchestrator::new(&layout, &registry, &runner);
        let outcome = orchestrator.backup().unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Completed(RunReport::BackedUp(SnapshotOutcome::NothingToBackUp))
        ));
        assert_eq!(outcome.exit_status(), EXIT_COMPLETED);
        assert_eq!(orchestrator.history().last(), Some(&SetupStep::Done));
    }
}
