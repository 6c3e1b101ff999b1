//! Component installer: make a plugin or theme present on disk.
//!
//! A component directory counts as installed only if it holds a `.git`
//! marker. Clones go into a hidden staging sibling and are renamed into place
//! once git succeeds, so an interrupted clone never shows up at the target.
//! A non-empty directory without the marker belongs to the user and is left
//! alone; installing over it is an error.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::catalog;
use crate::command_args::{BrewCaskArgs, GitCloneArgs};
use crate::command_runner::CommandRunner;
use crate::error::{LazyZshError, Result};
use crate::paths::Layout;
use crate::registry::{RepositoryRegistry, Resolution};
use crate::selection::{validate_identifier, Selection};
use crate::types::ComponentKind;

/// Marker that distinguishes a finished clone from a partial one
const INSTALLED_MARKER: &str = ".git";
/// Suffix of the hidden directory a clone is staged in
const STAGING_SUFFIX: &str = ".lazyzsh-clone";

/// Why nothing was fetched for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NothingToFetchReason {
    /// Ships with Oh My Zsh (registered as built in, or bundled in the checkout)
    BuiltIn,
    /// Not in the registry and not bundled
    Unrecognized,
}

/// Result of [`ComponentInstaller::ensure_installed`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled { path: PathBuf },
    Fetched { url: String, path: PathBuf },
    NothingToFetch { reason: NothingToFetchReason },
}

/// Everything [`ComponentInstaller::install_all`] did.
///
/// Failures are collected rather than returned early: one broken plugin must
/// not stop the rest from installing.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub outcomes: Vec<(String, InstallOutcome)>,
    /// Font casks installed successfully
    pub fonts: Vec<String>,
    pub failures: Vec<LazyZshError>,
}

impl InstallReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Identifiers (components or font casks) whose installation failed
    pub fn failed_identifiers(&self) -> Vec<&str> {
        self.failures
            .iter()
            .filter_map(|e| match e {
                LazyZshError::Install { identifier, .. } => Some(identifier.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn outcome(&self, identifier: &str) -> Option<&InstallOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, outcome)| outcome)
    }
}

/// Installs components from the registry with an injected runner
pub struct ComponentInstaller<'a> {
    layout: &'a Layout,
    registry: &'a RepositoryRegistry,
    runner: &'a dyn CommandRunner,
}

impl<'a> ComponentInstaller<'a> {
    pub fn new(
        layout: &'a Layout,
        registry: &'a RepositoryRegistry,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            layout,
            registry,
            runner,
        }
    }

    /// Make sure one component is present under the custom components root.
    ///
    /// Clone failures come back as [`LazyZshError::Install`] carrying the
    /// identifier and the runner's error.
    pub fn ensure_installed(&self, identifier: &str, kind: ComponentKind) -> Result<InstallOutcome> {
        validate_identifier(identifier)?;
        let path = self.layout.component_dir(kind, identifier);

        if is_installed(&path) {
            debug!("{} {} already installed at {}", kind, identifier, path.display());
            return Ok(InstallOutcome::AlreadyInstalled { path });
        }

        let url = match self.registry.resolve(kind, identifier) {
            Resolution::Fetch(url) => url,
            Resolution::BuiltIn => {
                debug!("{} {} is built in, nothing to fetch", kind, identifier);
                return Ok(InstallOutcome::NothingToFetch {
                    reason: NothingToFetchReason::BuiltIn,
                });
            }
            Resolution::Unknown if catalog::is_bundled(self.layout, kind, identifier) => {
                debug!("{} {} ships with the framework", kind, identifier);
                return Ok(InstallOutcome::NothingToFetch {
                    reason: NothingToFetchReason::BuiltIn,
                });
            }
            Resolution::Unknown => {
                warn!("Unknown {} '{}', nothing to fetch", kind, identifier);
                return Ok(InstallOutcome::NothingToFetch {
                    reason: NothingToFetchReason::Unrecognized,
                });
            }
        };

        if self.runner.is_dry_run() {
            self.runner
                .run(&GitCloneArgs::shallow(url, path.clone()))
                .map_err(|e| LazyZshError::install(identifier, e))?;
            return Ok(InstallOutcome::Fetched {
                url: url.to_string(),
                path,
            });
        }

        let staging = self.prepare_staging(&path)?;
        if let Err(e) = self.runner.run(&GitCloneArgs::shallow(url, staging.clone())) {
            discard(&staging);
            return Err(LazyZshError::install(identifier, e));
        }
        if let Err(e) = fs::rename(&staging, &path) {
            discard(&staging);
            return Err(e.into());
        }

        info!("Installed {} {} from {}", kind, identifier, url);
        Ok(InstallOutcome::Fetched {
            url: url.to_string(),
            path,
        })
    }

    /// Install a Nerd Font cask with Homebrew
    pub fn install_font(&self, cask: &str) -> Result<()> {
        self.runner
            .run(&BrewCaskArgs::new(cask))
            .map_err(|e| LazyZshError::install(cask, e))?;
        info!("Installed font {}", cask);
        Ok(())
    }

    /// Install the theme, its font, `extra_fonts`, then every plugin in order.
    pub fn install_all(&self, selection: &Selection, extra_fonts: &[&str]) -> InstallReport {
        let mut report = InstallReport::default();

        self.install_component(&mut report, selection.theme(), ComponentKind::Theme);

        let mut fonts: Vec<&str> = Vec::new();
        if let Some(cask) = self.registry.font_cask(ComponentKind::Theme, selection.theme()) {
            fonts.push(cask);
        }
        for &cask in extra_fonts {
            if !fonts.contains(&cask) {
                fonts.push(cask);
            }
        }
        for cask in fonts {
            match self.install_font(cask) {
                Ok(()) => {
                    println!("✓ Font {} installed", cask);
                    report.fonts.push(cask.to_string());
                }
                Err(e) => {
                    error!("{}", e);
                    println!("✗ {}", e);
                    report.failures.push(e);
                }
            }
        }

        for plugin in selection.plugins() {
            self.install_component(&mut report, plugin, ComponentKind::Plugin);
        }

        report
    }

    fn install_component(&self, report: &mut InstallReport, identifier: &str, kind: ComponentKind) {
        match self.ensure_installed(identifier, kind) {
            Ok(outcome) => {
                match &outcome {
                    InstallOutcome::Fetched { .. } => println!("✓ {} {} installed", kind, identifier),
                    InstallOutcome::AlreadyInstalled { .. } => {
                        println!("✓ {} {} already installed", kind, identifier)
                    }
                    InstallOutcome::NothingToFetch {
                        reason: NothingToFetchReason::BuiltIn,
                    } => println!("✓ {} {} is built in", kind, identifier),
                    InstallOutcome::NothingToFetch {
                        reason: NothingToFetchReason::Unrecognized,
                    } => println!("⚠ Unknown {} {}, skipped", kind, identifier),
                }
                report.outcomes.push((identifier.to_string(), outcome));
            }
            Err(e) => {
                error!("{}", e);
                println!("✗ {}", e);
                report.failures.push(e);
            }
        }
    }

    /// Check the target is free, create its parent and clear a stale staging
    /// directory left by an interrupted run.
    fn prepare_staging(&self, path: &Path) -> Result<PathBuf> {
        if path.is_dir() && fs::read_dir(path)?.next().is_none() {
            debug!("Removing empty directory {}", path.display());
            fs::remove_dir(path)?;
        } else if fs::symlink_metadata(path).is_ok() {
            return Err(LazyZshError::validation(format!(
                "{} exists but is not a git checkout; move it away to reinstall",
                path.display()
            )));
        }

        let staging = staging_path(path);
        if staging.exists() {
            warn!("Removing stale clone {}", staging.display());
            fs::remove_dir_all(&staging)?;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(staging)
    }
}

/// Hidden sibling a component is cloned into before being renamed into place
pub fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}{}", name, STAGING_SUFFIX))
}

fn discard(staging: &Path) {
    if staging.exists() {
        if let Err(e) = fs::remove_dir_all(staging) {
            warn!("Failed to remove {}: {}", staging.display(), e);
        }
    }
}

/// A directory with a `.git` marker is a finished install
pub fn is_installed(path: &Path) -> bool {
    path.is_dir() && path.join(INSTALLED_MARKER).exists()
}
