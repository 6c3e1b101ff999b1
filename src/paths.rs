//! Filesystem layout: every fixed home-relative path lazyzsh touches.

use std::path::{Path, PathBuf};

use crate::error::{LazyZshError, Result};
use crate::types::ComponentKind;

/// Live configuration file name
pub const ZSHRC_FILE: &str = ".zshrc";
/// Backup directory name
pub const BACKUP_DIR: &str = ".awesome-lazy-zsh_backup";
/// Fixed prefix of every snapshot file name
pub const SNAPSHOT_PREFIX: &str = ".zshrc.backup.";
/// Oh My Zsh checkout, relative to home
pub const FRAMEWORK_DIR: &str = ".oh-my-zsh";
/// Custom components root, relative to the framework checkout
pub const CUSTOM_DIR: &str = "custom";
/// File extension of a bundled theme
pub const THEME_EXTENSION: &str = "zsh-theme";

/// Resolved paths for one home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
}

impl Layout {
    /// Layout rooted at an explicit home directory (tests, `--home`)
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Layout for the current user's home directory
    pub fn detect() -> Result<Self> {
        dirs::home_dir()
            .map(Self::from_home)
            .ok_or_else(|| LazyZshError::validation("Could not determine the home directory"))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The generated configuration file (`~/.zshrc`)
    pub fn zshrc(&self) -> PathBuf {
        self.home.join(ZSHRC_FILE)
    }

    /// Directory holding the snapshots
    pub fn backup_dir(&self) -> PathBuf {
        self.home.join(BACKUP_DIR)
    }

    /// The Oh My Zsh checkout (`$ZSH`)
    pub fn framework_root(&self) -> PathBuf {
        self.home.join(FRAMEWORK_DIR)
    }

    /// Root of the custom components tree
    pub fn components_root(&self) -> PathBuf {
        self.framework_root().join(CUSTOM_DIR)
    }

    /// Directory of the components that ship with the framework
    pub fn bundled_dir(&self, kind: ComponentKind) -> PathBuf {
        self.framework_root().join(kind.dir_name())
    }

    /// Where a bundled component lives: `plugins/<id>/` or `themes/<id>.zsh-theme`
    pub fn bundled_component(&self, kind: ComponentKind, identifier: &str) -> PathBuf {
        match kind {
            ComponentKind::Plugin => self.bundled_dir(kind).join(identifier),
            ComponentKind::Theme => self
                .bundled_dir(kind)
                .join(format!("{}.{}", identifier, THEME_EXTENSION)),
        }
    }

    /// Expected local path of a component: `<componentsRoot>/<kind>s/<identifier>`
    pub fn component_dir(&self, kind: ComponentKind, identifier: &str) -> PathBuf {
        self.components_root().join(kind.dir_name()).join(identifier)
    }
}
