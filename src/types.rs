//! Type-safe choice types for lazyzsh
//!
//! Every closed set of answers the wizard can receive is an enum here, so
//! the orchestrator matches exhaustively instead of comparing strings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of installable component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentKind {
    Plugin,
    Theme,
}

impl ComponentKind {
    /// Directory under the custom components root holding this kind
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Plugin => "plugins",
            Self::Theme => "themes",
        }
    }
}

/// Which alias block to write into the generated configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AliasMode {
    #[default]
    Default,
    Custom,
}

impl AliasMode {
    /// Label shown in the alias prompt
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default Aliases",
            Self::Custom => "Custom Aliases",
        }
    }
}

/// Which shell function block to write into the generated configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FunctionMode {
    #[default]
    Default,
    Custom,
}

impl FunctionMode {
    /// Label shown in the function prompt
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default Functions",
            Self::Custom => "Custom Functions",
        }
    }
}

/// First question of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum StartAction {
    #[strum(serialize = "freshInstallation")]
    FreshInstall,
    #[strum(serialize = "defaultInstallation")]
    DefaultInstall,
    #[strum(serialize = "restoreBackup")]
    BackupRestore,
}

impl StartAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FreshInstall => "Start fresh installation",
            Self::DefaultInstall => "Default installation",
            Self::BackupRestore => "Restore/Backup",
        }
    }
}

/// Second question of the backup/restore branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BackupAction {
    Backup,
    Restore,
}

impl BackupAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backup => "Backup .zshrc",
            Self::Restore => "Restore .zshrc from Backup",
        }
    }
}
