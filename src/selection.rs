//! The user's choices for one run.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LazyZshError, Result};
use crate::types::{AliasMode, FunctionMode};

/// Theme applied by the default installation
pub const DEFAULT_THEME: &str = "spaceship";

/// Plugins installed by the default installation, in load order
pub const DEFAULT_PLUGINS: &[&str] = &[
    "git",
    "git-flow",
    "npm",
    "nvm",
    "docker",
    "docker-compose",
    "kubectl",
    "terraform",
    "vscode",
    "fzf",
    "z",
    "zsh-autocomplete",
    "zsh-autosuggestions",
    "zsh-syntax-highlighting",
];

/// Font cask installed by the default installation
pub const DEFAULT_FONT_CASK: &str = "font-meslo-lg-nerd-font";

/// Theme, ordered plugins and alias/function modes for one run.
///
/// Immutable once built. Plugin order is the shell's plugin load order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    theme: String,
    plugins: Vec<String>,
    #[serde(default)]
    alias_mode: AliasMode,
    #[serde(default)]
    function_mode: FunctionMode,
}

impl Selection {
    /// Build a selection, dropping repeated plugins (first occurrence wins).
    ///
    /// Returns the selection and the identifiers that were dropped, so the
    /// caller knows the load order it asked for was changed.
    pub fn new(
        theme: impl Into<String>,
        plugins: impl IntoIterator<Item = impl Into<String>>,
        alias_mode: AliasMode,
        function_mode: FunctionMode,
    ) -> (Self, Vec<String>) {
        let (plugins, dropped) = dedup_preserving_order(plugins.into_iter().map(Into::into));
        if !dropped.is_empty() {
            warn!("Ignoring repeated plugins: {}", dropped.join(", "));
        }
        (
            Self {
                theme: theme.into(),
                plugins,
                alias_mode,
                function_mode,
            },
            dropped,
        )
    }

    /// The preset used by the default installation
    pub fn default_install() -> Self {
        Self::new(
            DEFAULT_THEME,
            DEFAULT_PLUGINS.iter().copied(),
            AliasMode::Default,
            FunctionMode::Default,
        )
        .0
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn alias_mode(&self) -> AliasMode {
        self.alias_mode
    }

    pub fn function_mode(&self) -> FunctionMode {
        self.function_mode
    }

    pub fn has_plugin(&self, identifier: &str) -> bool {
        self.plugins.iter().any(|p| p == identifier)
    }

    /// Check every identifier is safe to interpolate into the generated file.
    ///
    /// The synthesizer performs no escaping, so this must pass before rendering
    /// anything that did not come from the registry.
    pub fn validate(&self) -> Result<()> {
        if self.theme.trim().is_empty() {
            return Err(LazyZshError::validation("Theme must be specified"));
        }
        validate_identifier(&self.theme)?;
        for plugin in &self.plugins {
            validate_identifier(plugin)?;
        }
        Ok(())
    }
}

/// Identifiers are limited to `[A-Za-z0-9._-]` and may not start with `.` or `-`.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(LazyZshError::validation("Identifier must not be empty"));
    }
    if identifier.starts_with('.') || identifier.starts_with('-') {
        return Err(LazyZshError::validation(format!(
            "Identifier '{}' must not start with '.' or '-'",
            identifier
        )));
    }
    if !identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(LazyZshError::validation(format!(
            "Identifier '{}' may only contain letters, numbers, '.', '_' and '-'",
            identifier
        )));
    }
    Ok(())
}

/// Keep the first occurrence of each identifier; report the rest.
pub fn dedup_preserving_order(items: impl IntoIterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let mut kept: Vec<String> = Vec::new();
    let mut dropped = Vec::new();
    for item in items {
        if kept.contains(&item) {
            dropped.push(item);
        } else {
            kept.push(item);
        }
    }
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_drops_duplicates_keeping_first() {
        let (selection, dropped) = Selection::new(
            "robbyrussell",
            ["git", "docker", "git", "fzf", "docker"],
            AliasMode::Default,
            FunctionMode::Default,
        );
        assert_eq!(selection.plugins(), ["git", "docker", "fzf"]);
        assert_eq!(dropped, vec!["git".to_string(), "docker".to_string()]);
    }

    #[test]
    fn test_default_install_preset() {
        let selection = Selection::default_install();
        assert_eq!(selection.theme(), "spaceship");
        assert_eq!(selection.plugins().len(), 14);
        assert!(selection.has_plugin("zsh-syntax-highlighting"));
        assert_eq!(selection.alias_mode(), AliasMode::Default);
    }

    #[test]
    fn test_validate_rejects_quotes() {
        let (selection, _) = Selection::new(
            "my\"theme",
            Vec::<String>::new(),
            AliasMode::Default,
            FunctionMode::Default,
        );
        assert!(selection.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_flag_like_plugin() {
        let (selection, _) = Selection::new(
            "agnoster",
            ["--upload-pack=evil"],
            AliasMode::Default,
            FunctionMode::Default,
        );
        assert!(selection.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_registry_identifiers() {
        assert!(Selection::default_install().validate().is_ok());
        assert!(validate_identifier("docker-compose").is_ok());
        assert!(validate_identifier("zsh_z.v2").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_theme() {
        let (selection, _) = Selection::new(
            "  ",
            ["git"],
            AliasMode::Default,
            FunctionMode::Default,
        );
        assert!(selection.validate().is_err());
    }
}
