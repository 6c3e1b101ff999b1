//! Repository registry: component identifier → source URL.
//!
//! The registry is an immutable value built once and passed by reference to
//! whatever needs lookups, so tests can substitute their own table.
//!
//! A lookup distinguishes three cases:
//!
//! | Result                 | Meaning |
//! |------------------------|---------|
//! | `Resolution::Fetch`    | Known, lives in its own repository |
//! | `Resolution::BuiltIn`  | Known, ships with Oh My Zsh |
//! | `Resolution::Unknown`  | Not in the table at all |

use crate::types::ComponentKind;

/// One row of the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub identifier: String,
    pub kind: ComponentKind,
    /// `None` = built into the base distribution, nothing to fetch
    pub source_url: Option<String>,
    /// Homebrew cask of the Nerd Font the component renders best with
    pub font_cask: Option<String>,
}

impl RegistryEntry {
    pub fn fetched(kind: ComponentKind, identifier: &str, url: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            kind,
            source_url: Some(url.to_string()),
            font_cask: None,
        }
    }

    pub fn built_in(kind: ComponentKind, identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            kind,
            source_url: None,
            font_cask: None,
        }
    }

    pub fn with_font(mut self, cask: &str) -> Self {
        self.font_cask = Some(cask.to_string());
        self
    }
}

/// Outcome of a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Fetch(&'a str),
    BuiltIn,
    Unknown,
}

/// Static identifier → URL table, in presentation order
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    entries: Vec<RegistryEntry>,
}

impl RepositoryRegistry {
    /// Build a registry from explicit entries (later duplicates are ignored)
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            if registry.entry(entry.kind, &entry.identifier).is_none() {
                registry.entries.push(entry);
            }
        }
        registry
    }

    /// The plugins and themes offered by the wizard
    pub fn builtin() -> Self {
        use ComponentKind::{Plugin, Theme};

        Self::from_entries([
            // Plugins bundled with Oh My Zsh
            RegistryEntry::built_in(Plugin, "git"),
            RegistryEntry::fetched(Plugin, "git-flow", "https://github.com/nvie/gitflow.git"),
            RegistryEntry::built_in(Plugin, "npm"),
            RegistryEntry::fetched(Plugin, "nvm", "https://github.com/nvm-sh/nvm.git"),
            RegistryEntry::built_in(Plugin, "docker"),
            RegistryEntry::built_in(Plugin, "docker-compose"),
            RegistryEntry::built_in(Plugin, "kubectl"),
            RegistryEntry::fetched(Plugin, "terraform", "https://github.com/hashicorp/terraform.git"),
            RegistryEntry::built_in(Plugin, "vscode"),
            RegistryEntry::fetched(Plugin, "fzf", "https://github.com/junegunn/fzf.git"),
            RegistryEntry::fetched(Plugin, "z", "https://github.com/agkozak/zsh-z.git"),
            RegistryEntry::fetched(Plugin, "thefuck", "https://github.com/nvbn/thefuck.git"),
            RegistryEntry::fetched(
                Plugin,
                "zsh-autocomplete",
                "https://github.com/marlonrichert/zsh-autocomplete.git",
            ),
            RegistryEntry::fetched(
                Plugin,
                "zsh-autosuggestions",
                "https://github.com/zsh-users/zsh-autosuggestions.git",
            ),
            RegistryEntry::fetched(
                Plugin,
                "zsh-syntax-highlighting",
                "https://github.com/zsh-users/zsh-syntax-highlighting.git",
            ),
            // Themes
            RegistryEntry::built_in(Theme, "robbyrussell"),
            RegistryEntry::fetched(Theme, "powerlevel10k", "https://github.com/romkatv/powerlevel10k.git")
                .with_font("font-hack-nerd-font"),
            RegistryEntry::built_in(Theme, "agnoster").with_font("font-meslo-lg-nerd-font"),
            RegistryEntry::fetched(
                Theme,
                "spaceship",
                "https://github.com/spaceship-prompt/spaceship-prompt.git",
            )
            .with_font("font-firacode-nerd-font"),
            RegistryEntry::fetched(Theme, "starship", "https://github.com/starship/starship.git"),
        ])
    }

    pub fn entry(&self, kind: ComponentKind, identifier: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.identifier == identifier)
    }

    /// Look up where a component comes from
    pub fn resolve(&self, kind: ComponentKind, identifier: &str) -> Resolution<'_> {
        match self.entry(kind, identifier) {
            Some(RegistryEntry {
                source_url: Some(url),
                ..
            }) if !url.is_empty() => Resolution::Fetch(url),
            Some(_) => Resolution::BuiltIn,
            None => Resolution::Unknown,
        }
    }

    /// Identifiers of one kind, in registration order
    pub fn identifiers(&self, kind: ComponentKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.identifier.as_str())
    }

    pub fn font_cask(&self, kind: ComponentKind, identifier: &str) -> Option<&str> {
        self.entry(kind, identifier)
            .and_then(|e| e.font_cask.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contents() {
        let registry = RepositoryRegistry::builtin();
        assert_eq!(registry.identifiers(ComponentKind::Plugin).count(), 15);
        assert_eq!(registry.identifiers(ComponentKind::Theme).count(), 5);
        assert_eq!(
            registry.identifiers(ComponentKind::Theme).next(),
            Some("robbyrussell")
        );
    }

    #[test]
    fn test_resolve_distinguishes_builtin_from_unknown() {
        let registry = RepositoryRegistry::builtin();
        assert_eq!(
            registry.resolve(ComponentKind::Plugin, "fzf"),
            Resolution::Fetch("https://github.com/junegunn/fzf.git")
        );
        assert_eq!(
            registry.resolve(ComponentKind::Theme, "robbyrussell"),
            Resolution::BuiltIn
        );
        assert_eq!(
            registry.resolve(ComponentKind::Plugin, "nonexistent-plugin"),
            Resolution::Unknown
        );
    }

    #[test]
    fn test_resolve_is_scoped_by_kind() {
        let registry = RepositoryRegistry::builtin();
        assert_eq!(
            registry.resolve(ComponentKind::Theme, "fzf"),
            Resolution::Unknown
        );
    }

    #[test]
    fn test_empty_url_counts_as_builtin() {
        let registry = RepositoryRegistry::from_entries([RegistryEntry::fetched(
            ComponentKind::Theme,
            "legacy",
            "",
        )]);
        assert_eq!(
            registry.resolve(ComponentKind::Theme, "legacy"),
            Resolution::BuiltIn
        );
    }

    #[test]
    fn test_font_casks() {
        let registry = RepositoryRegistry::builtin();
        assert_eq!(
            registry.font_cask(ComponentKind::Theme, "powerlevel10k"),
            Some("font-hack-nerd-font")
        );
        assert_eq!(registry.font_cask(ComponentKind::Theme, "robbyrussell"), None);
    }

    #[test]
    fn test_duplicate_entries_keep_first() {
        let registry = RepositoryRegistry::from_entries([
            RegistryEntry::fetched(ComponentKind::Plugin, "fzf", "https://a.example/fzf.git"),
            RegistryEntry::fetched(ComponentKind::Plugin, "fzf", "https://b.example/fzf.git"),
        ]);
        assert_eq!(
            registry.resolve(ComponentKind::Plugin, "fzf"),
            Resolution::Fetch("https://a.example/fzf.git")
        );
    }
}
