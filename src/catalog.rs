//! Components that ship with the local Oh My Zsh checkout.
//!
//! The registry only lists the components the wizard offers up front. The
//! "Find more..." entry lists everything else the framework bundles:
//! `$ZSH/plugins/<id>/` directories and `$ZSH/themes/<id>.zsh-theme` files.
//! Bundled components need no fetching.

use std::fs;

use tracing::debug;

use crate::error::Result;
use crate::paths::{Layout, THEME_EXTENSION};
use crate::selection::validate_identifier;
use crate::types::ComponentKind;

/// Sorted identifiers of one kind bundled with the framework.
///
/// A missing framework checkout means there is nothing bundled. Names that
/// are not valid identifiers are skipped.
pub fn bundled(layout: &Layout, kind: ComponentKind) -> Result<Vec<String>> {
    let dir = layout.bundled_dir(kind);
    if !dir.is_dir() {
        debug!("No bundled {}s at {}", kind, dir.display());
        return Ok(Vec::new());
    }

    let mut identifiers = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();

        let identifier = match kind {
            ComponentKind::Plugin if path.is_dir() => path.file_name(),
            ComponentKind::Theme
                if path.is_file()
                    && path.extension().map(|e| e == THEME_EXTENSION).unwrap_or(false) =>
            {
                path.file_stem()
            }
            _ => None,
        };
        let Some(identifier) = identifier.and_then(|n| n.to_str()) else {
            continue;
        };
        if validate_identifier(identifier).is_ok() {
            identifiers.push(identifier.to_string());
        }
    }

    identifiers.sort();
    debug!("Found {} bundled {}(s) in {}", identifiers.len(), kind, dir.display());
    Ok(identifiers)
}

/// Whether the framework checkout ships this component
pub fn is_bundled(layout: &Layout, kind: ComponentKind, identifier: &str) -> bool {
    let path = layout.bundled_component(kind, identifier);
    match kind {
        ComponentKind::Plugin => path.is_dir(),
        ComponentKind::Theme => path.is_file(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn framework(home: &TempDir) -> Layout {
        let layout = Layout::from_home(home.path());
        for plugin in ["aws", "golang", "rust"] {
            fs::create_dir_all(layout.bundled_component(ComponentKind::Plugin, plugin)).unwrap();
        }
        fs::create_dir_all(layout.bundled_dir(ComponentKind::Theme)).unwrap();
        for theme in ["bira", "af-magic"] {
            fs::write(layout.bundled_component(ComponentKind::Theme, theme), "PROMPT='%# '").unwrap();
        }
        layout
    }

    #[test]
    fn test_lists_plugin_directories_sorted() {
        let home = TempDir::new().unwrap();
        let layout = framework(&home);
        fs::write(layout.bundled_dir(ComponentKind::Plugin).join("README.md"), "x").unwrap();

        assert_eq!(
            bundled(&layout, ComponentKind::Plugin).unwrap(),
            vec!["aws", "golang", "rust"]
        );
    }

    #[test]
    fn test_lists_theme_files_without_extension() {
        let home = TempDir::new().unwrap();
        let layout = framework(&home);
        fs::write(layout.bundled_dir(ComponentKind::Theme).join("notes.txt"), "x").unwrap();

        assert_eq!(
            bundled(&layout, ComponentKind::Theme).unwrap(),
            vec!["af-magic", "bira"]
        );
    }

    #[test]
    fn test_invalid_names_are_skipped() {
        let home = TempDir::new().unwrap();
        let layout = framework(&home);
        fs::create_dir_all(layout.bundled_dir(ComponentKind::Plugin).join("has space")).unwrap();
        fs::create_dir_all(layout.bundled_dir(ComponentKind::Plugin).join(".hidden")).unwrap();

        let plugins = bundled(&layout, ComponentKind::Plugin).unwrap();
        assert_eq!(plugins, vec!["aws", "golang", "rust"]);
    }

    #[test]
    fn test_missing_framework_is_empty() {
        let home = TempDir::new().unwrap();
        let layout = Layout::from_home(home.path());
        assert!(bundled(&layout, ComponentKind::Theme).unwrap().is_empty());
        assert!(!is_bundled(&layout, ComponentKind::Plugin, "aws"));
    }

    #[test]
    fn test_is_bundled_checks_kind_specific_path() {
        let home = TempDir::new().unwrap();
        let layout = framework(&home);
        assert!(is_bundled(&layout, ComponentKind::Plugin, "golang"));
        assert!(is_bundled(&layout, ComponentKind::Theme, "bira"));
        assert!(!is_bundled(&layout, ComponentKind::Theme, "golang"));
    }
}
