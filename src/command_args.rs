//! Type-safe external command contracts.
//!
//! Instead of formatting shell strings, every external command lazyzsh runs is
//! a struct implementing [`CommandArgs`]. The runner never goes through a shell,
//! so identifiers and paths are passed as separate arguments.

use std::path::PathBuf;

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name resolved through `PATH` (e.g. "git").
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `display()`: the human-readable command line used in logs and dry-run output.
///
/// # Example
///
/// ```
/// use lazyzsh::command_args::{CommandArgs, GitCloneArgs};
/// use std::path::PathBuf;
///
/// let args = GitCloneArgs::shallow(
///     "https://github.com/junegunn/fzf.git",
///     PathBuf::from("/home/me/.oh-my-zsh/custom/plugins/fzf"),
/// );
/// assert_eq!(args.program(), "git");
/// assert_eq!(args.to_cli_args()[0], "clone");
/// ```
pub trait CommandArgs {
    /// Executable to spawn.
    fn program(&self) -> &'static str;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Directory the command creates on success, if any.
    fn output_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Full command line for logs.
    fn display(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.to_cli_args());
        parts.join(" ")
    }
}

// ============================================================================
// git clone
// ============================================================================

/// Arguments for `git clone`.
///
/// | Rust Field | CLI Flag    | Notes |
/// |------------|-------------|-------|
/// | `depth`    | `--depth=N` | Omitted for a full clone |
/// | `url`      | positional  | Repository URL |
/// | `target`   | positional  | Destination directory |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCloneArgs {
    pub url: String,
    pub target: PathBuf,
    pub depth: Option<u32>,
}

impl GitCloneArgs {
    /// A `--depth=1` clone, used for every plugin and theme.
    pub fn shallow(url: impl Into<String>, target: PathBuf) -> Self {
        Self {
            url: url.into(),
            target,
            depth: Some(1),
        }
    }
}

impl CommandArgs for GitCloneArgs {
    fn program(&self) -> &'static str {
        "git"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if let Some(depth) = self.depth {
            args.push(format!("--depth={}", depth));
        }
        args.push(self.url.clone());
        args.push(self.target.display().to_string());
        args
    }

    fn output_dir(&self) -> Option<PathBuf> {
        Some(self.target.clone())
    }
}

// ============================================================================
// brew install --cask
// ============================================================================

/// Arguments for `brew install --cask <cask>`, used for Nerd Fonts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrewCaskArgs {
    pub cask: String,
}

impl BrewCaskArgs {
    pub fn new(cask: impl Into<String>) -> Self {
        Self { cask: cask.into() }
    }
}

impl CommandArgs for BrewCaskArgs {
    fn program(&self) -> &'static str {
        "brew"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "install".to_string(),
            "--cask".to_string(),
            self.cask.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_clone_args() {
        let args = GitCloneArgs::shallow(
            "https://github.com/romkatv/powerlevel10k.git",
            PathBuf::from("/home/u/.oh-my-zsh/custom/themes/powerlevel10k"),
        );
        assert_eq!(
            args.to_cli_args(),
            vec![
                "clone",
                "--depth=1",
                "https://github.com/romkatv/powerlevel10k.git",
                "/home/u/.oh-my-zsh/custom/themes/powerlevel10k",
            ]
        );
    }

    #[test]
    fn test_full_clone_has_no_depth_flag() {
        let args = GitCloneArgs {
            url: "https://github.com/nvm-sh/nvm.git".to_string(),
            target: PathBuf::from("/tmp/nvm"),
            depth: None,
        };
        let cli_args = args.to_cli_args();
        assert_eq!(cli_args.len(), 3);
        assert!(!cli_args.iter().any(|a| a.starts_with("--depth")));
    }

    #[test]
    fn test_brew_cask_display() {
        let args = BrewCaskArgs::new("font-hack-nerd-font");
        assert_eq!(args.program(), "brew");
        assert_eq!(args.display(), "brew install --cask font-hack-nerd-font");
    }
}
