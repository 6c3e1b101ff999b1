//! Configuration synthesizer: [`Selection`] → `.zshrc` text.
//!
//! Rendering is template concatenation, nothing more. The output is a pure
//! function of the selection:
//!
//! - the `plugins=(...)` line follows the selection's plugin order
//! - every conditional block depends only on set membership (which plugins
//!   are present, which theme is chosen) and blocks always appear in the
//!   fixed order of [`BLOCKS`]
//!
//! Identifiers are interpolated verbatim. Call [`Selection::validate`] first
//! for anything that did not come from the registry.

use std::fmt::Write as _;

use crate::selection::{dedup_preserving_order, Selection};
use crate::types::{AliasMode, FunctionMode};

const PREAMBLE: &str = r#"# ==============================
#   Oh-My-Zsh Configuration
# ==============================

export ZSH="$HOME/.oh-my-zsh""#;

const FRAMEWORK: &str = r#"source $ZSH/oh-my-zsh.sh

export PATH="$HOME/bin:/usr/local/bin:$PATH"
if [[ $(uname -m) == 'arm64' ]]; then
    export PATH="/opt/homebrew/bin:$PATH"
else
    export PATH="/usr/local/bin:$PATH"
fi"#;

/// When a conditional block is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Any of these plugins is selected
    AnyPlugin(&'static [&'static str]),
    /// The selected theme is exactly this one
    Theme(&'static str),
}

impl Guard {
    pub fn matches(&self, selection: &Selection) -> bool {
        match self {
            Self::AnyPlugin(plugins) => plugins.iter().any(|p| selection.has_plugin(p)),
            Self::Theme(theme) => selection.theme() == *theme,
        }
    }
}

/// A self-contained chunk of configuration text
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub name: &'static str,
    pub guard: Guard,
    pub body: &'static str,
}

impl Block {
    /// Comment line opening the block in the generated file
    pub fn header(&self) -> String {
        format!("# --- {} ---", self.name)
    }
}

/// Conditional blocks, in output order
pub const BLOCKS: &[Block] = &[
    Block {
        name: "Docker",
        guard: Guard::AnyPlugin(&["docker", "docker-compose"]),
        body: r#"export PATH="$PATH:/Applications/Docker.app/Contents/Resources/bin/"
alias dcu='docker compose up -d'
alias dcd='docker compose down'
alias dcl='docker compose logs -f'
alias dex='docker exec -it'"#,
    },
    Block {
        name: "Kubernetes",
        guard: Guard::AnyPlugin(&["kubectl"]),
        body: r#"alias k='kubectl'
alias kgp='kubectl get pods'
alias kgs='kubectl get services'
alias kctx='kubectl config use-context'"#,
    },
    Block {
        name: "Terraform",
        guard: Guard::AnyPlugin(&["terraform"]),
        body: r#"alias tf='terraform'
alias tfp='terraform plan'
alias tfa='terraform apply'"#,
    },
    Block {
        name: "NVM",
        guard: Guard::AnyPlugin(&["nvm"]),
        body: r#"export NVM_DIR="$HOME/.nvm"
[ -s "$NVM_DIR/nvm.sh" ] && \. "$NVM_DIR/nvm.sh"
[ -s "$NVM_DIR/bash_completion" ] && \. "$NVM_DIR/bash_completion""#,
    },
    Block {
        name: "VS Code",
        guard: Guard::AnyPlugin(&["vscode"]),
        body: r#"export PATH="$PATH:/Applications/Visual Studio Code.app/Contents/Resources/app/bin""#,
    },
    Block {
        name: "fzf",
        guard: Guard::AnyPlugin(&["fzf"]),
        body: r#"[ -f ~/.fzf.zsh ] && source ~/.fzf.zsh"#,
    },
    Block {
        name: "thefuck",
        guard: Guard::AnyPlugin(&["thefuck"]),
        body: r#"eval $(thefuck --alias)"#,
    },
    Block {
        name: "Powerlevel10k",
        guard: Guard::Theme("powerlevel10k"),
        body: r#"[[ ! -f ~/.p10k.zsh ]] || source ~/.p10k.zsh"#,
    },
    Block {
        name: "Starship",
        guard: Guard::Theme("starship"),
        body: r#"eval "$(starship init zsh)""#,
    },
];

const DEFAULT_ALIASES: &str = r#"# --- Aliases ---
alias ll='ls -la'
alias gs='git status'
alias ..='cd ..'
alias la='ls -A'
alias h='history'
alias reload='source ~/.zshrc'"#;

const CUSTOM_ALIASES: &str = r#"# --- Aliases ---
alias ll='ls -la'
alias gs='git status'
alias ..='cd ..'
alias la='ls -A'
alias h='history'
alias reload='source ~/.zshrc'

alias dps='docker ps'
alias dstop='docker stop $(docker ps -a -q)'
alias drm='docker rm $(docker ps -a -q)'
alias dimages='docker images'
alias dbuild='docker build -t'

alias ga='git add'
alias gc='git commit'
alias gp='git push'
alias gco='git checkout'
alias gb='git branch'"#;

const DEFAULT_FUNCTIONS: &str = r#"# --- Functions ---
cl() { cd "$1" && ls }
mkcd() { mkdir -p "$1" && cd "$1" }"#;

const CUSTOM_FUNCTIONS: &str = r#"# --- Functions ---
cl() { cd "$1" && ls }
mkcd() { mkdir -p "$1" && cd "$1" }
duf() { du -sh "$1" 2>/dev/null }"#;

fn alias_text(mode: AliasMode) -> &'static str {
    match mode {
        AliasMode::Default => DEFAULT_ALIASES,
        AliasMode::Custom => CUSTOM_ALIASES,
    }
}

fn function_text(mode: FunctionMode) -> &'static str {
    match mode {
        FunctionMode::Default => DEFAULT_FUNCTIONS,
        FunctionMode::Custom => CUSTOM_FUNCTIONS,
    }
}

/// The `plugins=(...)` line; repeated identifiers are dropped, first one wins.
pub fn plugin_line(selection: &Selection) -> String {
    let (plugins, _) = dedup_preserving_order(selection.plugins().iter().cloned());
    format!("plugins=({})", plugins.join(" "))
}

/// The `ZSH_THEME="..."` line, theme interpolated verbatim.
pub fn theme_line(selection: &Selection) -> String {
    format!("ZSH_THEME=\"{}\"", selection.theme())
}

/// Conditional blocks that fire for this selection, in output order
pub fn active_blocks(selection: &Selection) -> Vec<&'static Block> {
    BLOCKS.iter().filter(|b| b.guard.matches(selection)).collect()
}

/// Render the complete configuration file text.
pub fn render(selection: &Selection) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}\n", PREAMBLE);
    let _ = writeln!(out, "{}\n", plugin_line(selection));
    let _ = writeln!(out, "{}\n", theme_line(selection));
    let _ = writeln!(out, "{}\n", FRAMEWORK);

    for block in active_blocks(selection) {
        let _ = writeln!(out, "{}\n{}\n", block.header(), block.body);
    }

    let _ = writeln!(out, "{}\n", alias_text(selection.alias_mode()));
    let _ = writeln!(out, "{}", function_text(selection.function_mode()));

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(theme: &str, plugins: &[&str]) -> Selection {
        Selection::new(
            theme,
            plugins.iter().copied(),
            AliasMode::Default,
            FunctionMode::Default,
        )
        .0
    }

    #[test]
    fn test_plugin_line_keeps_order() {
        let s = selection("robbyrussell", &["zsh-autosuggestions", "git", "fzf"]);
        assert_eq!(plugin_line(&s), "plugins=(zsh-autosuggestions git fzf)");
    }

    #[test]
    fn test_empty_plugin_line() {
        let s = selection("robbyrussell", &[]);
        assert_eq!(plugin_line(&s), "plugins=()");
    }

    #[test]
    fn test_theme_line() {
        let s = selection("agnoster", &[]);
        assert_eq!(theme_line(&s), "ZSH_THEME=\"agnoster\"");
    }

    #[test]
    fn test_blocks_follow_fixed_order() {
        let s = selection("starship", &["nvm", "kubectl", "docker-compose"]);
        let names: Vec<&str> = active_blocks(&s).iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Docker", "Kubernetes", "NVM", "Starship"]);
    }

    #[test]
    fn test_output_is_trimmed() {
        let text = render(&selection("robbyrussell", &["git"]));
        assert!(text.starts_with("# ===="));
        assert!(!text.ends_with('\n'));
        assert!(text.ends_with("mkcd() { mkdir -p \"$1\" && cd \"$1\" }"));
    }

    #[test]
    fn test_framework_sourced_after_plugins_and_theme() {
        let text = render(&selection("robbyrussell", &["git"]));
        let plugins_at = text.find("plugins=(").unwrap();
        let theme_at = text.find("ZSH_THEME=").unwrap();
        let source_at = text.find("source $ZSH/oh-my-zsh.sh").unwrap();
        assert!(plugins_at < source_at);
        assert!(theme_at < source_at);
    }

    #[test]
    fn test_custom_modes_select_custom_text() {
        let s = Selection::new(
            "robbyrussell",
            ["git"],
            AliasMode::Custom,
            FunctionMode::Custom,
        )
        .0;
        let text = render(&s);
        assert!(text.contains("alias gco='git checkout'"));
        assert!(text.contains("duf() {"));

        let text = render(&selection("robbyrussell", &["git"]));
        assert!(!text.contains("alias gco='git checkout'"));
        assert!(!text.contains("duf() {"));
    }
}
