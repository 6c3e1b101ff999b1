//! Tests for the configuration synthesizer
//!
//! These tests verify:
//! - The end-to-end rendering scenarios (docker selection, empty plugin list)
//! - Conditional block guards for plugins and themes
//! - Alias/function section selection

use lazyzsh::selection::Selection;
use lazyzsh::synth::{active_blocks, render, BLOCKS};
use lazyzsh::types::{AliasMode, FunctionMode};

fn selection(theme: &str, plugins: &[&str]) -> Selection {
    Selection::new(
        theme,
        plugins.iter().copied(),
        AliasMode::Default,
        FunctionMode::Default,
    )
    .0
}

fn count_lines_starting_with(text: &str, prefix: &str) -> usize {
    text.lines().filter(|l| l.starts_with(prefix)).count()
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[test]
fn test_robbyrussell_with_git_and_docker() {
    let text = render(&selection("robbyrussell", &["git", "docker"]));

    assert_eq!(count_lines_starting_with(&text, "plugins=("), 1);
    assert!(text.lines().any(|l| l == "plugins=(git docker)"));

    assert_eq!(count_lines_starting_with(&text, "ZSH_THEME="), 1);
    assert!(text.lines().any(|l| l == "ZSH_THEME=\"robbyrussell\""));

    assert!(text.contains("# --- Docker ---"));
    assert!(text.contains("alias dcu='docker compose up -d'"));
    assert!(!text.contains("# --- Kubernetes ---"));
    assert!(!text.contains("# --- Starship ---"));
    assert!(!text.contains("starship init zsh"));
}

#[test]
fn test_empty_plugin_list() {
    let s = selection("robbyrussell", &[]);
    let text = render(&s);

    assert!(text.lines().any(|l| l == "plugins=()"));
    assert!(active_blocks(&s).is_empty());
    for block in BLOCKS {
        assert!(
            !text.contains(&block.header()),
            "{} should not be rendered",
            block.name
        );
    }
}

// =============================================================================
// Guards
// =============================================================================

#[test]
fn test_docker_compose_alone_triggers_docker_block() {
    let text = render(&selection("robbyrussell", &["docker-compose"]));
    assert!(text.contains("# --- Docker ---"));
}

#[test]
fn test_docker_block_rendered_once_for_both_plugins() {
    let text = render(&selection("robbyrussell", &["docker", "docker-compose"]));
    assert_eq!(text.matches("# --- Docker ---").count(), 1);
}

#[test]
fn test_theme_blocks() {
    let text = render(&selection("starship", &[]));
    assert!(text.contains("eval \"$(starship init zsh)\""));
    assert!(!text.contains("p10k.zsh"));

    let text = render(&selection("powerlevel10k", &[]));
    assert!(text.contains("source ~/.p10k.zsh"));
    assert!(!text.contains("starship init zsh"));
}

#[test]
fn test_nvm_and_kubectl_blocks() {
    let text = render(&selection("agnoster", &["kubectl", "nvm"]));
    assert!(text.contains("alias k='kubectl'"));
    assert!(text.contains("export NVM_DIR=\"$HOME/.nvm\""));

    // Blocks keep their fixed order regardless of plugin order
    let kube = text.find("# --- Kubernetes ---").unwrap();
    let nvm = text.find("# --- NVM ---").unwrap();
    assert!(kube < nvm);
}

#[test]
fn test_blocks_ignore_plugin_order() {
    let a = render(&selection("robbyrussell", &["nvm", "kubectl", "fzf"]));
    let b = render(&selection("robbyrussell", &["fzf", "kubectl", "nvm"]));

    let strip = |t: &str| {
        t.lines()
            .filter(|l| !l.starts_with("plugins=("))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(&a), strip(&b));
    assert_ne!(a, b);
}

// =============================================================================
// Aliases and functions
// =============================================================================

#[test]
fn test_alias_and_function_sections_always_present() {
    let text = render(&selection("robbyrussell", &[]));
    assert_eq!(text.matches("# --- Aliases ---").count(), 1);
    assert_eq!(text.matches("# --- Functions ---").count(), 1);
    assert!(text.contains("alias reload='source ~/.zshrc'"));
}

#[test]
fn test_custom_aliases_default_functions() {
    let (s, _) = Selection::new(
        "robbyrussell",
        ["git"],
        AliasMode::Custom,
        FunctionMode::Default,
    );
    let text = render(&s);
    assert!(text.contains("alias gb='git branch'"));
    assert!(!text.contains("duf()"));
}

#[test]
fn test_render_has_no_surrounding_whitespace() {
    let text = render(&Selection::default_install());
    assert_eq!(text, text.trim());
}
