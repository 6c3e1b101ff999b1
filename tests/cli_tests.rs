//! End-to-end tests of the lazyzsh binary: exit codes and error reporting

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn lazyzsh(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lazyzsh"))
        .arg("--home")
        .arg(home.path())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("LAZYZSH_HOME")
        .output()
        .expect("Failed to run lazyzsh")
}

#[test]
fn test_fatal_error_is_reported_once() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing-selection.json");

    let output = lazyzsh(&home, &["apply", missing.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr.matches("missing-selection.json").count(),
        1,
        "stderr was: {}",
        stderr
    );
}

#[test]
fn test_backups_on_empty_home_completes() {
    let home = TempDir::new().unwrap();

    let output = lazyzsh(&home, &["backups"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("No backups found"));
}

#[test]
fn test_render_prints_without_writing() {
    let home = TempDir::new().unwrap();
    let selection = home.path().join("selection.json");
    fs::write(
        &selection,
        r#"{"theme":"robbyrussell","plugins":["git"],"alias_mode":"default","function_mode":"default"}"#,
    )
    .unwrap();

    let output = lazyzsh(&home, &["render", selection.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("plugins=(git)"));
    assert!(!home.path().join(".zshrc").exists());
}
