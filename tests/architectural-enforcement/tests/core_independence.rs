//! Integration Test: Core Independence
//!
//! **Policy**: `reelchat-core` holds all conversation logic and MUST NOT
//! depend on a UI framework. Surfaces depend on the core, never the reverse.
//! The core also never uses blocking HTTP.

use std::fs;

use architectural_enforcement::{production_sources, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm", "textwrap"];

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("core/Cargo.toml")).unwrap();

    let offenders: Vec<&str> = UI_CRATES
        .iter()
        .copied()
        .filter(|krate| {
            manifest.lines().map(str::trim_start).any(|line| {
                line.starts_with(&format!("{krate} ")) || line.starts_with(&format!("{krate}="))
            })
        })
        .collect();

    assert!(
        offenders.is_empty(),
        "core/Cargo.toml depends on UI crates: {offenders:?}"
    );
    assert!(
        !manifest.contains("reelchat-tui"),
        "core must not depend on the TUI"
    );
}

#[test]
fn test_core_sources_do_not_reference_ui_crates() {
    let mut violations = Vec::new();
    for file in production_sources("core/src") {
        for (idx, line) in file.lines.iter().enumerate() {
            if UI_CRATES.iter().any(|krate| line.contains(&format!("{krate}::")))
                || line.contains("reelchat_tui")
            {
                violations.push(format!("{}:{}", file.path.display(), idx + 1));
            }
        }
    }
    assert!(violations.is_empty(), "UI references in core: {violations:?}");
}

#[test]
fn test_no_blocking_http() {
    let mut violations = Vec::new();
    for dir in ["core/src", "tui/src"] {
        for file in production_sources(dir) {
            for (idx, line) in file.lines.iter().enumerate() {
                if line.contains("reqwest::blocking") {
                    violations.push(format!("{}:{}", file.path.display(), idx + 1));
                }
            }
        }
    }
    assert!(violations.is_empty(), "blocking HTTP in production code: {violations:?}");
}
