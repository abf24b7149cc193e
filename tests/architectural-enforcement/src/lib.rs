//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code outside backoff
//! - The session core stays free of UI dependencies
//!
//! The helpers here locate the workspace and yield the production part of
//! each source file (everything before its `#[cfg(test)]` module).

use std::fs;
use std::path::{Path, PathBuf};

/// Root of the workspace, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A production source file, relative path plus its non-test lines
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Lines before the first `#[cfg(test)]`
    pub lines: Vec<String>,
}

/// Collect every `.rs` file under `dir` (relative to the workspace root)
pub fn production_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let base = root.join(dir);
    assert!(base.exists(), "missing source directory {}", base.display());

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(&base)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
    {
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let path = entry
            .path()
            .strip_prefix(&root)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(SourceFile {
            path,
            lines: production_lines(&content),
        });
    }
    files
}

/// Lines of `content` up to the test module, with `//` comments stripped
pub fn production_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|line| line.split("//").next().unwrap_or(line).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n// note\n#[cfg(test)]\nmod tests {}\n";
        assert_eq!(production_lines(content), vec!["fn a() {}", ""]);
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
