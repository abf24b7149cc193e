//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and core MUST NOT call sleep methods.
//! Timers go through `tokio::time::interval`, waiting goes through channels.
//! **Exception**: the delay between gateway retries (exponential backoff).

use architectural_enforcement::{production_sources, SourceFile};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();
    for dir in ["core/src", "tui/src"] {
        for file in production_sources(dir) {
            find_sleep_violations(&file, &mut violations);
        }
    }

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nAcceptable: exponential backoff between retries.");
        eprintln!("Use tokio::time::interval for periodic work and channels for waiting.");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

fn find_sleep_violations(file: &SourceFile, violations: &mut Vec<String>) {
    let lines: Vec<&str> = file.lines.iter().map(String::as_str).collect();

    for (idx, line) in lines.iter().enumerate() {
        if !(line.contains("::sleep(") || line.contains(".sleep(")) {
            continue;
        }
        if line.contains("std::thread::sleep") {
            violations.push(format!("{}:{} - blocking sleep", file.path.display(), idx + 1));
            continue;
        }
        if is_backoff_context(&lines, idx) {
            continue;
        }
        violations.push(format!(
            "{}:{} - {}",
            file.path.display(),
            idx + 1,
            line.trim()
        ));
    }
}

/// Check if sleep is used for exponential backoff (acceptable for retry logic)
fn is_backoff_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range =
        current_idx.saturating_sub(15)..std::cmp::min(current_idx + 5, lines.len());

    let mut has_backoff_calc = false;
    let mut has_retry_context = false;

    for line in &lines[context_range] {
        let line = line.to_lowercase();
        if line.contains("backoff_for_attempt") || line.contains("pow") || line.contains("<<") {
            has_backoff_calc = true;
        }
        if line.contains("retry") || line.contains("attempt") {
            has_retry_context = true;
        }
    }

    has_backoff_calc && has_retry_context
}

#[test]
fn test_backoff_detection() {
    let code = vec![
        "let delay = self.retry.backoff_for_attempt(attempt);",
        "tracing::warn!(\"retrying\");",
        "tokio::time::sleep(delay).await;",
    ];
    assert!(is_backoff_context(&code, 2));
}

#[test]
fn test_plain_sleep_is_flagged() {
    let file = SourceFile {
        path: "core/src/example.rs".into(),
        lines: vec![
            "async fn wait_for_reply() {".to_string(),
            "    tokio::time::sleep(Duration::from_millis(10)).await;".to_string(),
            "}".to_string(),
        ],
    };
    let mut violations = Vec::new();
    find_sleep_violations(&file, &mut violations);
    assert_eq!(violations.len(), 1);
}
