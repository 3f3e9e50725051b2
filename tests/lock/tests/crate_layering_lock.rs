//! Build-graph and time-source isolation.
//!
//! Verifies that:
//! 1. `kernel/` references neither the ledger nor the harness
//! 2. `ledger/` does not reference the harness
//! 3. Wall-clock reads happen only in `harness/src/clock.rs`

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// `(file, line, text)` for every non-comment line containing a pattern.
fn scan(dir: &Path, patterns: &[&str], skip: &[&str]) -> Vec<(String, usize, String)> {
    let mut violations = Vec::new();
    walk(dir, &mut |path| {
        let display = path.display().to_string();
        if skip.iter().any(|s| display.ends_with(s)) {
            return;
        }
        let Ok(content) = fs::read_to_string(path) else {
            return;
        };
        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if patterns.iter().any(|p| trimmed.contains(p)) {
                violations.push((display.clone(), line_no + 1, line.to_string()));
            }
        }
    });
    violations
}

fn walk(dir: &Path, visit: &mut dyn FnMut(&Path)) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, visit);
        } else if path.extension().is_some_and(|e| e == "rs") {
            visit(&path);
        }
    }
}

fn report(violations: &[(String, usize, String)]) -> String {
    let mut msg = String::new();
    for (file, line, text) in violations {
        let _ = writeln!(msg, "  {file}:{line}: {}", text.trim());
    }
    msg
}

#[test]
fn kernel_depends_on_nothing_above_it() {
    let root = workspace_root();
    let v = scan(&root.join("kernel/src"), &["custody_ledger", "custody_harness"], &[]);
    assert!(v.is_empty(), "kernel references upper layers:\n{}", report(&v));
    let manifest = fs::read_to_string(root.join("kernel/Cargo.toml")).unwrap();
    assert!(!manifest.contains("custody-ledger") && !manifest.contains("custody-harness"));
}

#[test]
fn ledger_does_not_depend_on_harness() {
    let root = workspace_root();
    let v = scan(&root.join("ledger/src"), &["custody_harness"], &[]);
    assert!(v.is_empty(), "ledger references the harness:\n{}", report(&v));
}

#[test]
fn wall_clock_is_read_only_through_clock_module() {
    let root = workspace_root();
    let mut v = Vec::new();
    for krate in ["kernel/src", "ledger/src", "harness/src"] {
        v.extend(scan(
            &root.join(krate),
            &["Utc::now", "SystemTime::now", "Local::now"],
            &["harness/src/clock.rs"],
        ));
    }
    assert!(v.is_empty(), "wall-clock reads outside clock.rs:\n{}", report(&v));
}
