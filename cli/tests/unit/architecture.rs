//! Structural tests for layer boundary enforcement.
//!
//! These scan source files so the domain stays pure and the application
//! layer never reaches into infrastructure or presentation.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-comment lines outside `#[cfg(test)]` blocks, with 1-based numbers.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            (!in_test && !trimmed.starts_with("//")).then(|| (i + 1, line.to_string()))
        })
        .collect()
}

fn src(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(dir)
}

fn violations(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (lineno, line) in production_lines(&file) {
            for needle in forbidden {
                if line.contains(needle) {
                    found.push(format!("{rel}:{lineno}: `{needle}`: {}", line.trim()));
                }
            }
        }
    }
    found
}

#[test]
fn domain_is_pure() {
    let found = violations(
        &src("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
            "println!",
        ],
    );
    assert!(found.is_empty(), "domain/ must stay pure:\n{}", found.join("\n"));
}

#[test]
fn application_does_not_import_infra_or_presentation() {
    let found = violations(
        &src("application"),
        &["crate::infra", "crate::commands", "crate::output", "println!"],
    );
    assert!(
        found.is_empty(),
        "application/ must only use domain and ports:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let found = violations(
        &src("infra"),
        &["crate::commands", "crate::output", "println!", "eprintln!"],
    );
    assert!(
        found.is_empty(),
        "infra/ must not import from commands/ or output/ or print:\n{}",
        found.join("\n")
    );
}

#[test]
fn only_infra_and_app_construct_concrete_adapters() {
    let mut found = Vec::new();
    for dir in ["commands", "application", "domain", "output"] {
        found.extend(violations(
            &src(dir),
            &["TokioCommandRunner::", "AwsCliEngine::", "YamlConfigStore"],
        ));
    }
    assert!(
        found.is_empty(),
        "concrete adapters belong in infra/ and app.rs:\n{}",
        found.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let found = violations(&src("commands"), &["json: bool", "serde_json::"]);
    assert!(
        found.is_empty(),
        "commands/ must render through app.renderer():\n{}",
        found.join("\n")
    );
}

#[test]
fn command_handlers_accept_app_context() {
    let mut missing = Vec::new();
    for file in collect_rs_files(&src("commands")) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let has_run = content.contains("pub fn run(") || content.contains("pub async fn run(");
        if has_run && !content.contains("app: &AppContext") {
            missing.push(file.display().to_string());
        }
    }
    assert!(
        missing.is_empty(),
        "command handlers must take `app: &AppContext`:\n{}",
        missing.join("\n")
    );
}
