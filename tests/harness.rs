//! Golden-file test harness for typeless.
//!
//! Discovers `.input.ts`, `.input.tsx` and `.input.vue` files under
//! `tests/fixtures/`, runs the full pipeline (erase → prune → splice for
//! containers), and compares output against the corresponding
//! `.expected.*` file (`.expected.js`, `.expected.jsx`, `.expected.vue`).
//!
//! Set `TL_UPDATE_FIXTURES=1` to overwrite expected files with actual output.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tl_common::SourceKind;
use tl_pipeline::{Options, Output};

const INPUT_SUFFIXES: &[(&str, &str)] = &[
    (".input.ts", ".expected.js"),
    (".input.tsx", ".expected.jsx"),
    (".input.vue", ".expected.vue"),
];

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/tl_test/, so go up two levels to workspace root.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !dir.exists() {
        return files;
    }
    for entry in walkdir(dir) {
        let name = entry.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if INPUT_SUFFIXES.iter().any(|(suffix, _)| name.ends_with(suffix)) {
            files.push(entry);
        }
    }
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

fn expected_path(input: &Path) -> PathBuf {
    let name = input.to_str().unwrap();
    for (suffix, replacement) in INPUT_SUFFIXES {
        if name.ends_with(suffix) {
            return PathBuf::from(name.replace(suffix, replacement));
        }
    }
    unreachable!("collect_input_files only yields known suffixes");
}

fn run_pipeline(source: &str, filename: &str) -> Result<Output> {
    let kind = SourceKind::from_extension(filename)?;
    Ok(tl_pipeline::process(source, filename, kind, &Options::default())?)
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files = collect_input_files(&fixtures);

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("TL_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let expected_path = expected_path(input_path);
        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap()
            .display()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read input: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let actual = match run_pipeline(&source, &filename) {
            Ok(out) => out.text,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if update_mode {
            if let Err(e) = std::fs::write(&expected_path, &actual) {
                failures.push(format!("{test_name}: failed to write expected: {e}"));
            }
            continue;
        }

        if !expected_path.exists() {
            failures.push(format!(
                "{test_name}: missing expected file: {}",
                expected_path.display()
            ));
            continue;
        }

        let expected = match std::fs::read_to_string(&expected_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read expected: {e}"));
                continue;
            }
        };
        if actual.trim() != expected.trim() {
            failures.push(format!(
                "{test_name}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

/// Every script output must still be syntactically valid under the
/// dialect it was stripped for.
#[test]
fn outputs_reparse() {
    let fixtures = fixtures_dir();
    let mut failures = Vec::new();

    for input_path in collect_input_files(&fixtures) {
        let name = input_path.file_name().unwrap().to_str().unwrap().to_string();
        if name.ends_with(".input.vue") {
            continue;
        }

        let source = match std::fs::read_to_string(&input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{name}: failed to read: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let output = match run_pipeline(&source, &filename) {
            Ok(out) => out.text,
            Err(e) => {
                failures.push(format!("{name}: pipeline failed: {e}"));
                continue;
            }
        };

        let dialect = match SourceKind::from_extension(&filename) {
            Ok(SourceKind::Script(dialect)) => dialect,
            _ => continue,
        };
        if let Err(e) = tl_parse::parse_module(&output, &format!("{name}.output"), dialect) {
            failures.push(format!(
                "{name}: output does not reparse: {e}\n--- output ---\n{}",
                output.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} reparse test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}
