//! Integration tests for the deepchall CLI.
//!
//! Run with: `cargo test --package deepchall-cli --test cli_integration`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the deepchall CLI with given arguments.
fn run_deepchall(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deepchall"))
        .args(args)
        .output()
        .expect("Failed to execute deepchall command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Write a run configuration into `dir`.
fn write_config(dir: &Path, contents: &str) -> String {
    let path = dir.join("run.json");
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().to_string()
}

const SMALL_RUN: &str = r#"{
    "langs": {
        "bounded": { "lang": "toy_cfg", "max_depth": 3, "max_length": 4, "test_samples": 20 },
        "unbounded": { "lang": "toy_cfg", "max_depth": 3 }
    },
    "nets": { "ngram": { "net": "markov", "order": 3 } }
}"#;

// =============================================================================
// Show Command Tests
// =============================================================================

#[test]
fn test_show_backends() {
    let output = run_deepchall(&["show", "backends"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("fsm"));
    assert!(out.contains("cfg"));
    assert!(out.contains("(1, LENGTH)"));
}

#[test]
fn test_show_langs_lists_presets_and_params() {
    let output = run_deepchall(&["show", "langs"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for name in ["toy_fsm", "toy_cfg", "parity_fsm", "dyck_cfg"] {
        assert!(out.contains(name), "missing {name} in:\n{out}");
    }
    assert!(out.contains("max_depth"));
    assert!(out.contains("alphabet=3"));
}

#[test]
fn test_show_nets() {
    let output = run_deepchall(&["show", "nets"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("markov"));
    assert!(out.contains("uniform"));
    assert!(out.contains("order"));
}

#[test]
fn test_show_requires_target() {
    let output = run_deepchall(&["show"]);
    assert!(!output.status.success());
}

// =============================================================================
// Sample Command Tests
// =============================================================================

#[test]
fn test_sample_fsm_in_bfs_order() {
    let output = run_deepchall(&["sample", "toy_fsm", "-n", "4"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(lines, vec!["[]", "[0]", "[0]", "[0, 0]"]);
}

#[test]
fn test_sample_cfg_with_overrides() {
    let output = run_deepchall(&["sample", "toy_cfg", "--set", "max_depth=3", "-n", "10"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(lines, vec!["[0, 0, 1, 1]", "[0, 1]", "[]"]);
}

#[test]
fn test_sample_max_length() {
    let output = run_deepchall(&["sample", "parity_fsm", "--max-length", "2", "-n", "100"]);
    assert!(output.status.success());
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    // "", "0", "00", "11"
    assert_eq!(lines.len(), 4);
    assert!(lines.contains(&"[1, 1]".to_string()));
}

#[test]
fn test_sample_dot() {
    let output = run_deepchall(&["sample", "toy_fsm", "--dot"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("digraph"));
    assert!(out.contains("s0"));
}

#[test]
fn test_sample_dot_unsupported_for_grammars() {
    let output = run_deepchall(&["sample", "toy_cfg", "--dot"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no graph export"));
}

#[test]
fn test_sample_unknown_language() {
    let output = run_deepchall(&["sample", "klingon"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("klingon"));
}

#[test]
fn test_sample_bad_override() {
    let output = run_deepchall(&["sample", "toy_cfg", "--set", "max_depth"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("key=value"));
}

// =============================================================================
// Run Command Tests
// =============================================================================

#[test]
fn test_run_reports_each_pair() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), SMALL_RUN);

    let output = run_deepchall(&["run", &config]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("bounded x ngram"));
    assert!(out.contains("20/20"));
    assert!(out.contains("unbounded x ngram"));
    assert!(out.contains("failed"));
    assert!(out.contains("2 runs, 1 failed"));
}

#[test]
fn test_run_json_output() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), SMALL_RUN);

    let output = run_deepchall(&["run", &config, "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = value.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["lang"], "bounded");
    assert_eq!(reports[0]["stats"]["correct_generated"], 20);
    assert_eq!(reports[0]["stats"]["training_samples_used"], 3);
    assert!(reports[1]["error"].as_str().unwrap().contains("max_length"));
}

#[test]
fn test_run_rejects_invalid_config() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), r#"{ "langs": { "a": { "lang": "toy_fsm" } } }"#);

    let output = run_deepchall(&["run", &config]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing 'nets'"));
}

#[test]
fn test_run_rejects_unknown_preset() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        r#"{ "langs": { "a": { "lang": "toy_fsm" } }, "nets": { "b": { "net": "gpt" } } }"#,
    );

    let output = run_deepchall(&["run", &config]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("gpt"));
}

#[test]
fn test_run_missing_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.json");
    let output = run_deepchall(&["run", &missing.to_string_lossy()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.json"));
}
