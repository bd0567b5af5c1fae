// crates/phase-readiness-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests that run the phase-readiness binary.
// Purpose: Ensure commands succeed on good input and fail closed on bad input.
// Dependencies: phase-readiness-cli binary, phase-readiness-config, tempfile
// ============================================================================

//! ## Overview
//! Runs the compiled binary against temporary config and sample files and
//! checks exit status, stdout, and stderr.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use phase_readiness_config::CONFIG_ENV_VAR;
use phase_readiness_config::PhaseReadinessConfig;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn phase_readiness_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_phase-readiness"))
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(phase_readiness_bin())
        .args(args)
        .current_dir(dir.path())
        .env_remove(CONFIG_ENV_VAR)
        .output()
        .expect("run phase-readiness")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_lines(text: &str) -> Vec<Value> {
    text.lines().map(|line| serde_json::from_str(line).expect("json line")).collect()
}

fn audit_lines(path: &Path) -> Vec<Value> {
    json_lines(&fs::read_to_string(path).expect("read audit log"))
}

const SAMPLES: &str = "\
{\"t_s\":0.0,\"temp_c\":25.0,\"valid\":true}
{\"t_s\":0.5,\"temp_c\":25.0,\"valid\":true}
{\"t_s\":1.0,\"temp_c\":25.0,\"valid\":true}
";

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies the version flag prints the crate version.
#[test]
fn version_flag_prints_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

/// Verifies the example config round-trips through validation.
#[test]
fn config_example_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["config", "example"]);
    assert!(output.status.success());
    PhaseReadinessConfig::from_toml(&stdout(&output)).expect("example validates");
}

/// Verifies config check accepts a valid file.
#[test]
fn config_check_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "ok.toml", "[engine]\newma_alpha = 0.3\n");
    let output = run(&dir, &["config", "check", "--config", &path]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Config OK"));
}

/// Verifies config check falls back to defaults with no file present.
#[test]
fn config_check_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["config", "check"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("defaults"));
}

/// Verifies config check fails closed on invalid values.
#[test]
fn config_check_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "bad.toml", "[engine]\newma_alpha = 2.0\n");
    let output = run(&dir, &["config", "check", "--config", &path]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("engine.ewma_alpha"));
}

/// Verifies config check fails closed on unknown keys.
#[test]
fn config_check_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "unknown.toml", "[engine]\nwarp_factor = 9\n");
    let output = run(&dir, &["config", "check", "--config", &path]);
    assert!(!output.status.success());
}

/// Verifies replay emits one verdict per line and fails bad lines safe.
#[test]
fn replay_emits_one_record_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir,
        "samples.jsonl",
        "{\"t_s\":0.0,\"temp_c\":25.0,\"valid\":true}\n\
         garbage\n\
         {\"t_s\":1.0,\"temp_c\":25.0,\"valid\":true}\n",
    );
    let output = run(&dir, &["replay", "--input", &input]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let records = json_lines(&stdout(&output));
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["gate"], "BLOCK");
    assert_eq!(records[1]["line"], 2);
    assert!(records[1]["t_s"].is_null());
    assert_eq!(records[1]["gate"], "BLOCK");
    assert_eq!(records[1]["reasons"], serde_json::json!(["input_invalid", "failsafe_default"]));
    assert_eq!(records[2]["gate"], "ALLOW");
    assert_eq!(records[2]["readiness"], 1.0);
    assert!(stderr(&output).contains("Line 2"));
}

/// Verifies replay reads samples from stdin when no input is given.
#[test]
fn replay_reads_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(phase_readiness_bin())
        .arg("replay")
        .current_dir(dir.path())
        .env_remove(CONFIG_ENV_VAR)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn replay");
    child.stdin.take().unwrap().write_all(SAMPLES.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(json_lines(&stdout(&output)).len(), 3);
}

/// Verifies serve publishes samples, audits, and exits at end of input.
#[test]
fn serve_exits_on_eof_and_audits_transitions() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let config = format!(
        "[server]\nbind_address = \"127.0.0.1\"\nport = 0\n\n[audit]\npath = \"{}\"\n",
        audit_path.display()
    );
    let config_path = write(&dir, "serve.toml", &config);
    let input = write(&dir, "samples.jsonl", SAMPLES);

    let output =
        run(&dir, &["serve", "--config", &config_path, "--input", &input, "--exit-on-eof"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let log = stderr(&output);
    assert!(log.contains("Serving phase readiness on http://127.0.0.1:"));
    assert!(log.contains("after 3 samples"));

    let events = audit_lines(&audit_path);
    let kinds: Vec<&str> = events.iter().filter_map(|event| event["event"].as_str()).collect();
    assert_eq!(kinds.first(), Some(&"api_lifecycle"));
    assert_eq!(kinds.last(), Some(&"api_lifecycle"));
    let transitions: Vec<(&Value, &Value)> = events
        .iter()
        .filter(|event| event["event"] == "gate_transition")
        .map(|event| (&event["from"], &event["to"]))
        .collect();
    assert_eq!(transitions.len(), 2);
    assert!(transitions[0].0.is_null());
    assert_eq!(transitions[0].1, "BLOCK");
    assert_eq!(transitions[1].1, "ALLOW");
}

/// Verifies serve fails before reading input when the port is unusable.
#[test]
fn serve_rejects_invalid_bind_address() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write(&dir, "bad.toml", "[server]\nbind_address = \"localhost\"\n");
    let input = write(&dir, "samples.jsonl", SAMPLES);
    let output =
        run(&dir, &["serve", "--config", &config_path, "--input", &input, "--exit-on-eof"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("server.bind_address"));
}

/// Verifies a missing input file is reported.
#[test]
fn replay_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["replay", "--input", "does-not-exist.jsonl"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does-not-exist.jsonl"));
}
