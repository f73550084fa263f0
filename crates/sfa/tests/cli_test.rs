//! Integration tests for the `sfa` CLI binary.
//!
//! None of these need a running engine: argument parsing, help output,
//! completions, config management, and the error path when the endpoint
//! never comes up.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sfa` binary with env isolation.
///
/// Clears the `SFA_*` variables the CLI reads and points config
/// directories at a nonexistent path.
fn sfa_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sfa");
    cmd.env("HOME", "/tmp/sfa-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/sfa-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/sfa-cli-test-nonexistent")
        .env_remove("SFA_ENDPOINT")
        .env_remove("SFA_CONFIG")
        .env_remove("SFA_STATUS_INTERVAL_MS")
        .env_remove("SFA_DYNAMIC_NOTIFICATION")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a config whose retry schedule gives up within a few milliseconds.
fn write_fast_retry_config(path: &Path, endpoint: &str) {
    std::fs::write(
        path,
        format!(
            "endpoint = \"{endpoint}\"\n\
             \n\
             [retry]\n\
             max_attempts = 2\n\
             base_delay_ms = 1\n\
             step_ms = 1\n"
        ),
    )
    .unwrap();
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sfa_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    sfa_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("groups"))
            .and(predicate::str::contains("clash-mode"))
            .and(predicate::str::contains("notify")),
    );
}

#[test]
fn test_version_flag() {
    sfa_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sfa"));
}

#[test]
fn test_completions_bash() {
    sfa_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_count_must_be_positive() {
    sfa_cmd()
        .args(["groups", "--count", "0"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_bad_interval_rejected() {
    sfa_cmd()
        .args(["status", "--interval", "soon"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_invalid_endpoint_is_usage_error() {
    sfa_cmd()
        .args(["--endpoint", "carrier-pigeon", "status"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("carrier-pigeon"));
}

// ── Config management ───────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    sfa_cmd()
        .args(["--config", "/tmp/somewhere/sfa.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/somewhere/sfa.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let path_arg = path.to_str().unwrap();

    sfa_cmd()
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    sfa_cmd()
        .args(["--config", path_arg, "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("status_interval_ms = 2000")
                .and(predicate::str::contains("max_attempts = 10")),
        );

    sfa_cmd()
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    sfa_cmd()
        .args(["--config", path_arg, "config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_json_reflects_endpoint_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let output = sfa_cmd()
        .args([
            "--config",
            path.to_str().unwrap(),
            "--endpoint",
            "tcp:127.0.0.1:9090",
            "--output",
            "json",
            "config",
            "show",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["endpoint"], "tcp:127.0.0.1:9090");
    assert_eq!(value["retry"]["step_ms"], 50);
}

// ── Engine unavailable ──────────────────────────────────────────────

#[test]
fn test_unreachable_engine_exits_with_connection_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let socket = dir.path().join("missing.sock");
    write_fast_retry_config(&config, &format!("unix:{}", socket.display()));

    sfa_cmd()
        .args(["--config", config.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("sfa::connection_failed"));
}

#[test]
fn test_env_overrides_retry_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let socket = dir.path().join("missing.sock");
    write_fast_retry_config(&config, &format!("unix:{}", socket.display()));

    sfa_cmd()
        .env("SFA_RETRY__MAX_ATTEMPTS", "1")
        .args(["--config", config.to_str().unwrap(), "log"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("sfa::connection_failed"));
}
