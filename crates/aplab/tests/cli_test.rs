//! Integration tests for the `aplab` CLI binary.
//!
//! These tests validate argument parsing, help output, and error
//! handling -- all without requiring a physical AP or a chromedriver.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `aplab` binary with env isolation.
///
/// Clears all `APLAB_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn aplab_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("aplab");
    cmd.env("HOME", "/tmp/aplab-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/aplab-cli-test-nonexistent")
        .env_remove("APLAB_PROFILE");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = aplab_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    aplab_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("access points")
            .and(predicate::str::contains("read"))
            .and(predicate::str::contains("set-channel"))
            .and(predicate::str::contains("radio")),
    );
}

#[test]
fn test_version_flag() {
    aplab_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aplab"));
}

#[test]
fn test_unknown_subcommand_is_a_usage_error() {
    aplab_cmd().arg("frobnicate").assert().code(2);
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_set_channel_requires_interface_and_channel() {
    aplab_cmd().args(["set-channel", "2G"]).assert().code(2);
}

#[test]
fn test_set_channel_rejects_non_numeric_channel() {
    aplab_cmd()
        .args(["set-channel", "2G", "six"])
        .assert()
        .code(2);
}

#[test]
fn test_radio_state_must_be_on_or_off() {
    aplab_cmd()
        .args(["radio", "2G", "sideways"])
        .assert()
        .code(2);
}

#[test]
fn test_set_channel_help_mentions_bandwidth_flag() {
    aplab_cmd()
        .args(["set-channel", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bandwidth"));
}

// ── Missing configuration ───────────────────────────────────────────

#[test]
fn test_read_without_config_reports_missing_profile() {
    let output = aplab_cmd().arg("read").output().unwrap();
    assert_ne!(output.status.code(), Some(0));
    let text = combined_output(&output);
    assert!(
        text.contains("profile") || text.contains("Profile"),
        "Expected profile error in output:\n{text}"
    );
}

#[test]
fn test_unknown_profile_reports_available() {
    let output = aplab_cmd()
        .args(["--profile", "no-such-bench", "read"])
        .output()
        .unwrap();
    assert_ne!(output.status.code(), Some(0));
    let text = combined_output(&output);
    assert!(
        text.contains("no-such-bench"),
        "Expected profile name in output:\n{text}"
    );
}

// ── Destructive operations ──────────────────────────────────────────

#[test]
fn test_reset_requires_yes() {
    let output = aplab_cmd().arg("reset").output().unwrap();
    assert_ne!(output.status.code(), Some(0));
    let text = combined_output(&output);
    assert!(
        text.contains("--yes") || text.contains("confirmation"),
        "Expected confirmation error in output:\n{text}"
    );
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_prints_a_path() {
    aplab_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_password_rejects_empty_stdin() {
    aplab_cmd()
        .args(["config", "set-password"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty password"));
}
