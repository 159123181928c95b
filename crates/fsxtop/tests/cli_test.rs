//! Integration tests for the `fsxtop` binary.
//!
//! Argument parsing, configuration layering and error exit codes, all
//! without reaching AWS: every case here fails or finishes before a
//! client is built.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

const NO_HOME: &str = "/tmp/fsxtop-cli-test-nonexistent";

/// `fsxtop` with AWS and `FSXTOP_*` variables cleared and the config
/// directory pointed somewhere empty.
fn fsxtop_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fsxtop");
    cmd.env("HOME", NO_HOME)
        .env("XDG_CONFIG_HOME", NO_HOME)
        .env_remove("AWS_REGION")
        .env_remove("AWS_DEFAULT_REGION")
        .env_remove("AWS_PROFILE")
        .env_remove("FSXTOP_CONFIG")
        .env_remove("FSXTOP_REGION")
        .env_remove("FSXTOP_REFRESH_INTERVAL")
        .env_remove("FSXTOP_METRIC_INTERVAL")
        .env_remove("FSXTOP_PAGE_SIZE")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fsxtop_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    fsxtop_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("FSx")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    fsxtop_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fsxtop"));
}

#[test]
fn test_completions_bash() {
    fsxtop_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_unknown_type_is_usage_error() {
    fsxtop_cmd()
        .args(["list", "--type", "NFS", "--region", "us-east-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NFS"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    fsxtop_cmd()
        .args(["config", "path", "--config", "/tmp/fsxtop-elsewhere.toml"])
        .assert()
        .success()
        .stdout("/tmp/fsxtop-elsewhere.toml\n");
}

#[test]
fn test_config_show_merges_file_and_flags() {
    let file = config_file("region = \"us-west-2\"\npage_size = 25\nsort = \"name=asc\"\n");
    fsxtop_cmd()
        .args(["config", "show", "--region", "eu-west-1", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("region = \"eu-west-1\"")
                .and(predicate::str::contains("page_size = 25"))
                .and(predicate::str::contains("sort = \"name=asc\""))
                .and(predicate::str::contains("refresh_interval = 300")),
        );
}

#[test]
fn test_config_show_reads_aws_env() {
    fsxtop_cmd()
        .env("AWS_DEFAULT_REGION", "ap-northeast-1")
        .env("FSXTOP_PAGE_SIZE", "7")
        .args(["config", "show", "--output", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"region\": \"ap-northeast-1\"")
                .and(predicate::str::contains("\"page_size\": 7")),
        );
}

#[test]
fn test_malformed_config_exits_3() {
    let file = config_file("refresh_interval = \"soon\"\n");
    fsxtop_cmd()
        .args(["config", "show", "--config"])
        .arg(file.path())
        .assert()
        .code(3);
}

// ── Validation before any AWS call ──────────────────────────────────

#[test]
fn test_missing_region_exits_2() {
    let output = fsxtop_cmd().arg("list").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Region is required"), "{text}");
}

#[test]
fn test_zero_interval_rejected() {
    fsxtop_cmd()
        .args(["list", "--region", "us-east-1", "--metric-interval", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("metric_interval"));
}

#[test]
fn test_show_requires_an_id() {
    fsxtop_cmd()
        .args(["show", "--region", "us-east-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file system id"));
}

#[test]
fn test_show_rejects_type_filter_from_config() {
    let file = config_file("region = \"us-east-1\"\nfile_system_type = \"ONTAP\"\n");
    fsxtop_cmd()
        .args(["show", "fs-0123456789abcdef0", "--config"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file_system_type"));
}
