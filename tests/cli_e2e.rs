//! End-to-end CLI tests for the drive-harvester binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn harvester() -> Command {
    let mut cmd = Command::cargo_bin("drive-harvester").unwrap();
    cmd.env_remove("DRIVE_ACCESS_TOKEN").env_remove("RUST_LOG");
    cmd
}

fn write_job(dir: &Path, scraping_complete: bool, index: &str) {
    let config = format!(
        "initial_blog_pages:\n  - https://blog.example.com/\nurl_pattern_filters: []\ndownload_dir: {}\nscraping_complete: {scraping_complete}\n",
        dir.join("downloads").display()
    );
    std::fs::write(dir.join("config.yaml"), config).unwrap();
    std::fs::write(dir.join("index.yaml"), index).unwrap();
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    harvester()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Harvest Google Drive files"))
        .stdout(predicate::str::contains("--keep-going"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    harvester()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("drive-harvester"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    harvester()
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// A completed job with an empty index has nothing to do and exits 0.
#[test]
fn test_binary_completed_job_with_empty_index_succeeds() {
    let temp = TempDir::new().unwrap();
    write_job(temp.path(), true, "[]\n");

    harvester()
        .arg("--config-dir")
        .arg(temp.path())
        .arg("--credentials")
        .arg(temp.path().join("no-such-credentials.json"))
        .env("DRIVE_ACCESS_TOKEN", "test-token")
        .assert()
        .success();
}

/// A missing config file is an unrecovered error.
#[test]
fn test_binary_missing_config_fails() {
    let temp = TempDir::new().unwrap();

    harvester()
        .arg("--config-dir")
        .arg(temp.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading job state"));
}

/// Without a credentials file or access token the run refuses to start.
#[test]
fn test_binary_without_credentials_fails() {
    let temp = TempDir::new().unwrap();
    write_job(temp.path(), true, "[]\n");

    harvester()
        .arg("--config-dir")
        .arg(temp.path())
        .arg("--credentials")
        .arg(temp.path().join("no-such-credentials.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Drive credentials"));
}

/// Out-of-range attempt counts are rejected by argument parsing.
#[test]
fn test_binary_rejects_zero_max_attempts() {
    harvester()
        .args(["--max-attempts", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max-attempts"));
}
