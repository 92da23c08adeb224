//! CLI smoke tests for the iam-preflight binary.
//!
//! Only commands that never touch AWS are exercised here; the audit itself
//! is covered by the offline flow tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("iam-preflight").unwrap();
    cmd.env("NO_COLOR", "1");
    // Keep the host's config files out of the test.
    cmd.env("IAM_PREFLIGHT_CONFIG", "/nonexistent/iam-preflight.toml");
    cmd
}

#[test]
fn test_help() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Preflight check for AWS IAM permissions"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("list-actions"));
}

#[test]
fn test_version() {
    bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iam-preflight"));
}

#[test]
fn test_list_actions_contains_defaults() {
    bin()
        .arg("list-actions")
        .assert()
        .success()
        .stdout(predicate::str::contains("ec2:RunInstances"))
        .stdout(predicate::str::contains("iam:PassRole"))
        .stdout(predicate::str::contains("s3:CreateBucket"));
}

#[test]
fn test_list_actions_json_output() {
    bin()
        .args(["--output", "json", "list-actions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ec2:RunInstances\""));
}

#[test]
fn test_list_actions_with_extra_requirements() {
    bin()
        .args(["list-actions", "--require", "kms:CreateKey"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kms:CreateKey"));
}

#[test]
fn test_completions_bash() {
    bin()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iam-preflight"));
}

#[test]
fn test_unknown_flag_fails() {
    bin().arg("--definitely-not-a-flag").assert().failure();
}
