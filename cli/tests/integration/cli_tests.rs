//! Integration tests for CLI structure and argument parsing

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::helpers::clusterfiles;

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    clusterfiles()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Install local files and URLs"));
}

#[test]
fn test_cli_help_lists_commands() {
    clusterfiles()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_version_command_shows_version() {
    clusterfiles()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "clusterfiles ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = clusterfiles()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    clusterfiles().arg("destroy").assert().failure();
}

#[test]
fn test_missing_config_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    clusterfiles()
        .current_dir(dir.path())
        .arg("plan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read cluster.yaml"));
}

#[test]
fn test_config_env_var_is_used() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("elsewhere.yaml");
    std::fs::write(&path, "spec:\n  hosts:\n    - ssh:\n        address: h1\n").expect("write");
    clusterfiles()
        .env("CLUSTERFILES_CONFIG", &path)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("no host has files to upload"));
}

#[test]
fn test_json_error_object_on_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = clusterfiles()
        .current_dir(dir.path())
        .args(["plan", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["error"], true);
    assert!(
        v["message"]
            .as_str()
            .is_some_and(|m| m.contains("cannot read")),
        "got: {v}"
    );
}
