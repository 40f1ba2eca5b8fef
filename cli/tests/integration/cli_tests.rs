//! Integration tests for the CLI skeleton: help, version, global flags.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::helpers::{Sandbox, stdout_json};

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    Sandbox::new()
        .isovpc()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reachable only through SSM"));
}

#[test]
fn test_cli_help_lists_every_command() {
    let assert = Sandbox::new().isovpc().arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for cmd in [
        "synth", "check", "diff", "deploy", "destroy", "outputs", "connect", "config", "version",
    ] {
        assert!(out.contains(cmd), "help is missing {cmd}:\n{out}");
    }
}

#[test]
fn test_cli_version_flag_shows_version() {
    Sandbox::new()
        .isovpc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("isovpc"));
}

#[test]
fn test_version_command_shows_version() {
    Sandbox::new()
        .isovpc()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "isovpc {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let assert = Sandbox::new()
        .isovpc()
        .args(["version", "--json"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_is_usage_error() {
    Sandbox::new()
        .isovpc()
        .arg("provision")
        .assert()
        .code(2);
}

#[test]
fn test_invalid_region_flag_fails_with_source() {
    Sandbox::new()
        .isovpc()
        .args(["synth", "--region", "moon-base"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("--region"));
}

#[test]
fn test_json_errors_are_structured() {
    let assert = Sandbox::new()
        .isovpc()
        .args(["--json", "config", "set", "network.nat", "1"])
        .assert()
        .code(1);
    let value = stdout_json(assert.get_output());
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "config_error");
    assert!(
        value["message"]
            .as_str()
            .expect("message")
            .contains("network.nat")
    );
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let assert = Sandbox::new()
        .isovpc()
        .args(["-vv", "synth"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"));
    stdout_json(assert.get_output());
}
