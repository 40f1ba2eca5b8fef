//! Integration tests for `isovpc config` command.
//!
//! All filesystem-touching tests set `ISOVPC_CONFIG` to a temp path so they
//! never read or write `~/.isovpc/config.yaml`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::helpers::{Sandbox, stdout_json};

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    Sandbox::new()
        .isovpc()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    Sandbox::new()
        .isovpc()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PrivateVpcConnectionStack"))
        .stdout(predicate::str::contains("10.0.0.0/16"))
        .stdout(predicate::str::contains("t2.micro"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_config_show_displays_env_var_label() {
    Sandbox::new()
        .isovpc()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ISOVPC_CONFIG"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let sandbox = Sandbox::new();
    sandbox.isovpc().args(["config", "show"]).assert().success();
    assert!(!sandbox.config_path().exists());
}

#[test]
fn test_config_set_persists_value() {
    let sandbox = Sandbox::new();
    sandbox
        .isovpc()
        .args(["config", "set", "stack.region", "eu-west-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set stack.region = eu-west-2"));

    let raw = std::fs::read_to_string(sandbox.config_path()).expect("config written");
    assert!(raw.contains("eu-west-2"), "{raw}");

    let assert = sandbox
        .isovpc()
        .args(["config", "show", "--json"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["config"]["stack"]["region"], "eu-west-2");
}

#[cfg(unix)]
#[test]
fn test_config_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let sandbox = Sandbox::new();
    sandbox
        .isovpc()
        .args(["config", "set", "instance.type", "t3.nano"])
        .assert()
        .success();
    let mode = std::fs::metadata(sandbox.config_path())
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_config_set_unknown_key_fails() {
    Sandbox::new()
        .isovpc()
        .args(["config", "set", "network.nat_gateways", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown setting"));
}

#[test]
fn test_config_set_invalid_values_fail() {
    let sandbox = Sandbox::new();
    for (key, value) in [
        ("network.cidr", "10.0.0.0/8"),
        ("network.cidr", "10.0.0.1/16"),
        ("network.max_azs", "7"),
        ("stack.region", "nowhere"),
        ("instance.type", "huge"),
        ("instance.image", "ubuntu"),
        ("stack.name", "1stack"),
    ] {
        sandbox
            .isovpc()
            .args(["config", "set", key, value])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid value"));
    }
    assert!(!sandbox.config_path().exists());
}

#[test]
fn test_config_malformed_file_names_path() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.config_path(), "stack: [unclosed").expect("write");
    sandbox
        .isovpc()
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config.yaml"));
}
