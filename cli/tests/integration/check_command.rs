//! Integration tests for `isovpc check`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;
use serde_json::{Value, json};

use crate::helpers::{Sandbox, read_json, stdout_json};

fn write_json(path: &std::path::Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).expect("serialize")).expect("write");
}

#[test]
fn test_check_synthesized_template_passes() {
    Sandbox::new()
        .isovpc()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("no-internet-path"))
        .stdout(predicate::str::contains("session-coupling"))
        .stdout(predicate::str::contains("instance-output"));
}

#[test]
fn test_check_json_lists_every_check() {
    let assert = Sandbox::new()
        .isovpc()
        .args(["check", "--json", "--region", "ap-south-1"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["passed"], true);
    assert_eq!(value["region"], "ap-south-1");
    let names: Vec<&str> = value["checks"]
        .as_array()
        .expect("checks")
        .iter()
        .map(|c| c["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        [
            "no-internet-path",
            "egress-self-only",
            "instance-placement",
            "instance-role",
            "endpoint-set",
            "private-dns",
            "session-coupling",
            "instance-output",
        ]
    );
}

#[test]
fn test_check_template_with_internet_gateway_fails() {
    let sandbox = Sandbox::new();
    let path = sandbox.synth_to("open.json", &[]);
    let mut template = read_json(&path);
    template["Resources"]["Igw"] = json!({ "Type": "AWS::EC2::InternetGateway" });
    write_json(&path, &template);

    sandbox
        .isovpc()
        .args(["check", "--template"])
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Igw is a AWS::EC2::InternetGateway"));
}

#[test]
fn test_check_template_with_dns_disabled_fails() {
    let sandbox = Sandbox::new();
    let path = sandbox.synth_to("nodns.json", &[]);
    let mut template = read_json(&path);
    for resource in template["Resources"]
        .as_object_mut()
        .expect("Resources")
        .values_mut()
    {
        if resource["Type"] == "AWS::EC2::VPCEndpoint" {
            resource["Properties"]["PrivateDnsEnabled"] = json!(false);
        }
    }
    write_json(&path, &template);

    let assert = sandbox
        .isovpc()
        .args(["--json", "check", "--template"])
        .arg(&path)
        .assert()
        .code(1);
    let value = stdout_json(assert.get_output());
    let dns = value["checks"]
        .as_array()
        .expect("checks")
        .iter()
        .find(|c| c["name"] == "private-dns")
        .expect("private-dns check");
    assert_eq!(dns["passed"], false);
}

#[test]
fn test_check_template_for_wrong_region_fails() {
    let sandbox = Sandbox::new();
    let path = sandbox.synth_to("east.json", &["--region", "us-east-1"]);
    sandbox
        .isovpc()
        .args(["check", "--region", "eu-west-3", "--template"])
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("endpoint-set"));
}

#[test]
fn test_check_missing_template_file_is_error() {
    let sandbox = Sandbox::new();
    sandbox
        .isovpc()
        .args(["check", "--template"])
        .arg(sandbox.file("nope.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.json"));
}
