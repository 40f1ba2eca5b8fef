//! Integration tests for `isovpc synth`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;
use serde_json::Value;

use crate::helpers::{Sandbox, read_json, stdout_json};

fn resources_of<'a>(template: &'a Value, kind: &str) -> Vec<&'a Value> {
    template["Resources"]
        .as_object()
        .expect("Resources")
        .values()
        .filter(|r| r["Type"] == kind)
        .collect()
}

#[test]
fn test_synth_prints_template_to_stdout() {
    let assert = Sandbox::new().isovpc().arg("synth").assert().success();
    let template = stdout_json(assert.get_output());

    assert_eq!(resources_of(&template, "AWS::EC2::VPC").len(), 1);
    assert_eq!(resources_of(&template, "AWS::EC2::Subnet").len(), 2);
    assert_eq!(resources_of(&template, "AWS::EC2::Instance").len(), 1);
    assert_eq!(resources_of(&template, "AWS::EC2::VPCEndpoint").len(), 3);
    assert!(resources_of(&template, "AWS::EC2::InternetGateway").is_empty());
    assert!(resources_of(&template, "AWS::EC2::NatGateway").is_empty());
    assert!(template["Outputs"]["InstanceId"]["Value"]["Ref"].is_string());
}

#[test]
fn test_synth_instance_is_t2_micro_with_ssm_role() {
    let assert = Sandbox::new().isovpc().arg("synth").assert().success();
    let template = stdout_json(assert.get_output());

    let instance = resources_of(&template, "AWS::EC2::Instance")[0];
    assert_eq!(instance["Properties"]["InstanceType"], "t2.micro");
    let role = resources_of(&template, "AWS::IAM::Role")[0];
    let policies = role["Properties"]["ManagedPolicyArns"].to_string();
    assert!(policies.contains("AmazonSSMManagedInstanceCore"), "{policies}");
}

#[test]
fn test_synth_with_region_bakes_service_names() {
    let assert = Sandbox::new()
        .isovpc()
        .args(["synth", "--region", "us-east-1"])
        .assert()
        .success();
    let template = stdout_json(assert.get_output());

    let mut names: Vec<String> = resources_of(&template, "AWS::EC2::VPCEndpoint")
        .iter()
        .map(|e| {
            assert_eq!(e["Properties"]["PrivateDnsEnabled"], true);
            e["Properties"]["ServiceName"]
                .as_str()
                .expect("literal service name")
                .to_string()
        })
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "com.amazonaws.us-east-1.ec2messages",
            "com.amazonaws.us-east-1.ssm",
            "com.amazonaws.us-east-1.ssmmessages",
        ]
    );
}

#[test]
fn test_synth_region_from_environment() {
    let sandbox = Sandbox::new();
    let assert = sandbox
        .isovpc()
        .arg("synth")
        .env("AWS_DEFAULT_REGION", "eu-north-1")
        .assert()
        .success();
    let raw = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(raw.contains("com.amazonaws.eu-north-1.ssm"));
}

#[test]
fn test_synth_out_writes_file_and_summarizes() {
    let sandbox = Sandbox::new();
    let path = sandbox.file("stack.template.json");
    sandbox
        .isovpc()
        .args(["synth", "--out"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("PrivateVpcConnectionStack"))
        .stdout(predicate::str::contains("IsolatedSubnet1"));

    let template = read_json(&path);
    assert_eq!(resources_of(&template, "AWS::EC2::VPCEndpoint").len(), 3);
}

#[test]
fn test_synth_follows_config() {
    let sandbox = Sandbox::new();
    for (key, value) in [("network.max_azs", "3"), ("network.cidr", "192.168.0.0/20")] {
        sandbox
            .isovpc()
            .args(["config", "set", key, value])
            .assert()
            .success();
    }
    let assert = sandbox.isovpc().arg("synth").assert().success();
    let template = stdout_json(assert.get_output());

    let subnets = resources_of(&template, "AWS::EC2::Subnet");
    assert_eq!(subnets.len(), 3);
    let vpc = resources_of(&template, "AWS::EC2::VPC")[0];
    assert_eq!(vpc["Properties"]["CidrBlock"], "192.168.0.0/20");
}

#[test]
fn test_synth_is_deterministic() {
    let sandbox = Sandbox::new();
    let first = sandbox.isovpc().arg("synth").output().expect("run");
    let second = sandbox.isovpc().arg("synth").output().expect("run");
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_synth_json_out_reports_summary() {
    let sandbox = Sandbox::new();
    let path = sandbox.file("t.json");
    let assert = sandbox
        .isovpc()
        .args(["--json", "synth", "--out"])
        .arg(&path)
        .assert()
        .success();
    let value = stdout_json(assert.get_output());
    assert_eq!(value["passed"], true);
    assert_eq!(value["stack"], "PrivateVpcConnectionStack");
    assert!(value["region"].is_null());
}
