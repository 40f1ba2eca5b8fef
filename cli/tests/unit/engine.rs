//! `AwsCliEngine` driven by a recording runner: argument shapes, timeouts
//! and error mapping.

#![allow(clippy::unwrap_used)]

use isovpc_cli::application::ports::{StackEngine, StackTarget};
use isovpc_cli::domain::config::IsovpcConfig;
use isovpc_cli::domain::endpoint::Region;
use isovpc_cli::domain::error::EngineError;
use isovpc_cli::domain::stack::StackSpec;
use isovpc_cli::infra::command_runner::STACK_OPERATION_TIMEOUT;
use isovpc_cli::infra::engine::AwsCliEngine;

use crate::mocks::{RecordingRunner, err_output, ok_output};

fn target(region: Region) -> StackTarget {
    StackTarget {
        name: "PrivateVpcConnectionStack".to_string(),
        region,
    }
}

fn east() -> StackTarget {
    target(Region::Known("us-east-1".to_string()))
}

const DESCRIBE: &[u8] = br#"{"Stacks": [{"StackName": "PrivateVpcConnectionStack",
    "Outputs": [{"OutputKey": "InstanceId", "OutputValue": "i-0123456789abcdef0"}]}]}"#;

#[tokio::test]
async fn test_deploy_passes_template_file_and_iam_capability() {
    let engine = AwsCliEngine::new(RecordingRunner::new());
    let template = StackSpec::from_config(&IsovpcConfig::default(), Region::Agnostic)
        .unwrap()
        .synthesize()
        .unwrap();

    engine.deploy(&east(), &template).await.unwrap();

    let runner = engine.runner();
    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.program, "aws");
    assert_eq!(&call.args[..2], ["cloudformation", "deploy"]);
    assert!(call.args.contains(&"CAPABILITY_IAM".to_string()));
    assert!(call.args.contains(&"--no-fail-on-empty-changeset".to_string()));
    assert_eq!(call.args[call.args.len() - 2..], ["--region", "us-east-1"]);
    assert_eq!(call.timeout, Some(STACK_OPERATION_TIMEOUT));
}

#[tokio::test]
async fn test_region_agnostic_target_omits_region_flag() {
    let engine = AwsCliEngine::new(RecordingRunner::new().reply("describe-stacks", ok_output(DESCRIBE)));
    engine.outputs(&target(Region::Agnostic)).await.unwrap();
    let lines = engine.runner().lines();
    assert!(!lines[0].contains("--region"), "{lines:?}");
}

#[tokio::test]
async fn test_outputs_parses_describe_stacks() {
    let engine = AwsCliEngine::new(RecordingRunner::new().reply("describe-stacks", ok_output(DESCRIBE)));
    let outputs = engine.outputs(&east()).await.unwrap();
    assert_eq!(outputs["InstanceId"], "i-0123456789abcdef0");
}

#[tokio::test]
async fn test_missing_stack_maps_to_stack_not_found() {
    let engine = AwsCliEngine::new(RecordingRunner::new().reply(
        "describe-stacks",
        err_output(b"An error occurred (ValidationError): Stack with id PrivateVpcConnectionStack does not exist"),
    ));
    let err = engine.outputs(&east()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::StackNotFound(name)) if name == "PrivateVpcConnectionStack"
    ));
}

#[tokio::test]
async fn test_missing_stack_on_get_template_maps_to_stack_not_found() {
    let engine = AwsCliEngine::new(RecordingRunner::new().reply(
        "get-template",
        err_output(b"An error occurred (ValidationError): Stack with id PrivateVpcConnectionStack does not exist"),
    ));
    let err = engine.deployed_template(&east()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::StackNotFound(_))
    ));
}

#[tokio::test]
async fn test_deploy_failure_mentioning_missing_resource_keeps_stderr() {
    let engine = AwsCliEngine::new(RecordingRunner::new().reply(
        "deploy",
        err_output(b"Parameter /aws/service/ami-amazon-linux-latest/x does not exist"),
    ));
    let template = isovpc_common::Template::new("t");
    let err = engine.deploy(&east(), &template).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::CommandFailed { stderr, .. }) if stderr.contains("ami-amazon-linux-latest/x does not exist")
    ));
}

#[tokio::test]
async fn test_wait_failure_keeps_stderr() {
    let engine = AwsCliEngine::new(RecordingRunner::new().reply(
        "stack-delete-complete",
        err_output(b"Waiter StackDeleteComplete failed: Stack with id x does not exist in DELETE_FAILED"),
    ));
    let err = engine.destroy(&east()).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("aws cloudformation wait"), "{msg}");
    assert!(msg.contains("Waiter StackDeleteComplete failed"), "{msg}");
}

#[tokio::test]
async fn test_other_failures_carry_stderr() {
    let engine = AwsCliEngine::new(
        RecordingRunner::new().reply("deploy", err_output(b"Unable to locate credentials")),
    );
    let template = isovpc_common::Template::new("t");
    let err = engine.deploy(&east(), &template).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("aws cloudformation deploy"), "{msg}");
    assert!(msg.contains("Unable to locate credentials"), "{msg}");
}

#[tokio::test]
async fn test_destroy_deletes_then_waits() {
    let engine = AwsCliEngine::new(RecordingRunner::new());
    engine.destroy(&east()).await.unwrap();
    let runner = engine.runner();
    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args[1], "delete-stack");
    assert_eq!(&calls[1].args[1..3], ["wait", "stack-delete-complete"]);
    assert_eq!(calls[1].timeout, Some(STACK_OPERATION_TIMEOUT));
}

#[tokio::test]
async fn test_deployed_template_reads_template_body() {
    let body = br#"{"TemplateBody": {"Resources": {"Vpc": {"Type": "AWS::EC2::VPC"}}}}"#;
    let engine = AwsCliEngine::new(RecordingRunner::new().reply("get-template", ok_output(body)));
    let template = engine.deployed_template(&east()).await.unwrap();
    assert!(template.resources.contains_key("Vpc"));
}

#[tokio::test]
async fn test_session_exit_status_is_passed_through() {
    let mut runner = RecordingRunner::new();
    runner.session_code = 2;
    let engine = AwsCliEngine::new(runner);
    let status = engine.open_session(&east(), "i-1").await.unwrap();
    assert_eq!(status.code(), Some(2));
}

#[tokio::test]
async fn test_open_session_inherits_terminal() {
    let engine = AwsCliEngine::new(RecordingRunner::new());
    let status = engine
        .open_session(&east(), "i-0123456789abcdef0")
        .await
        .unwrap();
    assert!(status.success());
    let runner = engine.runner();
    let calls = runner.calls.borrow();
    assert!(calls[0].interactive);
    assert_eq!(
        calls[0].args,
        ["ssm", "start-session", "--target", "i-0123456789abcdef0", "--region", "us-east-1"]
    );
}
