//! Engine-facing use-cases against an in-memory engine.

#![allow(clippy::unwrap_used)]

use isovpc_cli::application::services::stack_ops;
use isovpc_cli::domain::config::IsovpcConfig;
use isovpc_cli::domain::endpoint::Region;
use isovpc_cli::domain::error::EngineError;
use isovpc_cli::domain::stack::StackSpec;
use isovpc_common::ResourceType;

use crate::mocks::{MemoryEngine, RecordingReporter};

fn spec() -> StackSpec {
    StackSpec::from_config(
        &IsovpcConfig::default(),
        Region::Known("eu-central-1".to_string()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_deploy_hands_checked_template_to_engine() {
    let engine = MemoryEngine::with_instance("i-0abc");
    let reporter = RecordingReporter::default();

    let outcome = stack_ops::deploy(&engine, &spec(), &reporter).await.unwrap();

    assert_eq!(outcome.stack, "PrivateVpcConnectionStack");
    assert_eq!(outcome.instance_id, "i-0abc");
    let deployed = engine.deployed.borrow();
    let (target, template) = deployed.as_ref().unwrap();
    assert_eq!(target.region, Region::Known("eu-central-1".to_string()));
    assert_eq!(template.resources_of(&ResourceType::Instance).count(), 1);
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn test_deploy_without_instance_output_fails() {
    let engine = MemoryEngine::default();
    let err = stack_ops::deploy(&engine, &spec(), &RecordingReporter::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::MissingOutput { output, .. }) if output == "InstanceId"
    ));
}

#[tokio::test]
async fn test_deploy_surfaces_engine_failure() {
    let engine = MemoryEngine {
        fail_deploy: Some("Rate exceeded".to_string()),
        ..MemoryEngine::default()
    };
    let err = stack_ops::deploy(&engine, &spec(), &RecordingReporter::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Rate exceeded"));
}

#[tokio::test]
async fn test_destroy_targets_named_stack() {
    let engine = MemoryEngine::default();
    let target = stack_ops::target_of(&spec());
    stack_ops::destroy(&engine, &target, &RecordingReporter::default())
        .await
        .unwrap();
    assert_eq!(*engine.destroyed.borrow(), ["PrivateVpcConnectionStack"]);
}

#[tokio::test]
async fn test_outputs_of_missing_stack_is_not_found() {
    let engine = MemoryEngine::default();
    let err = stack_ops::outputs(&engine, &stack_ops::target_of(&spec()))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::StackNotFound(_))
    ));
}

#[tokio::test]
async fn test_connect_opens_session_on_output_instance() {
    let engine = MemoryEngine::with_instance("i-0feed");
    let status = stack_ops::connect(
        &engine,
        &stack_ops::target_of(&spec()),
        &RecordingReporter::default(),
    )
    .await
    .unwrap();
    assert!(status.success());
    assert_eq!(*engine.sessions.borrow(), ["i-0feed"]);
}
