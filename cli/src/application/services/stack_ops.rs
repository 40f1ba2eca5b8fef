//! Application service: use-cases that talk to the provisioning engine.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::collections::BTreeMap;
use std::process::ExitStatus;

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, StackEngine, StackTarget};
use crate::application::services::synth::synthesize;
use crate::domain::error::EngineError;
use crate::domain::stack::{INSTANCE_ID_OUTPUT, StackSpec};

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub stack: String,
    pub instance_id: String,
    pub outputs: BTreeMap<String, String>,
}

#[must_use]
pub fn target_of(spec: &StackSpec) -> StackTarget {
    StackTarget {
        name: spec.name().to_string(),
        region: spec.region().clone(),
    }
}

/// Synthesize, verify and deploy the stack.
///
/// A template that fails reachability analysis is never handed to the engine.
///
/// # Errors
///
/// Returns an error if synthesis or analysis fails, or the engine reports
/// a failure.
pub async fn deploy(
    engine: &impl StackEngine,
    spec: &StackSpec,
    reporter: &impl ProgressReporter,
) -> Result<DeployOutcome> {
    let synthesis = synthesize(spec, reporter)?;
    anyhow::ensure!(
        synthesis.report.passed(),
        "refusing to deploy: template failed reachability analysis\n  {}",
        synthesis.report.collect_issues().join("\n  ")
    );

    let target = target_of(spec);
    reporter.step(&format!("deploying {}...", target.name));
    tracing::info!(stack = %target.name, region = %target.region, "deploying stack");
    engine.deploy(&target, &synthesis.template).await?;

    let outputs = engine.outputs(&target).await?;
    let instance_id = instance_id_from(&target, &outputs)?;
    reporter.success(&format!("{} deployed", target.name));
    Ok(DeployOutcome {
        stack: target.name,
        instance_id,
        outputs,
    })
}

/// Delete the stack.
///
/// # Errors
///
/// Returns an error if the engine fails to delete the stack.
pub async fn destroy(
    engine: &impl StackEngine,
    target: &StackTarget,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("destroying {}...", target.name));
    tracing::info!(stack = %target.name, "destroying stack");
    engine.destroy(target).await?;
    reporter.success(&format!("{} destroyed", target.name));
    Ok(())
}

/// Outputs of the deployed stack.
///
/// # Errors
///
/// Returns an error if the stack does not exist or cannot be described.
pub async fn outputs(
    engine: &impl StackEngine,
    target: &StackTarget,
) -> Result<BTreeMap<String, String>> {
    engine.outputs(target).await
}

/// Open a session on the stack's instance.
///
/// # Errors
///
/// Returns an error if the stack has no instance output or the session
/// client cannot be started.
pub async fn connect(
    engine: &impl StackEngine,
    target: &StackTarget,
    reporter: &impl ProgressReporter,
) -> Result<ExitStatus> {
    let outputs = engine.outputs(target).await?;
    let instance_id = instance_id_from(target, &outputs)?;
    reporter.step(&format!("starting session on {instance_id}..."));
    tracing::info!(instance_id, "opening session");
    engine
        .open_session(target, &instance_id)
        .await
        .with_context(|| format!("opening session on {instance_id}"))
}

fn instance_id_from(target: &StackTarget, outputs: &BTreeMap<String, String>) -> Result<String> {
    outputs.get(INSTANCE_ID_OUTPUT).cloned().ok_or_else(|| {
        EngineError::MissingOutput {
            stack: target.name.clone(),
            output: INSTANCE_ID_OUTPUT.to_string(),
        }
        .into()
    })
}
