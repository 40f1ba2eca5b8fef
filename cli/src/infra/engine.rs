//! `StackEngine` backed by the AWS CLI.
//!
//! Every call shells out through an injected `CommandRunner`, so tests can
//! drive the engine with canned `aws` responses.

use std::collections::BTreeMap;
use std::process::{ExitStatus, Output};

use anyhow::{Context, Result};
use isovpc_common::Template;
use serde::Deserialize;

use crate::application::ports::{CommandRunner, StackEngine, StackTarget};
use crate::domain::error::EngineError;
use crate::infra::command_runner::{STACK_OPERATION_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::template_tempfile;

/// The AWS CLI executable.
pub const AWS_CLI: &str = "aws";

/// The stack creates an IAM role, which the engine must be told it may do.
const CAPABILITIES: &str = "CAPABILITY_IAM";

pub struct AwsCliEngine<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> AwsCliEngine<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn aws(&self, target: &StackTarget, args: &[&str]) -> Result<Output> {
        let args = with_region(target, args);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.runner.run(AWS_CLI, &refs).await?;
        check_success(&refs, output)
    }

    /// Like `aws`, for calls that read an existing stack: a missing stack is
    /// reported as [`EngineError::StackNotFound`].
    async fn aws_lookup(&self, target: &StackTarget, args: &[&str]) -> Result<Output> {
        let args = with_region(target, args);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.runner.run(AWS_CLI, &refs).await?;
        if !output.status.success()
            && String::from_utf8_lossy(&output.stderr).contains("does not exist")
        {
            return Err(EngineError::StackNotFound(target.name.clone()).into());
        }
        check_success(&refs, output)
    }

    async fn aws_long(&self, target: &StackTarget, args: &[&str]) -> Result<Output> {
        let args = with_region(target, args);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout(AWS_CLI, &refs, STACK_OPERATION_TIMEOUT)
            .await?;
        check_success(&refs, output)
    }
}

impl AwsCliEngine<TokioCommandRunner> {
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

fn with_region(target: &StackTarget, args: &[&str]) -> Vec<String> {
    let mut all: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    if let Some(region) = target.region.known() {
        all.push("--region".to_string());
        all.push(region.to_string());
    }
    all
}

fn check_success(args: &[&str], output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let command = format!("{AWS_CLI} {}", args.iter().take(2).copied().collect::<Vec<_>>().join(" "));
    Err(EngineError::CommandFailed { command, stderr }.into())
}

impl<R: CommandRunner> StackEngine for AwsCliEngine<R> {
    async fn deploy(&self, target: &StackTarget, template: &Template) -> Result<()> {
        let file = template_tempfile(template)?;
        let path = file.path().to_string_lossy().into_owned();
        self.aws_long(
            target,
            &[
                "cloudformation",
                "deploy",
                "--template-file",
                &path,
                "--stack-name",
                &target.name,
                "--capabilities",
                CAPABILITIES,
                "--no-fail-on-empty-changeset",
            ],
        )
        .await?;
        Ok(())
    }

    async fn destroy(&self, target: &StackTarget) -> Result<()> {
        self.aws(
            target,
            &["cloudformation", "delete-stack", "--stack-name", &target.name],
        )
        .await?;
        self.aws_long(
            target,
            &[
                "cloudformation",
                "wait",
                "stack-delete-complete",
                "--stack-name",
                &target.name,
            ],
        )
        .await?;
        Ok(())
    }

    async fn outputs(&self, target: &StackTarget) -> Result<BTreeMap<String, String>> {
        let output = self
            .aws_lookup(
                target,
                &[
                    "cloudformation",
                    "describe-stacks",
                    "--stack-name",
                    &target.name,
                    "--output",
                    "json",
                ],
            )
            .await?;
        parse_outputs(&target.name, &output.stdout)
    }

    async fn deployed_template(&self, target: &StackTarget) -> Result<Template> {
        let output = self
            .aws_lookup(
                target,
                &[
                    "cloudformation",
                    "get-template",
                    "--stack-name",
                    &target.name,
                    "--output",
                    "json",
                ],
            )
            .await?;
        parse_template_body(&output.stdout)
    }

    async fn open_session(&self, target: &StackTarget, instance_id: &str) -> Result<ExitStatus> {
        let args = with_region(target, &["ssm", "start-session", "--target", instance_id]);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run_status(AWS_CLI, &refs).await
    }
}

// ── Response parsing ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeStacks {
    #[serde(default)]
    stacks: Vec<StackDescription>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackDescription {
    #[serde(default)]
    outputs: Vec<StackOutput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackOutput {
    output_key: String,
    output_value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetTemplate {
    template_body: serde_json::Value,
}

fn parse_outputs(stack: &str, stdout: &[u8]) -> Result<BTreeMap<String, String>> {
    let described: DescribeStacks =
        serde_json::from_slice(stdout).context("unexpected describe-stacks response")?;
    let description = described
        .stacks
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::StackNotFound(stack.to_string()))?;
    Ok(description
        .outputs
        .into_iter()
        .map(|o| (o.output_key, o.output_value))
        .collect())
}

/// The body comes back as an object for JSON templates and as a string
/// when the stack was deployed from a text body.
fn parse_template_body(stdout: &[u8]) -> Result<Template> {
    let response: GetTemplate =
        serde_json::from_slice(stdout).context("unexpected get-template response")?;
    let template = match response.template_body {
        serde_json::Value::String(body) => Template::from_json(&body)?,
        body => serde_json::from_value(body)?,
    };
    Ok(template)
}
