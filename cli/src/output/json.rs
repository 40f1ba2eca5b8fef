//! JSON output helpers.
//!
//! `JsonRenderer` backs every `--json` success path; `format_error` builds
//! the error object printed when a command fails.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::services::stack_ops::DeployOutcome;
use crate::application::services::synth::Synthesis;
use crate::domain::config::IsovpcConfig;
use crate::domain::diff::TemplateDiff;
use crate::domain::error::{ConfigError, EngineError, NetworkError};
use crate::domain::reachability::ReachabilityReport;
use crate::domain::stack::StackSpec;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice, `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable code for a failed command, from the innermost typed error.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return "config_error";
        }
        if cause.is::<NetworkError>() {
            return "network_error";
        }
        if let Some(engine) = cause.downcast_ref::<EngineError>() {
            return match engine {
                EngineError::StackNotFound(_) => "stack_not_found",
                EngineError::MissingOutput { .. } => "missing_output",
                EngineError::CommandFailed { .. } => "engine_error",
            };
        }
    }
    "error"
}

/// Renders results as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    fn print(value: &impl Serialize) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        Self::print(&serde_json::json!({ "version": version }))
    }

    /// Without `out` the template document itself is printed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_synth(
        &self,
        spec: &StackSpec,
        synthesis: &Synthesis,
        out: Option<&Path>,
    ) -> Result<()> {
        match out {
            None => Self::print(&synthesis.template),
            Some(path) => Self::print(&serde_json::json!({
                "stack": spec.name(),
                "region": spec.region().known(),
                "path": path.display().to_string(),
                "resources": synthesis.template.resources.len(),
                "passed": synthesis.report.passed(),
            })),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_check(&self, report: &ReachabilityReport) -> Result<()> {
        Self::print(&serde_json::json!({
            "passed": report.passed(),
            "region": report.region,
            "checks": report.checks,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_diff(&self, diff: &TemplateDiff) -> Result<()> {
        Self::print(&serde_json::json!({
            "changed": !diff.is_empty(),
            "resources": diff.resources,
            "outputs": diff.outputs,
            "parameters_changed": diff.parameters_changed,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_deploy(&self, outcome: &DeployOutcome) -> Result<()> {
        Self::print(&serde_json::json!({
            "stack": outcome.stack,
            "instance_id": outcome.instance_id,
            "outputs": outcome.outputs,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_outputs(&self, stack: &str, outputs: &BTreeMap<String, String>) -> Result<()> {
        Self::print(&serde_json::json!({ "stack": stack, "outputs": outputs }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_destroyed(&self, stack: &str) -> Result<()> {
        Self::print(&serde_json::json!({ "stack": stack, "destroyed": true }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(&self, config: &IsovpcConfig, path: &Path) -> Result<()> {
        Self::print(&serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        }))
    }
}
