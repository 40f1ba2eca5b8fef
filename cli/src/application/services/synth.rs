//! Application service: offline template use-cases: synthesize, check, diff.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};
use isovpc_common::Template;

use crate::application::ports::{ProgressReporter, TemplateFiles};
use crate::domain::diff::{TemplateDiff, diff};
use crate::domain::endpoint::Region;
use crate::domain::reachability::{ReachabilityReport, analyze};
use crate::domain::stack::StackSpec;

/// A synthesized template together with its reachability verdict.
#[derive(Debug)]
pub struct Synthesis {
    pub template: Template,
    pub report: ReachabilityReport,
}

/// Synthesize the stack and analyze the result.
///
/// # Errors
///
/// Returns an error if synthesis fails or the template cannot be analyzed.
pub fn synthesize(spec: &StackSpec, reporter: &impl ProgressReporter) -> Result<Synthesis> {
    reporter.step(&format!("synthesizing {}...", spec.name()));
    let template = spec.synthesize().context("synthesis failed")?;
    tracing::debug!(
        resources = template.resources.len(),
        region = %spec.region(),
        "template synthesized"
    );

    let report = analyze(&template, spec.region())?;
    if report.passed() {
        reporter.success(&format!(
            "synthesized {} resources",
            template.resources.len()
        ));
    } else {
        for issue in report.collect_issues() {
            reporter.warn(&issue);
        }
    }
    Ok(Synthesis { template, report })
}

/// Synthesize and, when `out` is given, write the template there.
///
/// # Errors
///
/// Returns an error if synthesis fails or the file cannot be written.
pub fn synthesize_to(
    spec: &StackSpec,
    files: &impl TemplateFiles,
    out: Option<&Path>,
    reporter: &impl ProgressReporter,
) -> Result<Synthesis> {
    let synthesis = synthesize(spec, reporter)?;
    if let Some(path) = out {
        files.write_template(path, &synthesis.template)?;
        reporter.success(&format!("template written to {}", path.display()));
    }
    Ok(synthesis)
}

/// Check a template: the synthesized one, or one read from `path`.
///
/// # Errors
///
/// Returns an error if the template cannot be produced or analyzed.
pub fn check(
    spec: &StackSpec,
    files: &impl TemplateFiles,
    path: Option<&Path>,
    reporter: &impl ProgressReporter,
) -> Result<ReachabilityReport> {
    let template = match path {
        Some(path) => {
            reporter.step(&format!("reading {}...", path.display()));
            files.read_template(path)?
        }
        None => spec.synthesize().context("synthesis failed")?,
    };
    check_template(&template, spec.region())
}

/// Analyze an already loaded template.
///
/// # Errors
///
/// Returns an error if a checked resource has malformed properties.
pub fn check_template(template: &Template, region: &Region) -> Result<ReachabilityReport> {
    let report = analyze(template, region).context("template could not be analyzed")?;
    tracing::info!(passed = report.passed(), "reachability analysis finished");
    Ok(report)
}

/// Compare `current` against what synthesis would produce now.
///
/// # Errors
///
/// Returns an error if synthesis fails.
pub fn diff_against(spec: &StackSpec, current: &Template) -> Result<TemplateDiff> {
    let proposed = spec.synthesize().context("synthesis failed")?;
    let changes = diff(current, &proposed);
    tracing::debug!(changes = changes.resources.len(), "template diff computed");
    Ok(changes)
}
