//! Human-readable terminal renderer.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize as _;

use crate::application::services::stack_ops::DeployOutcome;
use crate::application::services::synth::Synthesis;
use crate::domain::config::IsovpcConfig;
use crate::domain::diff::{ChangeKind, TemplateDiff};
use crate::domain::endpoint::{Region, service_name};
use crate::domain::reachability::ReachabilityReport;
use crate::domain::stack::StackSpec;
use crate::infra::config::CONFIG_ENV_VAR;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("isovpc {version}");
    }

    /// Without `out` the template itself is the output, printed even in
    /// quiet mode so it can be piped.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be serialized.
    pub fn render_synth(
        &self,
        spec: &StackSpec,
        synthesis: &Synthesis,
        out: Option<&Path>,
    ) -> Result<()> {
        let Some(path) = out else {
            println!("{}", synthesis.template.to_json_pretty()?);
            return Ok(());
        };
        if self.ctx.quiet {
            return Ok(());
        }
        println!();
        self.ctx.header(spec.name());
        self.ctx.kv("Region:      ", &spec.region().to_string());
        self.ctx.kv("VPC:         ", &spec.network().cidr().to_string());
        for plan in spec.network().subnets()? {
            self.ctx.kv(
                "Subnet:      ",
                &format!("{} {} (zone {})", plan.name(), plan.cidr, plan.zone_index),
            );
        }
        self.ctx
            .kv("Instance:    ", spec.instance().instance_type());
        for endpoint in spec.endpoints() {
            self.ctx
                .kv("Endpoint:    ", &display_service_name(spec.region(), endpoint.suffix()));
        }
        self.ctx.kv(
            "Resources:   ",
            &synthesis.template.resources.len().to_string(),
        );
        self.ctx.kv("Template:    ", &path.display().to_string());
        println!();
        Ok(())
    }

    /// Render reachability checks, one line each, with issues beneath failures.
    pub fn render_check(&self, report: &ReachabilityReport) {
        if !self.ctx.quiet {
            println!();
            println!(
                "  {}",
                format!("Reachability ({})", report.region).style(self.ctx.styles.header)
            );
            println!();
        }
        for check in &report.checks {
            if check.passed {
                if !self.ctx.quiet {
                    println!(
                        "    {} {}  {}",
                        "\u{2713}".style(self.ctx.styles.success),
                        check.name,
                        check.summary.style(self.ctx.styles.dim)
                    );
                }
            } else {
                println!(
                    "    {} {}  {}",
                    "\u{2717}".style(self.ctx.styles.error),
                    check.name,
                    check.summary.style(self.ctx.styles.dim)
                );
                for issue in &check.issues {
                    println!("        {issue}");
                }
            }
        }
        println!();
        let failed = report.checks.iter().filter(|c| !c.passed).count();
        if failed == 0 {
            if !self.ctx.quiet {
                println!(
                    "  {} The instance can reach the session service and nothing else.",
                    "\u{2713}".style(self.ctx.styles.success)
                );
            }
        } else {
            println!(
                "  {} {failed} of {} checks failed.",
                "\u{2717}".style(self.ctx.styles.error),
                report.checks.len()
            );
        }
    }

    pub fn render_diff(&self, diff: &TemplateDiff) {
        if diff.is_empty() {
            self.ctx.success("No differences");
            return;
        }
        println!();
        self.ctx.header("Resources");
        for change in &diff.resources {
            let symbol = change.kind.symbol();
            let styled = match change.kind {
                ChangeKind::Added => symbol.style(self.ctx.styles.success).to_string(),
                ChangeKind::Removed | ChangeKind::Replaced => {
                    symbol.style(self.ctx.styles.error).to_string()
                }
                ChangeKind::Modified => symbol.style(self.ctx.styles.warning).to_string(),
            };
            let mut line = format!(
                "    {styled} {} {}",
                change.logical_id,
                change.resource_type.style(self.ctx.styles.dim)
            );
            if !change.properties.is_empty() {
                line.push_str(&format!(" [{}]", change.properties.join(", ")));
            }
            println!("{line}");
        }
        if !diff.outputs.is_empty() {
            println!();
            self.ctx.header("Outputs");
            for change in &diff.outputs {
                println!("    {} {}", change.kind.symbol(), change.name);
            }
        }
        if diff.parameters_changed {
            println!();
            self.ctx.warn("Parameters changed");
        }
        println!();
    }

    pub fn render_deploy(&self, outcome: &DeployOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv("Stack:      ", &outcome.stack);
        self.ctx.kv("InstanceId: ", &outcome.instance_id);
        println!();
        self.ctx.info("Open a shell: isovpc connect");
    }

    pub fn render_outputs(&self, stack: &str, outputs: &BTreeMap<String, String>) {
        if outputs.is_empty() {
            self.ctx.warn(&format!("{stack} has no outputs"));
            return;
        }
        let width = outputs.keys().map(String::len).max().unwrap_or(0) + 1;
        for (key, value) in outputs {
            println!("  {:<width$} {value}", format!("{key}:").style(self.ctx.styles.dim));
        }
    }

    pub fn render_destroyed(&self, stack: &str) {
        self.ctx.success(&format!("{stack} destroyed"));
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &IsovpcConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<20} {}", "stack.name:", config.stack.name);
        println!(
            "  {:<20} {}",
            "stack.region:",
            config.stack.region.as_deref().unwrap_or("(not set)")
        );
        println!("  {:<20} {}", "network.cidr:", config.network.cidr);
        println!("  {:<20} {}", "network.max_azs:", config.network.max_azs);
        println!("  {:<20} {}", "instance.type:", config.instance.instance_type);
        println!("  {:<20} {}", "instance.image:", config.instance.image);
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [CONFIG_ENV_VAR, "AWS_REGION", "AWS_DEFAULT_REGION", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

// ── Display helpers ──────────────────────────────────────────────────────────

/// Service name as it will resolve, with the region left symbolic when unknown.
#[must_use]
pub fn display_service_name(region: &Region, suffix: &str) -> String {
    service_name(region, suffix)
        .evaluate(&|_| Some("${AWS::Region}".to_string()))
        .unwrap_or_else(|| suffix.to_string())
}
