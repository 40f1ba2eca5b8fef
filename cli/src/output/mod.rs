//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::{Reporter, SilentReporter, TerminalReporter};
pub use styles::Styles;

use crate::application::services::stack_ops::DeployOutcome;
use crate::application::services::synth::Synthesis;
use crate::domain::config::IsovpcConfig;
use crate::domain::diff::TemplateDiff;
use crate::domain::reachability::ReachabilityReport;
use crate::domain::stack::StackSpec;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// The renderer for the current output mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the template cannot be serialized.
    pub fn render_synth(
        &self,
        spec: &StackSpec,
        synthesis: &Synthesis,
        out: Option<&Path>,
    ) -> Result<()> {
        match self {
            Self::Human(r) => r.render_synth(spec, synthesis, out),
            Self::Json(r) => r.render_synth(spec, synthesis, out),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_check(&self, report: &ReachabilityReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_check(report);
                Ok(())
            }
            Self::Json(r) => r.render_check(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_diff(&self, diff: &TemplateDiff) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_diff(diff);
                Ok(())
            }
            Self::Json(r) => r.render_diff(diff),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_deploy(&self, outcome: &DeployOutcome) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_deploy(outcome);
                Ok(())
            }
            Self::Json(r) => r.render_deploy(outcome),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outputs(&self, stack: &str, outputs: &BTreeMap<String, String>) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outputs(stack, outputs);
                Ok(())
            }
            Self::Json(r) => r.render_outputs(stack, outputs),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_destroyed(&self, stack: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_destroyed(stack);
                Ok(())
            }
            Self::Json(r) => r.render_destroyed(stack),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &IsovpcConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }
}
