//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the output context and the concrete infrastructure
//! adapters. Adding a cross-cutting concern requires only one field change
//! here; zero command signatures change.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::commands::TargetArgs;
use crate::domain::config::apply_config_value;
use crate::domain::stack::StackSpec;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::engine::AwsCliEngine;
use crate::infra::fs::LocalFs;
use crate::output::{
    HumanRenderer, JsonRenderer, OutputContext, Renderer, Reporter, SilentReporter,
    TerminalReporter,
};

/// Environment variables that imply `--yes`.
pub const NON_INTERACTIVE_ENV_VARS: [&str; 2] = ["CI", "ISOVPC_YES"];

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `ISOVPC_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Persistent settings.
    pub config_store: YamlConfigStore,
    /// Provisioning engine driven through the AWS CLI.
    pub engine: AwsCliEngine<TokioCommandRunner>,
    /// Template file access.
    pub files: LocalFs,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `ISOVPC_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let env_yes = NON_INTERACTIVE_ENV_VARS
            .iter()
            .any(|var| std::env::var_os(var).is_some());
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore,
            engine: AwsCliEngine::default_runner(),
            files: LocalFs,
            non_interactive: flags.behaviour.yes || env_yes,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Returns the progress reporter for the current output mode.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        match self.mode {
            OutputMode::Human => Reporter::Terminal(TerminalReporter::new(&self.output)),
            OutputMode::Json => Reporter::Silent(SilentReporter),
        }
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true`, returns `default` immediately
    /// without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    /// Build the stack declaration from stored settings and per-command flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, the stack name
    /// or region is invalid, or the network settings cannot be planned.
    pub fn stack_spec(&self, target: &TargetArgs) -> Result<StackSpec> {
        let mut config = config_service::load_config(&self.config_store)?;
        if let Some(name) = &target.stack_name {
            apply_config_value(&mut config, "stack.name", name)?;
        }
        let region = config_service::resolve_region(target.region.as_deref(), &config, |var| {
            std::env::var(var).ok()
        })?;
        tracing::debug!(
            config = %self.config_store.path()?.display(),
            stack = %config.stack.name,
            "stack settings loaded"
        );
        StackSpec::from_config(&config, region)
    }
}
