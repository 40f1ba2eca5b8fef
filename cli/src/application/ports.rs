//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared template
//! model: never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;
use isovpc_common::Template;

use crate::domain::config::IsovpcConfig;
use crate::domain::endpoint::Region;

// ── Value Types ───────────────────────────────────────────────────────────────

/// A deployed (or to-be-deployed) stack: its name and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTarget {
    pub name: String,
    pub region: Region,
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<IsovpcConfig>;
    /// Persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &IsovpcConfig) -> Result<()>;
    /// Where the configuration lives.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Template Files Port ───────────────────────────────────────────────────────

/// Reads and writes template documents.
pub trait TemplateFiles {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a template.
    fn read_template(&self, path: &Path) -> Result<Template>;
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_template(&self, path: &Path, template: &Template) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Provisioning Engine Port ──────────────────────────────────────────────────

/// The external engine that turns templates into cloud resources.
#[allow(async_fn_in_trait)]
pub trait StackEngine {
    /// Create or update the stack from `template` and wait for completion.
    async fn deploy(&self, target: &StackTarget, template: &Template) -> Result<()>;
    /// Delete the stack and wait until it is gone.
    async fn destroy(&self, target: &StackTarget) -> Result<()>;
    /// Outputs of a deployed stack, by output key.
    async fn outputs(&self, target: &StackTarget) -> Result<BTreeMap<String, String>>;
    /// The template the stack was last deployed with.
    async fn deployed_template(&self, target: &StackTarget) -> Result<Template>;
    /// Open an interactive session on `instance_id`, inheriting the terminal.
    async fn open_session(&self, target: &StackTarget, instance_id: &str) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
