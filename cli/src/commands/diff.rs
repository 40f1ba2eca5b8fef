//! `isovpc diff [--template PATH]`: compare a template with a fresh synthesis.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{ProgressReporter, StackEngine, TemplateFiles};
use crate::application::services::{stack_ops, synth};
use crate::commands::TargetArgs;

/// Arguments for the diff command.
#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Template to compare against (default: the deployed stack's template)
    #[arg(long)]
    pub template: Option<PathBuf>,
}

/// Run `isovpc diff`. Exits 1 when the templates differ.
///
/// # Errors
///
/// Returns an error if either template cannot be produced.
pub async fn run(app: &AppContext, args: &DiffArgs) -> Result<ExitCode> {
    let spec = app.stack_spec(&args.target)?;
    let current = match &args.template {
        Some(path) => app.files.read_template(path)?,
        None => {
            let target = stack_ops::target_of(&spec);
            let reporter = app.reporter();
            reporter.step(&format!("fetching deployed template of {}...", target.name));
            let template = app.engine.deployed_template(&target).await?;
            reporter.success(&format!("fetched {}", target.name));
            template
        }
    };

    let diff = synth::diff_against(&spec, &current)?;
    app.renderer().render_diff(&diff)?;

    Ok(if diff.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
