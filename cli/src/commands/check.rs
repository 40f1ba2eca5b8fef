//! `isovpc check [--template PATH]`: reachability analysis.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::synth;
use crate::commands::TargetArgs;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Check this template file instead of a fresh synthesis
    #[arg(long)]
    pub template: Option<PathBuf>,
}

/// Run `isovpc check`. Exits 1 when any check fails.
///
/// # Errors
///
/// Returns an error if the template cannot be produced or analyzed.
pub fn run(app: &AppContext, args: &CheckArgs) -> Result<ExitCode> {
    let spec = app.stack_spec(&args.target)?;
    let report = synth::check(&spec, &app.files, args.template.as_deref(), &app.reporter())?;
    app.renderer().render_check(&report)?;

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
