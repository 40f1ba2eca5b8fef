//! `isovpc synth [--out PATH]`: print or write the template.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::synth;
use crate::commands::TargetArgs;

/// Arguments for the synth command.
#[derive(Args)]
pub struct SynthArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write the template to a file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Run `isovpc synth`.
///
/// # Errors
///
/// Returns an error if synthesis fails or the template cannot be written.
pub fn run(app: &AppContext, args: &SynthArgs) -> Result<ExitCode> {
    let spec = app.stack_spec(&args.target)?;
    let out = args.out.as_deref();
    let synthesis = synth::synthesize_to(&spec, &app.files, out, &app.reporter())?;
    app.renderer().render_synth(&spec, &synthesis, out)?;
    Ok(ExitCode::SUCCESS)
}
