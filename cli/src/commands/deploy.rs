//! `isovpc deploy`: synthesize, check and deploy.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack_ops;
use crate::commands::TargetArgs;

/// Run `isovpc deploy`.
///
/// # Errors
///
/// Returns an error if the template fails analysis or the engine fails.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<ExitCode> {
    let spec = app.stack_spec(args)?;
    let outcome = stack_ops::deploy(&app.engine, &spec, &app.reporter()).await?;
    app.renderer().render_deploy(&outcome)?;
    Ok(ExitCode::SUCCESS)
}
