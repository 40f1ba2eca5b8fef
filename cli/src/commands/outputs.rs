//! `isovpc outputs`: show deployed stack outputs.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack_ops;
use crate::commands::TargetArgs;

/// Run `isovpc outputs`.
///
/// # Errors
///
/// Returns an error if the stack does not exist or cannot be described.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<ExitCode> {
    let spec = app.stack_spec(args)?;
    let target = stack_ops::target_of(&spec);
    let outputs = stack_ops::outputs(&app.engine, &target).await?;
    app.renderer().render_outputs(&target.name, &outputs)?;
    Ok(ExitCode::SUCCESS)
}
