//! `isovpc destroy`: delete the stack.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack_ops;
use crate::commands::TargetArgs;

/// Run `isovpc destroy`. Prompts unless `--yes`, `CI` or `ISOVPC_YES`.
///
/// # Errors
///
/// Returns an error if the prompt or the engine fails.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<ExitCode> {
    let spec = app.stack_spec(args)?;
    let target = stack_ops::target_of(&spec);

    if !app.non_interactive {
        let prompt = format!(
            "Delete stack {} in {}? Its instance and endpoints will be removed",
            target.name, target.region
        );
        if !app.confirm(&prompt, false)? {
            app.output.info("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    stack_ops::destroy(&app.engine, &target, &app.reporter()).await?;
    app.renderer().render_destroyed(&target.name)?;
    Ok(ExitCode::SUCCESS)
}
