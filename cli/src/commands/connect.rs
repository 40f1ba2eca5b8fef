//! `isovpc connect`: interactive Session Manager shell on the instance.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack_ops;
use crate::commands::TargetArgs;

/// Run `isovpc connect`.
///
/// The session inherits the terminal; its exit status becomes ours.
///
/// # Errors
///
/// Returns an error if the stack has no instance or the session client
/// cannot be started.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<ExitCode> {
    anyhow::ensure!(!app.is_json(), "connect is interactive and has no JSON output");
    let spec = app.stack_spec(args)?;
    let target = stack_ops::target_of(&spec);

    let status = {
        let reporter = app.reporter();
        stack_ops::connect(&app.engine, &target, &reporter).await?
    };
    Ok(exit_code_of(status.code()))
}

fn exit_code_of(code: Option<i32>) -> ExitCode {
    match code.map(u8::try_from) {
        Some(Ok(code)) => ExitCode::from(code),
        _ => ExitCode::FAILURE,
    }
}
