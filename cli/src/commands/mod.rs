//! Command implementations

pub mod check;
pub mod config;
pub mod connect;
pub mod deploy;
pub mod destroy;
pub mod diff;
pub mod outputs;
pub mod synth;
pub mod version;

use clap::Args;

/// Which stack a command acts on.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Deployment region (overrides stack.region and AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Stack name (overrides stack.name)
    #[arg(long)]
    pub stack_name: Option<String>,
}
