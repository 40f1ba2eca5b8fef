//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// An internet-isolated VPC with one instance reachable only through SSM
#[derive(Parser)]
#[command(
    name = "isovpc",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the CloudFormation template for the stack
    Synth(commands::synth::SynthArgs),

    /// Verify the template keeps the instance off the internet
    Check(commands::check::CheckArgs),

    /// Compare a template with a fresh synthesis
    Diff(commands::diff::DiffArgs),

    /// Synthesize, check and deploy the stack
    Deploy(commands::TargetArgs),

    /// Delete the stack
    Destroy(commands::TargetArgs),

    /// Show the deployed stack's outputs
    Outputs(commands::TargetArgs),

    /// Open a Session Manager shell on the instance
    Connect(commands::TargetArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            command,
            ..
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        });

        match command {
            Command::Synth(args) => commands::synth::run(&app, &args),
            Command::Check(args) => commands::check::run(&app, &args),
            Command::Diff(args) => commands::diff::run(&app, &args).await,
            Command::Deploy(args) => commands::deploy::run(&app, &args).await,
            Command::Destroy(args) => commands::destroy::run(&app, &args).await,
            Command::Outputs(args) => commands::outputs::run(&app, &args).await,
            Command::Connect(args) => commands::connect::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
