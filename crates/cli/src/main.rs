//! Remote Dev CLI - Main Entry Point
//!
//! Resolves the stack configuration, declares the environment and renders it
//! for Terraform.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use remote_dev_common::{Stack, StackConfig, DEFAULT_STACK_FILE};

mod commands;
mod output;

use commands::{config, graph, outputs, synth};

/// Remote Dev - declarative remote development environment
#[derive(Parser)]
#[command(name = "remote-dev")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Stack file with instanceType / volumeSize / region
    #[arg(long, env = "REMOTE_DEV_STACK_FILE", default_value = DEFAULT_STACK_FILE, global = true)]
    stack_file: PathBuf,

    /// Override a configuration value (key=value), may be repeated
    #[arg(short = 'c', long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the stack as Terraform JSON
    Synth(synth::SynthArgs),

    /// List declared resources and their dependencies
    Graph,

    /// Show the resolved configuration
    Config,

    /// List stack outputs
    Outputs,

    /// Show version information
    Version,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<StackConfig> {
    let mut config = StackConfig::load(&cli.stack_file)?;
    config.apply_env()?;
    for assignment in &cli.overrides {
        config.apply_override(assignment)?;
    }
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so synthesized JSON on stdout stays clean
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("remote-dev v{}", remote_dev_common::VERSION);
        return Ok(());
    }

    let stack_config = resolve_config(&cli)?;
    let stack = Stack::declare(&stack_config)?;

    match cli.command {
        Commands::Synth(args) => synth::execute(args, &stack)?,
        Commands::Graph => graph::execute(&stack, cli.format)?,
        Commands::Config => config::execute(&stack.config, cli.format)?,
        Commands::Outputs => outputs::execute(&stack, cli.format)?,
        Commands::Version => {}
    }

    Ok(())
}
