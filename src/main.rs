//! iam-preflight - AWS IAM effective-permission preflight check
//!
//! This is the main entry point for the iam-preflight CLI.

mod cli;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {}", e);
        }
        Config::default()
    });

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Check(args) => args.execute(&mut ctx).await?,
        Commands::ListActions(args) => args.execute(&mut ctx)?,
        Commands::Completions(args) => args.execute()?,
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
