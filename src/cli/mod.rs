//! CLI module for iam-preflight.
//!
//! Argument parsing, subcommand definitions and output formatting.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// iam-preflight - verify the calling AWS principal's IAM permissions
///
/// Checks that the principal resolved from the default AWS credential chain
/// holds every permission in the required-action list before a provisioning
/// run is attempted.
#[derive(Parser, Debug, Clone)]
#[command(name = "iam-preflight")]
#[command(author = "iam-preflight Contributors")]
#[command(version)]
#[command(about = "Preflight check for AWS IAM permissions", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "IAM_PREFLIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// AWS region (overrides config file and SDK defaults)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// AWS shared-config profile to use
    #[arg(long, global = true)]
    pub profile: Option<String>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for scripting
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Human
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the permission audit against the calling principal
    Check(commands::CheckArgs),

    /// Print the effective required-action list without calling AWS
    #[command(name = "list-actions")]
    ListActions(commands::ListActionsArgs),

    /// Generate shell completions
    Completions(commands::CompletionsArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-4)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(4)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}
