//! Subcommand implementations.
//!
//! Each command returns the process exit code. Exit 0 is a clean pass,
//! exit 1 a completed audit with missing permissions, and 2+ infrastructure
//! failures (see `Error::exit_code`).

use crate::cli::output::OutputFormatter;
use crate::cli::Cli;
use crate::config::Config;
use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use iam_preflight::auditor::PermissionAuditor;
use iam_preflight::checklist::Checklist;
use iam_preflight::Error;

/// Shared state for command execution.
pub struct CommandContext {
    /// Output formatter configured from CLI flags
    pub output: OutputFormatter,
    /// Merged configuration
    pub config: Config,
    /// AWS region override (CLI wins over config)
    pub region: Option<String>,
    /// AWS profile override (CLI wins over config)
    pub profile: Option<String>,
}

impl CommandContext {
    /// Builds a context from parsed CLI flags and loaded config.
    pub fn new(cli: &Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.output.color.unwrap_or(true);
        let json_mode = cli.is_json();

        Self {
            output: OutputFormatter::new(use_color, json_mode, cli.verbosity()),
            region: cli.region.clone().or_else(|| config.aws.region.clone()),
            profile: cli.profile.clone().or_else(|| config.aws.profile.clone()),
            config,
        }
    }

    /// The effective checklist: compiled-in defaults, config additions,
    /// then per-invocation `--require` actions.
    fn checklist(&self, extra: &[String]) -> Checklist {
        Checklist::with_additional(
            self.config
                .check
                .additional_actions
                .iter()
                .chain(extra.iter())
                .cloned(),
        )
    }
}

/// Arguments for the `check` command.
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Additional required action (repeatable), e.g. --require kms:CreateKey
    #[arg(long = "require", value_name = "ACTION", action = clap::ArgAction::Append)]
    pub require: Vec<String>,
}

impl CheckArgs {
    /// Runs the permission audit and renders the report.
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let checklist = ctx.checklist(&self.require);

        let result = async {
            let auditor = PermissionAuditor::connect(
                ctx.region.as_deref(),
                ctx.profile.as_deref(),
                checklist,
            )
            .await?;
            auditor.run().await
        }
        .await;

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                ctx.output.error(&err.to_string());
                return Ok(err.exit_code());
            }
        };

        if ctx.output.is_json() {
            println!("{}", serde_json::to_string_pretty(&report).map_err(Error::from)?);
            return Ok(if report.passed() { 0 } else { 1 });
        }

        ctx.output.banner("IAM PREFLIGHT");
        ctx.output.info(&format!("Principal: {}", report.principal_arn));
        if let Some(account) = &report.account {
            ctx.output.info(&format!("Account:   {}", account));
        }

        ctx.output.section("Required permissions");
        for action in &report.granted {
            ctx.output.action_result(action, true);
        }
        for action in &report.missing {
            ctx.output.action_result(action, false);
        }

        ctx.output
            .verdict(report.passed(), report.granted.len(), report.required);

        if report.passed() {
            Ok(0)
        } else {
            for action in &report.missing {
                ctx.output
                    .error(&format!("missing required permission: {}", action));
            }
            Ok(1)
        }
    }
}

/// Arguments for the `list-actions` command.
#[derive(Parser, Debug, Clone)]
pub struct ListActionsArgs {
    /// Additional required action (repeatable), merged into the listing
    #[arg(long = "require", value_name = "ACTION", action = clap::ArgAction::Append)]
    pub require: Vec<String>,
}

impl ListActionsArgs {
    /// Prints the effective required-action list. No AWS calls.
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let checklist = ctx.checklist(&self.require);
        let actions: Vec<&str> = checklist.iter().map(|(action, _)| action).collect();

        if ctx.output.is_json() {
            println!("{}", serde_json::to_string_pretty(&actions).map_err(Error::from)?);
            return Ok(0);
        }

        ctx.output.section("Required actions");
        for action in &actions {
            ctx.output.info(&format!("  {}", action));
        }
        ctx.output.info(&format!("\n{} action(s)", actions.len()));

        Ok(0)
    }
}

/// Arguments for the `completions` command.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Writes completions for the requested shell to stdout.
    pub fn execute(&self) -> Result<i32> {
        let mut command = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut command,
            "iam-preflight",
            &mut std::io::stdout(),
        );
        Ok(0)
    }
}
