mod approval_prompt;
mod check_cmd;
mod doctor_cmd;
mod logs_cmd;
mod pattern_cmd;
mod run_cmd;
mod terminal_output;
mod whitelist_cmd;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use warden_logging::init_logger;
use warden_safety::ApprovalService;

use approval_prompt::TerminalApprovalHandler;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden: approval gateway for shell commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how the gateway would treat a command, without running it
    Check {
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Run a program with arguments (no shell), asking for approval when needed
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Tail a log file under /var/log, optionally filtered
    Logs {
        path: String,
        /// Number of lines to show
        #[arg(short = 'n', long)]
        lines: Option<String>,
        /// Extended regex passed to `grep -E`
        #[arg(long)]
        grep: Option<String>,
    },
    /// Show the active whitelist and where it came from
    Whitelist,
    /// Check a regex against the pattern safety rules
    Pattern { pattern: String },
    /// Validate configuration and whitelist
    Doctor,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let (config, report) = warden_config::load();
    init_logger(&config.logging);
    warden_config::log_findings(&report);

    let cli = Cli::parse();

    let service = Arc::new(ApprovalService::from_config(&config));
    service.set_approval_handler(TerminalApprovalHandler).await;
    debug!(whitelist = %config.security.whitelist_path.display(), "Gateway ready");

    match cli.command {
        Commands::Check { json, command } => check_cmd::run(&service, &command.join(" "), json).await,
        Commands::Run { command } => run_cmd::run(&service, command).await,
        Commands::Logs { path, lines, grep } => {
            logs_cmd::run(&service, &config.tools, &path, lines.as_deref(), grep.as_deref()).await
        }
        Commands::Whitelist => whitelist_cmd::run(&service).await,
        Commands::Pattern { pattern } => Ok(pattern_cmd::run(&pattern)),
        Commands::Doctor => doctor_cmd::run(&config, &report).await,
    }
}
