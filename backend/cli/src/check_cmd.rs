use std::process::ExitCode;

use anyhow::Result;
use warden_safety::{classify, ApprovalService};

use crate::terminal_output::{note_success, note_warn};

/// Prints the verdict; exits 0 when the command would run unprompted.
pub async fn run(service: &ApprovalService, command: &str, json: bool) -> Result<ExitCode> {
    let verdict = service.validate_command(command).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else if verdict.needs_approval {
        let c = classify(command);
        note_warn(&format!("'{command}' needs approval: {}", verdict.reason));
        println!("  destructive:   {}", c.destructive);
        println!("  requires sudo: {}", c.requires_sudo);
    } else {
        note_success(&format!("'{command}' runs without approval ({})", verdict.reason));
    }

    Ok(if verdict.needs_approval {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
