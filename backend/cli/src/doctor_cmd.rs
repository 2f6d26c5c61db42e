//! `warden doctor`: config validation plus a whitelist file check.

use std::process::ExitCode;

use anyhow::Result;
use warden_config::{ValidationReport, WardenConfig};
use warden_safety::{validate_pattern, ConfigLoadError, WhitelistConfig};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

pub async fn run(config: &WardenConfig, report: &ValidationReport) -> Result<ExitCode> {
    println!("\nRunning Warden doctor...\n");

    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    let whitelist_ok = check_whitelist(config).await;

    println!();
    if report.is_valid() && whitelist_ok {
        note_success("All checks passed.");
        Ok(ExitCode::SUCCESS)
    } else {
        note_error("Some checks failed. Fix the errors above.");
        Ok(ExitCode::FAILURE)
    }
}

/// A missing file is fine (defaults apply); an unreadable one is not.
async fn check_whitelist(config: &WardenConfig) -> bool {
    let path = &config.security.whitelist_path;
    match WhitelistConfig::load(path).await {
        Ok(whitelist) => {
            note_success(&format!(
                "Whitelist {}: {} commands, {} patterns",
                path.display(),
                whitelist.commands.len(),
                whitelist.patterns.len()
            ));
            let mut ok = true;
            for pattern in &whitelist.patterns {
                if let Err(e) = validate_pattern(pattern) {
                    note_warn(&format!("pattern '{pattern}' will be skipped: {e}"));
                    ok = false;
                }
            }
            ok
        }
        Err(ConfigLoadError::NotFound { .. }) => {
            note_info(&format!(
                "No whitelist at {}, built-in defaults apply",
                path.display()
            ));
            true
        }
        Err(e) => {
            note_error(&e.to_string());
            false
        }
    }
}
