use std::process::ExitCode;

use anyhow::Result;
use warden_safety::sanitize::truncate_string;
use warden_safety::{ApprovalService, Whitelist, WhitelistSource};

use crate::terminal_output::{note_info, note_warn, render_table};

/// Longest entry shown in the table before it is cut.
const MAX_ENTRY_WIDTH: usize = 72;

pub async fn run(service: &ApprovalService) -> Result<ExitCode> {
    let whitelist = service.whitelist().load().await;

    note_info(&describe_source(whitelist.source()));
    print!("{}", render_table(&["Kind", "Entry"], &rows(&whitelist)));

    for skipped in whitelist.skipped_patterns() {
        let shown = truncate_string(skipped, MAX_ENTRY_WIDTH, "...");
        note_warn(&format!("skipped unsafe or invalid pattern: {shown}"));
    }
    Ok(ExitCode::SUCCESS)
}

fn describe_source(source: &WhitelistSource) -> String {
    match source {
        WhitelistSource::File(path) => format!("Whitelist loaded from {}", path.display()),
        WhitelistSource::Defaults => "No usable whitelist file, using built-in defaults".to_string(),
        WhitelistSource::Inline => "Whitelist configured in-process".to_string(),
    }
}

fn rows(whitelist: &Whitelist) -> Vec<Vec<String>> {
    let commands = whitelist
        .commands()
        .iter()
        .map(|c| vec!["command".to_string(), truncate_string(c, MAX_ENTRY_WIDTH, "...")]);
    let patterns = whitelist
        .patterns()
        .map(|p| vec!["pattern".to_string(), truncate_string(p, MAX_ENTRY_WIDTH, "...")]);
    commands.chain(patterns).collect()
}
