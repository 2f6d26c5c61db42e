use std::process::ExitCode;

use warden_safety::{compile_pattern, MAX_PATTERN_LEN};

use crate::terminal_output::{note_error, note_success};

/// Exits 0 if `pattern` would be accepted as a whitelist or search pattern.
pub fn run(pattern: &str) -> ExitCode {
    match compile_pattern(pattern) {
        Ok(_) => {
            note_success(&format!(
                "pattern accepted ({} of {MAX_PATTERN_LEN} characters)",
                pattern.chars().count()
            ));
            ExitCode::SUCCESS
        }
        Err(e) => {
            note_error(&format!("pattern rejected: {e}"));
            ExitCode::FAILURE
        }
    }
}
