use std::process::ExitCode;

use anyhow::Result;
use warden_config::ToolsConfig;
use warden_safety::sanitize::{parse_int_safe, sanitize_log_path, sanitize_search_pattern};
use warden_safety::{ApprovalService, SanitizeError};

use crate::run_cmd::{self, Pipeline};
use crate::terminal_output::note_error;

pub async fn run(
    service: &ApprovalService,
    tools: &ToolsConfig,
    path: &str,
    lines: Option<&str>,
    grep: Option<&str>,
) -> Result<ExitCode> {
    match build_pipeline(tools, path, lines, grep) {
        Ok(pipeline) => run_cmd::execute(service, "logs", &pipeline).await,
        Err(e) => {
            note_error(&e.to_string());
            Ok(ExitCode::from(2))
        }
    }
}

/// `tail -n N <path>`, piped into `grep -E` when a filter is given.
fn build_pipeline(
    tools: &ToolsConfig,
    path: &str,
    lines: Option<&str>,
    grep: Option<&str>,
) -> Result<Pipeline, SanitizeError> {
    let path = sanitize_log_path(path)?;
    let lines = parse_int_safe(
        lines,
        i64::from(tools.default_log_lines),
        Some(1),
        Some(i64::from(tools.max_log_lines)),
    );

    let mut pipeline = Pipeline::new(vec![
        "tail".to_string(),
        "-n".to_string(),
        lines.to_string(),
        path.to_string_lossy().into_owned(),
    ]);
    if let Some(pattern) = grep {
        let pattern = sanitize_search_pattern(pattern)?;
        pipeline = pipeline.pipe(vec!["grep".to_string(), "-E".to_string(), pattern.to_string()]);
    }
    Ok(pipeline)
}
