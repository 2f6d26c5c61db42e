//! Config validation: range and membership checks with user-friendly messages.

use crate::defaults::{MAX_APPROVAL_TIMEOUT_SECS, MAX_LOG_LINES_CEILING};
use crate::schema::WardenConfig;
use thiserror::Error;

/// Log levels understood by the `tracing` env filter.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &WardenConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_security(config, &mut report);
    validate_logging(config, &mut report);
    validate_tools(config, &mut report);
    report
}

fn validate_security(config: &WardenConfig, report: &mut ValidationReport) {
    let security = &config.security;
    if security.whitelist_path.as_os_str().is_empty() {
        report.error("security.whitelistPath", "Whitelist path cannot be empty");
    }
    if !security.require_approval {
        report.warn(
            "security.requireApproval",
            "Approval is disabled; destructive commands will run without asking",
        );
    }
    if security.approval_timeout_secs > MAX_APPROVAL_TIMEOUT_SECS {
        report.error(
            "security.approvalTimeoutSecs",
            format!(
                "Timeout {}s exceeds the maximum of {MAX_APPROVAL_TIMEOUT_SECS}s",
                security.approval_timeout_secs
            ),
        );
    }
}

fn validate_logging(config: &WardenConfig, report: &mut ValidationReport) {
    let level = config.logging.level.as_str();
    if !VALID_LOG_LEVELS.contains(&level) {
        report.error(
            "logging.level",
            format!(
                "Unknown log level '{level}'. Use one of: {}",
                VALID_LOG_LEVELS.join(", ")
            ),
        );
    }
}

fn validate_tools(config: &WardenConfig, report: &mut ValidationReport) {
    let tools = &config.tools;
    if tools.max_log_lines == 0 || tools.max_log_lines > MAX_LOG_LINES_CEILING {
        report.error(
            "tools.maxLogLines",
            format!(
                "maxLogLines {} must be between 1 and {MAX_LOG_LINES_CEILING}",
                tools.max_log_lines
            ),
        );
    }
    if tools.default_log_lines == 0 || tools.default_log_lines > tools.max_log_lines {
        report.error(
            "tools.defaultLogLines",
            format!(
                "defaultLogLines {} must be between 1 and maxLogLines ({})",
                tools.default_log_lines, tools.max_log_lines
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SecurityConfig, ToolsConfig};

    #[test]
    fn default_config_is_valid() {
        let report = validate(&WardenConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn default_lines_above_max_is_error() {
        let mut cfg = WardenConfig::default();
        cfg.tools = ToolsConfig {
            default_log_lines: 500,
            max_log_lines: 100,
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "tools.defaultLogLines");
    }

    #[test]
    fn unknown_log_level_is_error() {
        let mut cfg = WardenConfig::default();
        cfg.logging.level = "fatal".to_string();
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "logging.level"));
    }

    #[test]
    fn disabled_approval_warns() {
        let mut cfg = WardenConfig::default();
        cfg.security = SecurityConfig {
            require_approval: false,
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
