//! `warden-config`: runtime configuration for the Warden gateway.
//!
//! Provides:
//! - Typed config schema (security, logging, tool limits)
//! - Environment variable overlay (`WARDEN_*`)
//! - Default values and config directory resolution
//! - Validation with user-friendly errors and warnings

pub mod defaults;
pub mod env;
pub mod schema;
pub mod validation;

pub use defaults::{default_config_dir, default_whitelist_path};
pub use env::{from_env, from_lookup};
pub use schema::{LogFormat, LoggingConfig, SecurityConfig, ToolsConfig, WardenConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

/// Read the environment and validate the result.
///
/// Values the environment overlay had to ignore come first in the report's
/// errors. Nothing is logged here; the logger usually depends on this config.
pub fn load() -> (WardenConfig, ValidationReport) {
    let (config, issues) = from_env();
    let report = report_with(&config, issues);
    (config, report)
}

/// Validate `config` and prepend `issues` found while reading it.
pub fn report_with(
    config: &WardenConfig,
    mut issues: Vec<ConfigValidationError>,
) -> ValidationReport {
    let mut report = validate(config);
    issues.append(&mut report.errors);
    report.errors = issues;
    report
}

/// Log every finding in `report`.
///
/// Findings are reported, not returned as errors: the gateway always starts,
/// and `warden doctor` shows the full report.
pub fn log_findings(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}
