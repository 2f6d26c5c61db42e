//! Environment overlay for the config.
//!
//! Every setting has a `WARDEN_*` variable. Unset or empty variables keep the
//! default. Unparseable values also keep the default and are returned as
//! issues, since the logger is not up yet when the environment is read.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use warden_core::TimeoutAction;

use crate::defaults::{default_config_dir, default_whitelist_path};
use crate::schema::{LogFormat, WardenConfig};
use crate::validation::ConfigValidationError;

pub const CONFIG_DIR_VAR: &str = "WARDEN_CONFIG_DIR";
pub const WHITELIST_PATH_VAR: &str = "WARDEN_WHITELIST_PATH";
pub const REQUIRE_APPROVAL_VAR: &str = "WARDEN_REQUIRE_APPROVAL";
pub const APPROVAL_TIMEOUT_VAR: &str = "WARDEN_APPROVAL_TIMEOUT_SECS";
pub const TIMEOUT_ACTION_VAR: &str = "WARDEN_APPROVAL_TIMEOUT_ACTION";
pub const LOG_LEVEL_VAR: &str = "WARDEN_LOG_LEVEL";
pub const LOG_FORMAT_VAR: &str = "WARDEN_LOG_FORMAT";
pub const LOG_DIR_VAR: &str = "WARDEN_LOG_DIR";
pub const DEFAULT_LOG_LINES_VAR: &str = "WARDEN_DEFAULT_LOG_LINES";
pub const MAX_LOG_LINES_VAR: &str = "WARDEN_MAX_LOG_LINES";

/// Build the config from the process environment, with any ignored values.
pub fn from_env() -> (WardenConfig, Vec<ConfigValidationError>) {
    let vars: HashMap<String, String> = std::env::vars().collect();
    from_lookup(|name| vars.get(name).cloned())
}

/// Build the config from an arbitrary variable lookup (useful for testing).
pub fn from_lookup<F>(lookup: F) -> (WardenConfig, Vec<ConfigValidationError>)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let mut config = WardenConfig::default();
    let mut issues = Vec::new();

    let config_dir = get(CONFIG_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_dir);
    config.security.whitelist_path = get(WHITELIST_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_whitelist_path(&config_dir));

    // Only an explicit "false" turns approval off.
    if let Some(raw) = get(REQUIRE_APPROVAL_VAR) {
        config.security.require_approval = !raw.trim().eq_ignore_ascii_case("false");
    }
    if let Some(secs) = parse_var(&get, &mut issues, APPROVAL_TIMEOUT_VAR) {
        config.security.approval_timeout_secs = secs;
    }
    if let Some(raw) = get(TIMEOUT_ACTION_VAR) {
        match raw.parse::<TimeoutAction>() {
            Ok(action) => config.security.timeout_action = action,
            Err(e) => issues.push(ignored(TIMEOUT_ACTION_VAR, e)),
        }
    }

    if let Some(level) = get(LOG_LEVEL_VAR) {
        config.logging.level = level.trim().to_ascii_lowercase();
    }
    if let Some(raw) = get(LOG_FORMAT_VAR) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => config.logging.format = LogFormat::Json,
            "pretty" => config.logging.format = LogFormat::Pretty,
            other => issues.push(ignored(
                LOG_FORMAT_VAR,
                format!("unknown log format '{other}', use 'pretty' or 'json'"),
            )),
        }
    }
    config.logging.dir = get(LOG_DIR_VAR).map(PathBuf::from);

    if let Some(lines) = parse_var(&get, &mut issues, DEFAULT_LOG_LINES_VAR) {
        config.tools.default_log_lines = lines;
    }
    if let Some(lines) = parse_var(&get, &mut issues, MAX_LOG_LINES_VAR) {
        config.tools.max_log_lines = lines;
    }

    (config, issues)
}

fn ignored(var: &str, message: impl std::fmt::Display) -> ConfigValidationError {
    ConfigValidationError {
        path: var.to_string(),
        message: format!("{message}; the default was used instead"),
    }
}

fn parse_var<T, G>(get: &G, issues: &mut Vec<ConfigValidationError>, name: &str) -> Option<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            issues.push(ignored(name, format!("'{}' is not a valid number", raw.trim())));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULT_LOG_LINES;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn explicit_whitelist_path_wins() {
        let (cfg, _) = from_lookup(lookup(&[
            (CONFIG_DIR_VAR, "/etc/warden"),
            (WHITELIST_PATH_VAR, "/opt/wl.json"),
        ]));
        assert_eq!(cfg.security.whitelist_path, PathBuf::from("/opt/wl.json"));
    }

    #[test]
    fn whitelist_path_follows_config_dir() {
        let (cfg, _) = from_lookup(lookup(&[(CONFIG_DIR_VAR, "/etc/warden")]));
        assert_eq!(
            cfg.security.whitelist_path,
            PathBuf::from("/etc/warden/whitelist.json")
        );
    }

    #[test]
    fn only_false_disables_approval() {
        let (off, _) = from_lookup(lookup(&[(REQUIRE_APPROVAL_VAR, "FALSE")]));
        assert!(!off.security.require_approval);
        let (on, _) = from_lookup(lookup(&[(REQUIRE_APPROVAL_VAR, "no")]));
        assert!(on.security.require_approval);
    }

    #[test]
    fn reads_timeout_settings() {
        let (cfg, _) = from_lookup(lookup(&[
            (APPROVAL_TIMEOUT_VAR, "45"),
            (TIMEOUT_ACTION_VAR, "error"),
        ]));
        assert_eq!(cfg.security.approval_timeout_secs, 45);
        assert_eq!(cfg.security.timeout_action, TimeoutAction::Error);
    }

    #[test]
    fn bad_numbers_keep_defaults() {
        let (cfg, issues) = from_lookup(lookup(&[(DEFAULT_LOG_LINES_VAR, "lots")]));
        assert_eq!(cfg.tools.default_log_lines, DEFAULT_LOG_LINES);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, DEFAULT_LOG_LINES_VAR);
        assert!(issues[0].message.contains("'lots'"));
    }

    #[test]
    fn misspelled_enums_are_reported() {
        let (cfg, issues) = from_lookup(lookup(&[
            (TIMEOUT_ACTION_VAR, "erorr"),
            (LOG_FORMAT_VAR, "jsn"),
        ]));
        assert_eq!(cfg.security.timeout_action, TimeoutAction::Deny);
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec![TIMEOUT_ACTION_VAR, LOG_FORMAT_VAR]);
    }

    #[test]
    fn clean_environment_has_no_issues() {
        let (_, issues) = from_lookup(lookup(&[(APPROVAL_TIMEOUT_VAR, "30")]));
        assert!(issues.is_empty());
    }

    #[test]
    fn reads_logging_settings() {
        let (cfg, _) = from_lookup(lookup(&[
            (LOG_LEVEL_VAR, "DEBUG"),
            (LOG_FORMAT_VAR, "json"),
            (LOG_DIR_VAR, "/var/log/warden"),
        ]));
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.dir, Some(PathBuf::from("/var/log/warden")));
    }
}
