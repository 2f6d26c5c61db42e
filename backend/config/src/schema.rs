//! Warden configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use warden_core::TimeoutAction;

use crate::defaults::{
    default_config_dir, default_whitelist_path, DEFAULT_LOG_LEVEL, DEFAULT_LOG_LINES,
    DEFAULT_MAX_LOG_LINES,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardenConfig {
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    /// JSON file with `commands` and `patterns` that run without approval.
    pub whitelist_path: PathBuf,
    /// When false, every command runs without asking. Meant for trusted batch
    /// environments only.
    pub require_approval: bool,
    /// Seconds to wait for the operator; 0 waits indefinitely.
    pub approval_timeout_secs: u64,
    pub timeout_action: TimeoutAction,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            whitelist_path: default_whitelist_path(&default_config_dir()),
            require_approval: true,
            approval_timeout_secs: 0,
            timeout_action: TimeoutAction::Deny,
        }
    }
}

impl SecurityConfig {
    pub fn approval_timeout(&self) -> Option<Duration> {
        (self.approval_timeout_secs > 0).then(|| Duration::from_secs(self.approval_timeout_secs))
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Directory for rolling NDJSON log files; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Pretty,
            dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tool limits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsConfig {
    pub default_log_lines: u32,
    pub max_log_lines: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_log_lines: DEFAULT_LOG_LINES,
            max_log_lines: DEFAULT_MAX_LOG_LINES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_wait_forever() {
        let security = SecurityConfig::default();
        assert_eq!(security.approval_timeout(), None);
    }

    #[test]
    fn timeout_converts_to_duration() {
        let security = SecurityConfig {
            approval_timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(security.approval_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn approval_required_by_default() {
        assert!(WardenConfig::default().security.require_approval);
    }
}
