//! Config defaults.

use std::path::PathBuf;

/// Name of the whitelist file inside the config directory.
pub const WHITELIST_FILE_NAME: &str = "whitelist.json";

/// Default log level when neither `RUST_LOG` nor `WARDEN_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default number of log lines a tool returns.
pub const DEFAULT_LOG_LINES: u32 = 50;

/// Upper bound on log lines a tool may return.
pub const DEFAULT_MAX_LOG_LINES: u32 = 1000;

/// Hard ceiling accepted for `max_log_lines`.
pub const MAX_LOG_LINES_CEILING: u32 = 10_000;

/// Longest approval timeout accepted (24h).
pub const MAX_APPROVAL_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Resolve the default config directory: `~/.warden`, or `.warden` when no
/// home directory is known.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".warden"))
        .unwrap_or_else(|| PathBuf::from(".warden"))
}

/// Default whitelist file path inside `config_dir`.
pub fn default_whitelist_path(config_dir: &std::path::Path) -> PathBuf {
    config_dir.join(WHITELIST_FILE_NAME)
}
