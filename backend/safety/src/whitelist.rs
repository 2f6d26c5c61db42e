//! Command whitelist: which commands may run without approval, loaded once
//! from JSON and cached.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::pattern::compile_pattern;

/// Verbs that never mutate state. Checked independently of the whitelist file
/// and cannot be switched off by configuration.
const READ_ONLY_COMMANDS: &[&str] = &[
    "cat",
    "tail",
    "head",
    "less",
    "more",
    "grep",
    "find",
    "ls",
    "pwd",
    "whoami",
    "date",
    "uptime",
    "df",
    "du",
    "free",
    "ps",
    "top",
    "htop",
    "systemctl status",
    "systemctl list-units",
    "systemctl is-active",
    "systemctl is-enabled",
    "journalctl",
];

/// True if `command` starts with `entry` at a word boundary.
fn matches_prefix(command: &str, entry: &str) -> bool {
    command == entry
        || command
            .strip_prefix(entry)
            .is_some_and(|rest| rest.starts_with(' '))
}

/// Lowercased exact or prefix+space match against the fixed read-only verbs.
pub fn is_read_only(command: &str) -> bool {
    let cmd = command.trim().to_lowercase();
    READ_ONLY_COMMANDS
        .iter()
        .any(|entry| matches_prefix(&cmd, entry))
}

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

/// Whitelist file contents: `{"commands": [...], "patterns": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistConfig {
    /// Exact commands or command prefixes (matched at a word boundary).
    #[serde(default)]
    pub commands: Vec<String>,
    /// Regular expressions tested against the trimmed command.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Why the whitelist file could not be used. Always recovered by falling back
/// to [`WhitelistConfig::with_safe_defaults`].
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("whitelist file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read whitelist {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse whitelist JSON {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl WhitelistConfig {
    /// Read-only administrative commands used when no usable file exists.
    pub fn with_safe_defaults() -> Self {
        let commands = [
            "df",
            "free",
            "ps",
            "top",
            "htop",
            "uptime",
            "systemctl status",
            "systemctl list-units",
            "journalctl",
            "cat",
            "tail",
            "head",
            "grep",
            "ls",
            "pwd",
            "whoami",
            "date",
            "uname",
        ];
        let patterns = [
            r"^df\s+",
            r"^free\s+",
            r"^ps\s+",
            r"^systemctl\s+status\s+",
            r"^systemctl\s+list-units",
            r"^journalctl\s+",
            r"^cat\s+/var/log/",
            r"^tail\s+",
            r"^grep\s+",
            r"^ls\s+",
        ];

        WhitelistConfig {
            commands: commands.iter().map(|c| c.to_string()).collect(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Read and parse a whitelist file.
    pub async fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConfigLoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Compiled whitelist
// ---------------------------------------------------------------------------

/// Where the active whitelist came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistSource {
    File(PathBuf),
    Defaults,
    Inline,
}

/// A whitelist with its patterns validated and compiled.
#[derive(Debug)]
pub struct Whitelist {
    commands: Vec<String>,
    patterns: Vec<Regex>,
    skipped: Vec<String>,
    source: WhitelistSource,
}

impl Whitelist {
    /// Compile `config`, dropping patterns that fail validation or do not
    /// parse. The remaining entries stay usable.
    pub fn compile(config: WhitelistConfig, source: WhitelistSource) -> Self {
        let mut patterns = Vec::with_capacity(config.patterns.len());
        let mut skipped = Vec::new();

        for pattern in config.patterns {
            match compile_pattern(&pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => {
                    let preview: String = pattern.chars().take(50).collect();
                    warn!(pattern = %preview, error = %e, "Skipping whitelist pattern");
                    skipped.push(pattern);
                }
            }
        }

        Whitelist {
            commands: config.commands,
            patterns,
            skipped,
            source,
        }
    }

    /// Exact/prefix entries are case-sensitive; patterns see the trimmed command.
    pub fn matches(&self, command: &str) -> bool {
        let cmd = command.trim();

        if let Some(entry) = self.commands.iter().find(|e| matches_prefix(cmd, e)) {
            debug!(command = %cmd, entry = %entry, "Whitelist entry match");
            return true;
        }

        if let Some(re) = self.patterns.iter().find(|re| re.is_match(cmd)) {
            debug!(command = %cmd, pattern = %re.as_str(), "Whitelist pattern match");
            return true;
        }

        false
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Source text of the patterns that are active.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Patterns dropped during compilation.
    pub fn skipped_patterns(&self) -> &[String] {
        &self.skipped
    }

    pub fn source(&self) -> &WhitelistSource {
        &self.source
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Origin {
    Path(PathBuf),
    Inline(WhitelistConfig),
}

/// Lazily loads the whitelist once and serves it from cache afterwards.
#[derive(Debug)]
pub struct WhitelistStore {
    origin: Origin,
    cache: OnceCell<Arc<Whitelist>>,
}

impl WhitelistStore {
    /// Store backed by a JSON file; falls back to defaults if it is unusable.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::Path(path.into()),
            cache: OnceCell::new(),
        }
    }

    /// Store backed by an in-memory config.
    pub fn from_config(config: WhitelistConfig) -> Self {
        Self {
            origin: Origin::Inline(config),
            cache: OnceCell::new(),
        }
    }

    /// Load and compile the whitelist on first call; later calls hit the cache.
    /// Never fails: any file problem yields the default whitelist.
    pub async fn load(&self) -> Arc<Whitelist> {
        self.cache
            .get_or_init(|| async {
                let whitelist = match &self.origin {
                    Origin::Inline(config) => {
                        Whitelist::compile(config.clone(), WhitelistSource::Inline)
                    }
                    Origin::Path(path) => match WhitelistConfig::load(path).await {
                        Ok(config) => {
                            info!(
                                path = %path.display(),
                                commands = config.commands.len(),
                                patterns = config.patterns.len(),
                                "Whitelist loaded"
                            );
                            Whitelist::compile(config, WhitelistSource::File(path.clone()))
                        }
                        Err(e) => {
                            warn!(error = %e, "Whitelist unavailable, using defaults");
                            Whitelist::compile(
                                WhitelistConfig::with_safe_defaults(),
                                WhitelistSource::Defaults,
                            )
                        }
                    },
                };
                Arc::new(whitelist)
            })
            .await
            .clone()
    }

    pub async fn is_whitelisted(&self, command: &str) -> bool {
        self.load().await.matches(command)
    }

    /// Drop the cached whitelist so the next query reloads it.
    pub fn reset(&mut self) {
        self.cache = OnceCell::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_whitelist(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn file_entry_and_pattern_match() {
        let file = write_whitelist(r#"{"commands": ["df"], "patterns": ["^df\\s+"]}"#);
        let store = WhitelistStore::from_path(file.path());
        assert!(store.is_whitelisted("df -h").await);
        assert!(store.is_whitelisted("  df  ").await);
        assert!(!store.is_whitelisted("dfx").await);
        assert_eq!(
            store.load().await.source(),
            &WhitelistSource::File(file.path().to_path_buf())
        );
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = WhitelistStore::from_path(dir.path().join("nope.json"));
        let whitelist = store.load().await;
        assert_eq!(whitelist.source(), &WhitelistSource::Defaults);
        assert_eq!(
            whitelist.commands(),
            WhitelistConfig::with_safe_defaults().commands.as_slice()
        );
        assert!(whitelist.matches("uname -a"));
    }

    #[tokio::test]
    async fn invalid_json_falls_back_to_defaults() {
        let file = write_whitelist("{ not json");
        let store = WhitelistStore::from_path(file.path());
        let whitelist = store.load().await;
        assert_eq!(whitelist.source(), &WhitelistSource::Defaults);
        assert!(whitelist.matches("journalctl -u nginx"));
    }

    #[tokio::test]
    async fn default_patterns_all_compile() {
        let store = WhitelistStore::from_config(WhitelistConfig::with_safe_defaults());
        let whitelist = store.load().await;
        assert!(whitelist.skipped_patterns().is_empty());
        assert_eq!(whitelist.patterns().count(), 10);
    }

    #[tokio::test]
    async fn overlong_pattern_is_dropped_others_still_match() {
        let long = format!("^{}", "x".repeat(250));
        let store = WhitelistStore::from_config(WhitelistConfig {
            commands: vec![],
            patterns: vec![long.clone(), r"^uptime\b".to_string()],
        });
        let whitelist = store.load().await;
        assert_eq!(whitelist.skipped_patterns(), &[long.clone()]);
        assert!(!whitelist.matches(&long[1..]));
        assert!(whitelist.matches("uptime -p"));
    }

    #[tokio::test]
    async fn dangerous_and_broken_patterns_are_dropped() {
        let store = WhitelistStore::from_config(WhitelistConfig {
            commands: vec![],
            patterns: vec!["(a+)+".to_string(), "^ls[".to_string(), "^ls".to_string()],
        });
        let whitelist = store.load().await;
        assert_eq!(whitelist.skipped_patterns().len(), 2);
        assert!(whitelist.matches("ls -la"));
    }

    #[tokio::test]
    async fn exact_entries_are_case_sensitive() {
        let store = WhitelistStore::from_config(WhitelistConfig {
            commands: vec!["docker ps".to_string()],
            patterns: vec![],
        });
        assert!(store.is_whitelisted("docker ps -a").await);
        assert!(!store.is_whitelisted("DOCKER ps").await);
    }

    #[tokio::test]
    async fn missing_keys_default_to_empty() {
        let file = write_whitelist(r#"{"commands": ["uname"]}"#);
        let store = WhitelistStore::from_path(file.path());
        let whitelist = store.load().await;
        assert_eq!(whitelist.patterns().count(), 0);
        assert!(whitelist.matches("uname -r"));
    }

    #[tokio::test]
    async fn cache_survives_file_changes_until_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.json");
        std::fs::write(&path, r#"{"commands": ["docker ps"], "patterns": []}"#).unwrap();

        let mut store = WhitelistStore::from_path(&path);
        assert!(store.is_whitelisted("docker ps").await);

        std::fs::write(&path, r#"{"commands": [], "patterns": []}"#).unwrap();
        assert!(store.is_whitelisted("docker ps").await);

        store.reset();
        assert!(!store.is_whitelisted("docker ps").await);
    }

    #[test]
    fn read_only_is_case_insensitive_prefix() {
        assert!(is_read_only("SYSTEMCTL STATUS nginx"));
        assert!(is_read_only("  tail -f /var/log/syslog "));
        assert!(is_read_only("du"));
        assert!(!is_read_only("systemctl restart nginx"));
        assert!(!is_read_only("lsblk"));
    }
}
