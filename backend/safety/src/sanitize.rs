//! Input sanitizers for tool arguments.
//!
//! Tool handlers run these on agent-supplied values before building an
//! argument vector, so the gateway classifies what will actually execute.
//!
//! This is library surface for tool handlers embedding the gateway. The
//! `warden` binary uses the log path, search pattern, integer and truncation
//! helpers; the service, container, host and record-type checks serve
//! systemd, docker and network tools built on top of this crate.

use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use warden_core::PatternError;

use crate::pattern::validate_pattern;

const MAX_SERVICE_NAME_LEN: usize = 100;
const MAX_CONTAINER_NAME_LEN: usize = 255;
const MAX_HOSTNAME_LEN: usize = 253;
const LOG_ROOT: &str = "/var/log";

/// DNS record types the lookup tool accepts.
pub const VALID_RECORD_TYPES: &[&str] = &["A", "AAAA", "MX", "NS", "TXT", "CNAME", "SOA", "PTR"];

static SERVICE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._@-]+$").unwrap());

static CONTAINER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").unwrap());

// RFC 1123 label: 1-63 chars, alphanumeric at both ends.
static HOSTNAME_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap());

static DOTTED_QUAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("invalid service name '{0}': only letters, digits, '.', '_', '-' and '@' are allowed")]
    ServiceName(String),

    #[error("invalid container name '{0}'")]
    ContainerName(String),

    #[error("invalid hostname '{0}'")]
    Hostname(String),

    #[error("invalid IP address '{0}'")]
    IpAddress(String),

    #[error("{what} is too long (max {max} characters)")]
    TooLong { what: &'static str, max: usize },

    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    #[error("only log files under /var/log/ are allowed, got '{0}'")]
    OutsideLogRoot(String),

    #[error("hidden files are not allowed: '{0}'")]
    HiddenPath(String),

    #[error("invalid record type '{got}', allowed: {allowed}")]
    RecordType { got: String, allowed: String },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Systemd unit name, e.g. `nginx`, `nginx.service`, `getty@tty1.service`.
pub fn sanitize_service_name(service: &str) -> Result<&str, SanitizeError> {
    if service.is_empty() {
        return Err(SanitizeError::Empty {
            what: "service name",
        });
    }
    if !SERVICE_NAME_RE.is_match(service) {
        return Err(SanitizeError::ServiceName(service.to_string()));
    }
    if service.len() > MAX_SERVICE_NAME_LEN {
        return Err(SanitizeError::TooLong {
            what: "service name",
            max: MAX_SERVICE_NAME_LEN,
        });
    }
    Ok(service)
}

/// Docker container name or id.
pub fn sanitize_container_name(name: &str) -> Result<&str, SanitizeError> {
    if name.is_empty() {
        return Err(SanitizeError::Empty {
            what: "container name",
        });
    }
    if name.len() > MAX_CONTAINER_NAME_LEN {
        return Err(SanitizeError::TooLong {
            what: "container name",
            max: MAX_CONTAINER_NAME_LEN,
        });
    }
    if !CONTAINER_NAME_RE.is_match(name) {
        return Err(SanitizeError::ContainerName(name.to_string()));
    }
    Ok(name)
}

/// RFC 1123 hostname.
pub fn sanitize_hostname(hostname: &str) -> Result<&str, SanitizeError> {
    if hostname.is_empty() {
        return Err(SanitizeError::Empty { what: "hostname" });
    }
    if hostname.len() > MAX_HOSTNAME_LEN {
        return Err(SanitizeError::TooLong {
            what: "hostname",
            max: MAX_HOSTNAME_LEN,
        });
    }
    if !hostname.split('.').all(|label| HOSTNAME_LABEL_RE.is_match(label)) {
        return Err(SanitizeError::Hostname(hostname.to_string()));
    }
    Ok(hostname)
}

/// IPv4, IPv6, or hostname. Dotted quads must be valid IPv4.
pub fn sanitize_host_or_ip(value: &str) -> Result<&str, SanitizeError> {
    if value.is_empty() {
        return Err(SanitizeError::Empty {
            what: "host or IP",
        });
    }
    if value.parse::<IpAddr>().is_ok() {
        return Ok(value);
    }
    if DOTTED_QUAD_RE.is_match(value) || value.contains(':') {
        return Err(SanitizeError::IpAddress(value.to_string()));
    }
    sanitize_hostname(value)
}

/// Resolve `path` (relative to the working directory) and require it to stay
/// under `/var/log/` without hidden components.
pub fn sanitize_log_path(path: &str) -> Result<PathBuf, SanitizeError> {
    let raw = Path::new(path);
    let absolute = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(raw)
    };
    let normalized = normalize_lexically(&absolute);

    let inside = normalized
        .strip_prefix(LOG_ROOT)
        .is_ok_and(|rest| !rest.as_os_str().is_empty());
    if !inside {
        return Err(SanitizeError::OutsideLogRoot(path.to_string()));
    }

    let hidden = normalized.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    });
    if hidden {
        return Err(SanitizeError::HiddenPath(path.to_string()));
    }

    Ok(normalized)
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Ad-hoc search pattern from a tool call. Any rejection fails the call.
pub fn sanitize_search_pattern(pattern: &str) -> Result<&str, SanitizeError> {
    validate_pattern(pattern)?;
    Ok(pattern)
}

/// DNS record type, case-insensitive; returns the upper-case form.
pub fn sanitize_record_type(record_type: &str) -> Result<String, SanitizeError> {
    let upper = record_type.to_ascii_uppercase();
    if VALID_RECORD_TYPES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(SanitizeError::RecordType {
            got: record_type.to_string(),
            allowed: VALID_RECORD_TYPES.join(", "),
        })
    }
}

/// Parse an optional integer argument, falling back to `default` and clamping
/// into `[min, max]` when bounds are given.
pub fn parse_int_safe(value: Option<&str>, default: i64, min: Option<i64>, max: Option<i64>) -> i64 {
    let Some(parsed) = value.and_then(|v| v.trim().parse::<i64>().ok()) else {
        return default;
    };
    match (min, max) {
        (Some(lo), _) if parsed < lo => lo,
        (_, Some(hi)) if parsed > hi => hi,
        _ => parsed,
    }
}

/// Shorten `s` to at most `max_len` characters including `ellipsis`, cutting
/// at the last space when it falls in the final 30% of the budget.
pub fn truncate_string(s: &str, max_len: usize, ellipsis: &str) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }

    let budget = max_len.saturating_sub(ellipsis.chars().count());
    let truncated: String = s.chars().take(budget).collect();

    match truncated.rfind(' ') {
        Some(idx) if truncated[..idx].chars().count() * 10 > max_len * 7 => {
            format!("{}{ellipsis}", &truncated[..idx])
        }
        _ => format!("{truncated}{ellipsis}"),
    }
}
