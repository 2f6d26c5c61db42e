//! Error message redaction.
//!
//! Strips file paths, IPv4 addresses, and port suffixes from messages before
//! they are logged or shown to the agent.

use once_cell::sync::Lazy;
use regex::Regex;

static PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[\w/.-]+").unwrap());
static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").unwrap());
static PORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d{2,5}\b").unwrap());

/// Redacts paths, IPs, and ports in an error message.
pub fn sanitize_error_message(msg: &str) -> String {
    if msg.is_empty() {
        return "Unknown error".to_string();
    }

    let redacted = PATH_RE.replace_all(msg, "[PATH]");
    let redacted = IPV4_RE.replace_all(&redacted, "[IP]");
    PORT_RE.replace_all(&redacted, ":[PORT]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_paths() {
        let clean = sanitize_error_message("Error in /home/user/project/file.rs");
        assert!(!clean.contains("/home/user"));
        assert!(clean.contains("[PATH]"));
    }

    #[test]
    fn redacts_ips() {
        let clean = sanitize_error_message("Connection to 192.168.1.100 failed");
        assert!(!clean.contains("192.168.1.100"));
        assert!(clean.contains("[IP]"));
    }

    #[test]
    fn redacts_ports() {
        let clean = sanitize_error_message("Server running on :8080");
        assert!(!clean.contains(":8080"));
        assert!(clean.contains(":[PORT]"));
    }

    #[test]
    fn empty_message_gets_placeholder() {
        assert_eq!(sanitize_error_message(""), "Unknown error");
    }
}
