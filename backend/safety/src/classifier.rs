//! Privilege and destructiveness checks for shell commands.
//!
//! Matching is plain substring search on the lowercased, trimmed command, so
//! `rm` also hits `format` and `perms`.

use serde::{Deserialize, Serialize};

const SUDO_PREFIX: &str = "sudo ";

/// Substrings that imply root privileges.
const PRIVILEGED_MARKERS: &[&str] = &[
    "systemctl restart",
    "systemctl stop",
    "systemctl start",
    "systemctl enable",
    "systemctl disable",
    "systemctl reload",
    "apt-get",
    "apt ",
    "dpkg",
    "service ",
];

/// Substrings that mark irreversible or service-impacting commands.
const DESTRUCTIVE_MARKERS: &[&str] = &[
    // filesystem
    "rm",
    "rmdir",
    "dd",
    "mkfs",
    "fdisk",
    "parted",
    // services
    "systemctl restart",
    "systemctl stop",
    "systemctl start",
    "systemctl reload",
    "systemctl enable",
    "systemctl disable",
    // power
    "shutdown",
    "reboot",
    "poweroff",
    "halt",
    // processes
    "kill",
    "killall",
    "pkill",
    // packages
    "apt-get remove",
    "apt remove",
    "apt-get purge",
    "apt purge",
    "apt-get autoremove",
    "apt autoremove",
    "dpkg -r",
    "dpkg --remove",
    "dpkg --purge",
    // accounts
    "userdel",
    "groupdel",
    // permissions
    "chmod",
    "chown",
    // firewall
    "iptables",
    "ufw",
    // overwrites into the root tree
    "mv /",
    "cp /",
];

pub const REASON_SUDO: &str = "requires sudo/root";
pub const REASON_DESTRUCTIVE: &str = "destructive action";
pub const REASON_NOT_WHITELISTED: &str = "not whitelisted";

fn normalize(command: &str) -> String {
    command.trim().to_lowercase()
}

pub fn requires_sudo(command: &str) -> bool {
    let cmd = normalize(command);
    cmd.starts_with(SUDO_PREFIX) || PRIVILEGED_MARKERS.iter().any(|m| cmd.contains(m))
}

pub fn is_destructive(command: &str) -> bool {
    let cmd = normalize(command);
    DESTRUCTIVE_MARKERS.iter().any(|m| cmd.contains(m))
}

/// Reasons joined by `, ` in a fixed order: privileges, then destructiveness.
pub fn approval_reason(command: &str) -> String {
    classify(command).reason
}

/// Everything the classifier knows about a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub requires_sudo: bool,
    pub destructive: bool,
    pub reason: String,
}

pub fn classify(command: &str) -> Classification {
    let requires_sudo = requires_sudo(command);
    let destructive = is_destructive(command);

    let mut reasons = Vec::with_capacity(2);
    if requires_sudo {
        reasons.push(REASON_SUDO);
    }
    if destructive {
        reasons.push(REASON_DESTRUCTIVE);
    }
    if reasons.is_empty() {
        reasons.push(REASON_NOT_WHITELISTED);
    }

    Classification {
        requires_sudo,
        destructive,
        reason: reasons.join(", "),
    }
}
