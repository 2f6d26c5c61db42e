use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the operator is asked to approve. Built from the command text alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub command: String,
    /// Human-readable reasons, e.g. "requires sudo/root, destructive action".
    pub reason: String,
    pub destructive: bool,
    pub requires_sudo: bool,
}

/// The operator's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub approved: bool,
    pub timestamp: DateTime<Utc>,
}

impl ApprovalResponse {
    pub fn approved() -> Self {
        Self {
            approved: true,
            timestamp: Utc::now(),
        }
    }

    pub fn denied() -> Self {
        Self {
            approved: false,
            timestamp: Utc::now(),
        }
    }
}

/// Side-effect-free preview of how the gateway would treat a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandVerdict {
    /// Whitelisted or read-only.
    pub safe: bool,
    pub needs_approval: bool,
    pub reason: String,
}

/// What to do when the operator does not answer within the approval timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutAction {
    /// Treat silence as a denial.
    #[default]
    Deny,
    /// Fail the request with `WardenError::ApprovalTimeout`.
    Error,
}

impl std::str::FromStr for TimeoutAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown timeout action '{other}', use 'deny' or 'error'")),
        }
    }
}
