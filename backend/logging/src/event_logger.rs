//! Gateway Event Logger
//!
//! Structured approval decisions and tool executions, emitted on the
//! `warden_events` tracing target so they can be routed to their own file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::sanitize_error_message;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// Command ran without asking (whitelisted, read-only, or approval disabled).
    Allowed { command: String, reason: String },
    ApprovalRequested { command: String, reason: String },
    ApprovalDecided { command: String, approved: bool },
    ToolExecuted {
        tool: String,
        arguments_json: String,
        duration_ms: Option<u64>,
    },
    ToolFailed { tool: String, error_msg: String },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: GatewayEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts the event where needed and writes it to the tracing system.
    pub fn log_event(mut event: GatewayEvent) -> EventLogEntry {
        if let GatewayEvent::ToolFailed { error_msg, .. } = &mut event {
            *error_msg = sanitize_error_message(error_msg);
        }

        let entry = EventLogEntry {
            timestamp: Utc::now(),
            event,
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();

        match &entry.event {
            GatewayEvent::ToolFailed { .. }
            | GatewayEvent::ApprovalDecided {
                approved: false, ..
            } => warn!(target: "warden_events", event = %json, "Gateway event"),
            _ => info!(target: "warden_events", event = %json, "Gateway event"),
        }

        entry
    }
}
