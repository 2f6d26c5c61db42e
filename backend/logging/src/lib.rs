//! Structured logging for Warden.
//!
//! Handles subscriber setup (stderr console, optional rolling NDJSON files),
//! error-message redaction, and gateway decision events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, GatewayEvent};
pub use logger::init_logger;
pub use redact::sanitize_error_message;
