//! Structured Logger
//!
//! Wraps `tracing` with stderr console output (pretty or JSON), an optional
//! daily-rolling NDJSON file, and environment-based level control.
//! Console logs go to stderr so they never mix with command output or prompts.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use warden_config::{LogFormat, LoggingConfig};

/// File name prefix for rolled log files: `warden.log.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "warden.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is harmless; the second call leaves the first subscriber in place.
pub fn init_logger(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let pretty_layer = (config.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let json_layer = (config.format == LogFormat::Json)
        .then(|| fmt::layer().json().with_writer(std::io::stderr));

    let file_layer = config.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init();
}
