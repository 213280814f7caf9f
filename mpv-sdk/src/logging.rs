//! Logging setup for applications using the SDK
//!
//! The SDK itself only emits `tracing` events. This module installs a
//! subscriber for them, and bridges the player's own log lines into
//! `tracing` under the `mpv` target.

use mpv_event_manager::{log_handler_fn, LogHandle};
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Install a subscriber for `mode`
///
/// # Environment Variables
///
/// - `MPV_SDK_LOG_LEVEL`: filter directive (for example `debug` or
///   `mpv_event_manager=trace`), taking precedence over `RUST_LOG`
///
/// ```rust,ignore
/// mpv_sdk::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info")?;
            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_names(true)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug")?;
            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_thread_names(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Install a subscriber chosen by `MPV_SDK_LOG_MODE`
///
/// `development` and `debug` select those modes; anything else, or no value,
/// is silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("MPV_SDK_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };
    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(directives) = std::env::var("MPV_SDK_LOG_LEVEL") {
        return EnvFilter::try_new(&directives)
            .map_err(|e| LoggingError::InvalidEnv(format!("MPV_SDK_LOG_LEVEL={directives}: {e}")));
    }
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(&rust_log)
            .map_err(|e| LoggingError::InvalidEnv(format!("RUST_LOG={rust_log}: {e}")));
    }
    Ok(EnvFilter::new(default_level))
}

/// Whether a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

/// Log handler that re-emits player log lines as `tracing` events
///
/// Levels map as: `fatal`/`error` to error, `warn` to warn, `info`/`status`
/// to info, `v`/`debug` to debug, everything else to trace.
pub fn tracing_log_handler() -> LogHandle {
    log_handler_fn(|level, module, message| match level {
        "fatal" | "error" => tracing::error!(target: "mpv", module, "{message}"),
        "warn" => tracing::warn!(target: "mpv", module, "{message}"),
        "info" | "status" => tracing::info!(target: "mpv", module, "{message}"),
        "v" | "debug" => tracing::debug!(target: "mpv", module, "{message}"),
        _ => tracing::trace!(target: "mpv", module, "{message}"),
    })
}
