//! Configuration for the event loop

use crate::error::{EventManagerError, Result};

const LOG_LEVELS: &[&str] = &[
    "no", "fatal", "error", "warn", "info", "status", "v", "debug", "trace", "terminal-default",
];

/// Event loop configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLoopConfig {
    /// Name of the background thread
    /// Default: "mpv-event-loop"
    pub thread_name: String,

    /// Deliver events that are already queued when a stop is requested
    /// Default: true
    pub drain_on_shutdown: bool,

    /// Minimum level requested from the player when a log handler is installed
    /// Default: "info"
    pub log_level: String,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            thread_name: "mpv-event-loop".to_string(),
            drain_on_shutdown: true,
            log_level: "info".to_string(),
        }
    }
}

impl EventLoopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_drain_on_shutdown(mut self, drain: bool) -> Self {
        self.drain_on_shutdown = drain;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Preset that logs everything the player emits
    pub fn verbose() -> Self {
        Self::default().with_log_level("v")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.thread_name.is_empty() {
            return Err(EventManagerError::Configuration(
                "thread_name must not be empty".to_string(),
            ));
        }
        if self.thread_name.contains('\0') {
            return Err(EventManagerError::Configuration(
                "thread_name must not contain NUL bytes".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(EventManagerError::Configuration(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EventLoopConfig::default();
        assert_eq!(config.thread_name, "mpv-event-loop");
        assert!(config.drain_on_shutdown);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(EventLoopConfig::new().with_thread_name("").validate().is_err());
        assert!(EventLoopConfig::new().with_log_level("loud").validate().is_err());
        assert!(EventLoopConfig::verbose().validate().is_ok());
    }
}
