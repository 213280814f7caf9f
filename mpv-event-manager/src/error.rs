//! Error types for the event manager

use mpv_abi::MpvError;
use thiserror::Error;

/// Errors that can occur in the event manager
#[derive(Error, Debug)]
pub enum EventManagerError {
    #[error(transparent)]
    Native(#[from] MpvError),

    #[error("Failed to spawn event loop thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("Event loop is already running")]
    AlreadyRunning,

    #[error("Event manager has been shut down")]
    Terminated,

    #[error("Timed out waiting for event")]
    Timeout,

    #[error("Cannot block on the event loop thread")]
    OnEventThread,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EventManagerError {
    pub fn is_terminated(&self) -> bool {
        matches!(self, EventManagerError::Terminated)
    }
}

/// Result type alias for event manager operations
pub type Result<T> = std::result::Result<T, EventManagerError>;
