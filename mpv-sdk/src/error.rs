use mpv_abi::{ErrorKind, MpvError};
use mpv_event_manager::EventManagerError;
use mpv_properties::ValueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error(transparent)]
    Native(#[from] MpvError),

    #[error("Event manager error: {0}")]
    EventManager(#[from] EventManagerError),

    #[error("Value error: {0}")]
    Value(#[from] ValueError),

    #[error("Player has been terminated")]
    Terminated,
}

impl SdkError {
    /// Native failure kind, if this error came from the player.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SdkError::Native(err) => Some(err.kind),
            SdkError::EventManager(EventManagerError::Native(err)) => Some(err.kind),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        match self {
            SdkError::Terminated => true,
            SdkError::EventManager(err) => err.is_terminated(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
