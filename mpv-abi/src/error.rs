//! Native error codes and the failures they map to
//!
//! Every call into the client API returns an integer status. Negative values in
//! `-1..=-12` map to an [`ErrorKind`] with a fixed message; every other code is
//! treated as success.

use std::fmt;

use serde::{Serialize, Serializer};

/// Raw status code returned by the native client API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const SUCCESS: Self = Self(0);
    pub const EVENT_QUEUE_FULL: Self = Self(-1);
    pub const NOMEM: Self = Self(-2);
    pub const UNINITIALIZED: Self = Self(-3);
    pub const INVALID_PARAMETER: Self = Self(-4);
    pub const OPTION_NOT_FOUND: Self = Self(-5);
    pub const OPTION_FORMAT: Self = Self(-6);
    pub const OPTION_ERROR: Self = Self(-7);
    pub const PROPERTY_NOT_FOUND: Self = Self(-8);
    pub const PROPERTY_FORMAT: Self = Self(-9);
    pub const PROPERTY_UNAVAILABLE: Self = Self(-10);
    pub const PROPERTY_ERROR: Self = Self(-11);
    pub const COMMAND: Self = Self(-12);
    pub const LOADING_FAILED: Self = Self(-13);
    pub const AO_INIT_FAILED: Self = Self(-14);
    pub const VO_INIT_FAILED: Self = Self(-15);
    pub const NOTHING_TO_PLAY: Self = Self(-16);
    pub const UNKNOWN_FORMAT: Self = Self(-17);
    pub const UNSUPPORTED: Self = Self(-18);
    pub const NOT_IMPLEMENTED: Self = Self(-19);
    pub const GENERIC: Self = Self(-20);

    pub fn raw(self) -> i32 {
        self.0
    }

    /// Failure kind for this code, or `None` when the code is not an error.
    pub fn kind(self) -> Option<ErrorKind> {
        let kind = match self {
            Self::EVENT_QUEUE_FULL => ErrorKind::EventQueueFull,
            Self::NOMEM => ErrorKind::NoMemory,
            Self::UNINITIALIZED => ErrorKind::Uninitialized,
            Self::INVALID_PARAMETER => ErrorKind::InvalidParameter,
            Self::OPTION_NOT_FOUND => ErrorKind::OptionNotFound,
            Self::OPTION_FORMAT => ErrorKind::OptionFormat,
            Self::OPTION_ERROR => ErrorKind::OptionError,
            Self::PROPERTY_NOT_FOUND => ErrorKind::PropertyNotFound,
            Self::PROPERTY_FORMAT => ErrorKind::PropertyFormat,
            Self::PROPERTY_UNAVAILABLE => ErrorKind::PropertyUnavailable,
            Self::PROPERTY_ERROR => ErrorKind::PropertyError,
            Self::COMMAND => ErrorKind::Command,
            _ => return None,
        };
        Some(kind)
    }

    /// Symbolic name of the code as used in libmpv's headers.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "SUCCESS",
            -1 => "EVENT_QUEUE_FULL",
            -2 => "NOMEM",
            -3 => "UNINITIALIZED",
            -4 => "INVALID_PARAMETER",
            -5 => "OPTION_NOT_FOUND",
            -6 => "OPTION_FORMAT",
            -7 => "OPTION_ERROR",
            -8 => "PROPERTY_NOT_FOUND",
            -9 => "PROPERTY_FORMAT",
            -10 => "PROPERTY_UNAVAILABLE",
            -11 => "PROPERTY_ERROR",
            -12 => "COMMAND",
            -13 => "LOADING_FAILED",
            -14 => "AO_INIT_FAILED",
            -15 => "VO_INIT_FAILED",
            -16 => "NOTHING_TO_PLAY",
            -17 => "UNKNOWN_FORMAT",
            -18 => "UNSUPPORTED",
            -19 => "NOT_IMPLEMENTED",
            -20 => "GENERIC",
            code if code > 0 => "SUCCESS",
            _ => "UNKNOWN",
        }
    }

    /// Raise the mapped failure for this code, or succeed when there is none.
    ///
    /// `context` is attached to the error (typically the property name and
    /// value, or the command arguments). Negative codes without a mapping are
    /// absorbed, but reported at warn level so they do not vanish silently.
    pub fn check<I, S>(self, context: I) -> Result<(), MpvError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.kind() {
            Some(kind) => Err(MpvError::new(kind, self, context)),
            None => {
                if self.0 < 0 {
                    tracing::warn!(
                        code = self.0,
                        name = self.name(),
                        "Ignoring native status code without an error mapping"
                    );
                }
                Ok(())
            }
        }
    }

    /// Build an error for this code even when it has no mapping.
    ///
    /// Used where a failure already happened (for example a handle that could
    /// not be created) and must be reported regardless of the code.
    pub fn into_error<I, S>(self, context: I) -> MpvError
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MpvError::new(self.kind().unwrap_or(ErrorKind::Generic), self, context)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

/// Result of a raw native call.
pub type NativeResult<T> = std::result::Result<T, ErrorCode>;

/// Failure class raised for a mapped native error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EventQueueFull,
    NoMemory,
    Uninitialized,
    InvalidParameter,
    OptionNotFound,
    OptionFormat,
    OptionError,
    PropertyNotFound,
    PropertyFormat,
    PropertyUnavailable,
    PropertyError,
    Command,
    /// Native failure outside the mapped range.
    Generic,
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::EventQueueFull => "mpv event queue full",
            ErrorKind::NoMemory => "mpv cannot allocate memory",
            ErrorKind::Uninitialized => "Uninitialized mpv handle used",
            ErrorKind::InvalidParameter => "Invalid value for mpv parameter",
            ErrorKind::OptionNotFound => "mpv option does not exist",
            ErrorKind::OptionFormat => "Tried to set mpv option using wrong format",
            ErrorKind::OptionError => "Invalid value for mpv option",
            ErrorKind::PropertyNotFound => "mpv property does not exist",
            ErrorKind::PropertyFormat => {
                "Tried to get/set mpv property using wrong format, or passed invalid value"
            }
            ErrorKind::PropertyUnavailable => "mpv property is not available",
            ErrorKind::PropertyError => "Generic error getting or setting mpv property",
            ErrorKind::Command => "Error running mpv command",
            ErrorKind::Generic => "Generic mpv error",
        }
    }

    /// Canonical code for this kind.
    pub fn code(self) -> ErrorCode {
        match self {
            ErrorKind::EventQueueFull => ErrorCode::EVENT_QUEUE_FULL,
            ErrorKind::NoMemory => ErrorCode::NOMEM,
            ErrorKind::Uninitialized => ErrorCode::UNINITIALIZED,
            ErrorKind::InvalidParameter => ErrorCode::INVALID_PARAMETER,
            ErrorKind::OptionNotFound => ErrorCode::OPTION_NOT_FOUND,
            ErrorKind::OptionFormat => ErrorCode::OPTION_FORMAT,
            ErrorKind::OptionError => ErrorCode::OPTION_ERROR,
            ErrorKind::PropertyNotFound => ErrorCode::PROPERTY_NOT_FOUND,
            ErrorKind::PropertyFormat => ErrorCode::PROPERTY_FORMAT,
            ErrorKind::PropertyUnavailable => ErrorCode::PROPERTY_UNAVAILABLE,
            ErrorKind::PropertyError => ErrorCode::PROPERTY_ERROR,
            ErrorKind::Command => ErrorCode::COMMAND,
            ErrorKind::Generic => ErrorCode::GENERIC,
        }
    }
}

/// A native call failed with a mapped error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct MpvError {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    /// Call arguments that produced the failure.
    pub context: Vec<String>,
}

impl MpvError {
    pub fn new<I, S>(kind: ErrorKind, code: ErrorCode, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            code,
            context: context.into_iter().map(Into::into).collect(),
        }
    }

    /// Error of `kind` carrying its canonical code.
    pub fn from_kind<I, S>(kind: ErrorKind, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(kind, kind.code(), context)
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl fmt::Display for MpvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind.message(), self.code.0)?;
        if !self.context.is_empty() {
            write!(f, ": {}", self.context.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1, ErrorKind::EventQueueFull)]
    #[case(-2, ErrorKind::NoMemory)]
    #[case(-3, ErrorKind::Uninitialized)]
    #[case(-4, ErrorKind::InvalidParameter)]
    #[case(-5, ErrorKind::OptionNotFound)]
    #[case(-6, ErrorKind::OptionFormat)]
    #[case(-7, ErrorKind::OptionError)]
    #[case(-8, ErrorKind::PropertyNotFound)]
    #[case(-9, ErrorKind::PropertyFormat)]
    #[case(-10, ErrorKind::PropertyUnavailable)]
    #[case(-11, ErrorKind::PropertyError)]
    #[case(-12, ErrorKind::Command)]
    fn test_mapped_codes(#[case] code: i32, #[case] kind: ErrorKind) {
        let code = ErrorCode(code);
        assert_eq!(code.kind(), Some(kind));
        assert_eq!(kind.code(), code);

        let err = code.check(["volume"]).unwrap_err();
        assert_eq!(err.kind, kind);
        assert_eq!(err.context, vec!["volume".to_string()]);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(-13)]
    #[case(-20)]
    #[case(-99)]
    fn test_unmapped_codes_are_not_errors(#[case] code: i32) {
        assert!(ErrorCode(code).kind().is_none());
        assert!(ErrorCode(code).check(Vec::<String>::new()).is_ok());
    }

    #[test]
    fn test_into_error_falls_back_to_generic() {
        let err = ErrorCode::LOADING_FAILED.into_error(["loadfile", "x.mkv"]);
        assert_eq!(err.kind, ErrorKind::Generic);
        assert_eq!(err.code, ErrorCode::LOADING_FAILED);
    }

    #[test]
    fn test_display_includes_context() {
        let err = ErrorCode::PROPERTY_NOT_FOUND.into_error(["no-such-thing"]);
        let text = err.to_string();
        assert!(text.starts_with("mpv property does not exist (-8)"));
        assert!(text.ends_with("no-such-thing"));
    }

    #[test]
    fn test_code_names() {
        assert_eq!(ErrorCode::PROPERTY_UNAVAILABLE.name(), "PROPERTY_UNAVAILABLE");
        assert_eq!(ErrorCode(-42).name(), "UNKNOWN");
    }
}
