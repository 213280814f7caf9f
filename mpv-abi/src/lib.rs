//! # mpv ABI
//!
//! The narrow native surface the rest of the SDK is built on: raw format codes,
//! the error code table, owned event and value types, and the [`NativeClient`]
//! trait that a player backend implements.
//!
//! Two backends ship with the crate:
//!
//! - `LibMpv` (feature `libmpv`) links the system libmpv.
//! - `SimulatedMpv` (feature `test-support`) is a deterministic in-process
//!   stand-in used by the SDK's tests.

pub mod client;
pub mod error;
pub mod event;
pub mod format;
pub mod node;

#[cfg(feature = "libmpv")]
pub mod ffi;

#[cfg(any(test, feature = "test-support"))]
pub mod sim;

pub use client::{next_reply_userdata, NativeClient};
pub use error::{ErrorCode, ErrorKind, MpvError, NativeResult};
pub use event::{
    ClientMessage, CommandReply, EndFile, EndFileReason, Event, EventId, EventPayload, LogMessage,
    PropertyEvent, StartFile,
};
pub use format::Format;
pub use node::Node;

#[cfg(feature = "libmpv")]
pub use ffi::LibMpv;

#[cfg(any(test, feature = "test-support"))]
pub use sim::SimulatedMpv;
