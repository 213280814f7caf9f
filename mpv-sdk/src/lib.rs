//! # mpv SDK
//!
//! A sync-first binding to libmpv:
//!
//! ```rust,ignore
//! use mpv_sdk::prelude::*;
//!
//! fn main() -> Result<(), SdkError> {
//!     let mpv = MpvBuilder::new()
//!         .with_flag("no-video")
//!         .with_option("loop", "inf")
//!         .build()?;
//!
//!     // Typed accessor, name-indexed access and attribute access share one core
//!     mpv.osd_level().set(0)?;
//!     let title = mpv.get("media-title")?;
//!     let muted = mpv.get_attr("mute")?;
//!
//!     // Observers run on the event thread
//!     let handle = mpv.observe_property("time-pos", |_, pos| println!("at {pos:?}"))?;
//!
//!     mpv.play("clip.webm")?;
//!     mpv.wait_for_playback()?;
//!
//!     mpv.unobserve_property("time-pos", &handle);
//!     mpv.terminate();
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Typed properties**: every table property has a method on
//!   [`Attributes`], plus name-indexed `get`/`set` for everything else
//! - **Observers and callbacks**: delivered in order on one background
//!   thread, each isolated from the others' panics
//! - **Deterministic teardown**: `terminate()` (or drop) stops the event
//!   thread, destroys the handle and releases every callback, in that order
//! - **Testable**: the `test-support` feature exposes a simulated backend
//!
//! ## Architecture
//!
//! ```text
//! mpv-sdk (Mpv, MpvBuilder, ObserverGroup)
//!     ↓
//! mpv-event-manager (event thread, observer registry, waiters)
//!     ↓
//! mpv-properties (property table, value marshaling)
//!     ↓
//! mpv-abi (native client, error codes, events)
//! ```

pub mod builder;
pub mod error;
pub mod logging;
pub mod observer;
pub mod player;

pub use builder::MpvBuilder;
pub use error::{Result, SdkError};
pub use observer::ObserverGroup;
pub use player::{LifecycleState, LoadMode, Mpv, SeekMode};

pub use mpv_abi::{
    EndFile, EndFileReason, ErrorCode, ErrorKind, Event, EventId, EventPayload, Format, MpvError,
    NativeClient, Node,
};
pub use mpv_event_manager::{
    active_event_loops, log_handler_fn, CallbackHandle, EventIterator, EventLoopConfig,
    EventTicket, LogHandle, ObserverHandle,
};
pub use mpv_properties::{
    Attributes, ByteString, CommaList, MpvProperty, PropertyHandle, PropertySpec, PropertyType,
    Value, ValueError,
};

#[cfg(feature = "libmpv")]
pub use mpv_abi::LibMpv;

#[cfg(feature = "test-support")]
pub use mpv_abi::SimulatedMpv;

/// Common imports
pub mod prelude {
    pub use crate::{
        Attributes, Event, EventId, Mpv, MpvBuilder, ObserverHandle, SdkError, Value,
    };
}
