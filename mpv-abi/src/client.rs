//! The narrow client interface every backend implements

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::NativeResult;
use crate::event::Event;
use crate::format::Format;
use crate::node::Node;

static NEXT_REPLY_USERDATA: AtomicU64 = AtomicU64::new(1);

/// Hand out a process-wide unique, non-zero reply tag.
///
/// Zero is reserved for events that are not a reply to anything.
pub fn next_reply_userdata() -> u64 {
    NEXT_REPLY_USERDATA.fetch_add(1, Ordering::Relaxed)
}

/// One native player instance.
///
/// Implementations serialize concurrent calls internally. The only call that
/// may block for a long time is [`wait_event`](NativeClient::wait_event), and
/// it must be made from a single thread at a time.
pub trait NativeClient: Send + Sync {
    /// Set an option from its string form. Valid before and after initialization.
    fn set_option_string(&self, name: &str, value: &str) -> NativeResult<()>;

    fn initialize(&self) -> NativeResult<()>;

    /// Read a property, requesting the given format.
    fn get_property(&self, name: &str, format: Format) -> NativeResult<Node>;

    /// Write a property. `value` must be representable in `format`.
    fn set_property(&self, name: &str, format: Format, value: &Node) -> NativeResult<()>;

    /// Run a command and wait for its result.
    fn command(&self, args: &[&str]) -> NativeResult<Node>;

    /// Queue a command; completion arrives as a command-reply event tagged
    /// with `reply_userdata`.
    fn command_async(&self, reply_userdata: u64, args: &[&str]) -> NativeResult<()>;

    /// Start emitting property-change events for `name`, tagged with `reply_userdata`.
    fn observe_property(&self, reply_userdata: u64, name: &str, format: Format) -> NativeResult<()>;

    /// Stop every observation registered with `reply_userdata`; returns how many were removed.
    fn unobserve_property(&self, reply_userdata: u64) -> NativeResult<usize>;

    /// Enable log-message events at or above `min_level` (`"no"` disables them).
    fn request_log_messages(&self, min_level: &str) -> NativeResult<()>;

    /// Block for the next event.
    ///
    /// A negative timeout waits forever, zero polls. Returns an event with
    /// [`EventId::None`](crate::EventId::None) on timeout or after
    /// [`wakeup`](NativeClient::wakeup).
    fn wait_event(&self, timeout: f64) -> Event;

    /// Interrupt a concurrent [`wait_event`](NativeClient::wait_event).
    fn wakeup(&self);

    /// Destroy the native instance. Calling it more than once is a no-op.
    fn terminate_destroy(&self);
}
