//! Mpv - the player handle
//!
//! Wraps one native client together with its event manager. Properties are
//! reachable three ways, all routed through the same typed core:
//!
//! - by hyphenated name: `mpv.get("osd-level")`, `mpv.set("loop", "inf")`
//! - by attribute name: `mpv.get_attr("osd_level")`
//! - by typed handle: `mpv.osd_level().set(0)` (see [`Attributes`])
//!
//! [`Attributes`]: mpv_properties::Attributes

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mpv_abi::{Event, EventId, Format, NativeClient, Node};
use mpv_event_manager::{
    CallbackHandle, EventIterator, EventManager, EventTicket, LogHandle, ObserverHandle,
    StopOutcome,
};
use mpv_properties::{
    from_native, lookup, lookup_attribute, to_native, CommaList, MpvProperty, PropertyHandle,
    PropertyHost, PropertySpec, PropertyType, Value, ValueError,
};
use parking_lot::Mutex;

use crate::error::{Result, SdkError};
use crate::observer::ObserverGroup;

const OPTION_PREFIX: &str = "options/";
const FILE_LOCAL_PREFIX: &str = "file-local-options/";

/// Lifecycle of a constructed player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Terminated,
}

/// How `loadfile` treats the current playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Stop playback and play the file immediately
    #[default]
    Replace,
    /// Append to the playlist
    Append,
    /// Append, and start playing if nothing is playing
    AppendPlay,
}

impl LoadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadMode::Replace => "replace",
            LoadMode::Append => "append",
            LoadMode::AppendPlay => "append-play",
        }
    }
}

/// Reference point for [`Mpv::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekMode {
    #[default]
    Relative,
    Absolute,
    RelativePercent,
    AbsolutePercent,
}

impl SeekMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SeekMode::Relative => "relative",
            SeekMode::Absolute => "absolute",
            SeekMode::RelativePercent => "relative-percent",
            SeekMode::AbsolutePercent => "absolute-percent",
        }
    }
}

/// A running player
///
/// Dropping the player terminates it. Call [`terminate`](Self::terminate)
/// explicitly where the point of teardown matters; the drop is a safety net.
///
/// # Example
///
/// ```rust,ignore
/// use mpv_sdk::{Attributes, MpvBuilder};
///
/// let mpv = MpvBuilder::new().with_flag("no-video").build()?;
///
/// mpv.observe_property("pause", |name, value| println!("{name} -> {value:?}"))?;
/// mpv.play("clip.webm")?;
/// mpv.wait_for_playback()?;
///
/// mpv.volume().set(50.0)?;
/// println!("{:?}", mpv.get("media-title")?);
///
/// mpv.terminate();
/// ```
pub struct Mpv {
    client: Arc<dyn NativeClient>,
    events: Arc<EventManager>,
    state: Mutex<LifecycleState>,
    playback: Mutex<Option<EventTicket>>,
}

impl Mpv {
    pub(crate) fn from_parts(client: Arc<dyn NativeClient>, events: Arc<EventManager>) -> Self {
        Self {
            client,
            events,
            state: Mutex::new(LifecycleState::Running),
            playback: Mutex::new(None),
        }
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn is_terminated(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Terminated
    }

    fn ensure_running(&self) -> Result<()> {
        match self.lifecycle_state() {
            LifecycleState::Running => Ok(()),
            LifecycleState::Terminated => Err(SdkError::Terminated),
        }
    }

    // ========================================================================
    // Typed core
    // ========================================================================

    fn read_native(&self, name: &str, kind: PropertyType) -> Result<Option<Value>> {
        self.ensure_running()?;
        match self.client.get_property(name, kind.native_format()) {
            Ok(node) => Ok(from_native(kind, node)),
            Err(code) => {
                code.check([name])?;
                Ok(None)
            }
        }
    }

    fn write_native(&self, name: &str, format: Format, node: &Node, shown: String) -> Result<()> {
        self.ensure_running()?;
        match self.client.set_property(name, format, node) {
            Ok(()) => Ok(()),
            Err(code) => Ok(code.check([name.to_string(), shown])?),
        }
    }

    fn write_value(&self, name: &str, spec: Option<&PropertySpec>, value: Value) -> Result<()> {
        let shown = value.to_string();
        let (format, node) = match spec {
            Some(spec) => to_native(spec, value)?,
            None => (Format::Node, value.into_node()),
        };
        self.write_native(name, format, &node, shown)
    }

    // ========================================================================
    // Name-indexed access
    // ========================================================================

    /// Read a property by hyphenated name.
    ///
    /// Table properties are coerced to their declared type; any other name is
    /// read untyped. `options/` and `file-local-options/` prefixes are
    /// accepted. A failure reported by the player is returned, never replaced
    /// by a default.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        let kind = spec_for(name).map_or(PropertyType::Raw(Format::Node), |spec| spec.kind);
        self.read_native(name, kind)
    }

    /// Read a property and convert it to `T`.
    pub fn get_as<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: TryFrom<Value, Error = ValueError>,
    {
        match self.get(name)? {
            Some(value) => Ok(Some(T::try_from(value)?)),
            None => Ok(None),
        }
    }

    /// Write a property by hyphenated name, coercing to its declared type.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.write_value(name, spec_for(name), value.into())
    }

    /// Read a table property by attribute name (`osd_level`).
    pub fn get_attr(&self, attribute: &str) -> Result<Option<Value>> {
        let spec = lookup_attribute(attribute)
            .ok_or_else(|| SdkError::UnknownProperty(attribute.to_string()))?;
        self.read_property(spec)
    }

    /// Write a table property by attribute name.
    pub fn set_attr(&self, attribute: &str, value: impl Into<Value>) -> Result<()> {
        let spec = lookup_attribute(attribute)
            .ok_or_else(|| SdkError::UnknownProperty(attribute.to_string()))?;
        self.write_property(spec, value.into())
    }

    pub fn option(&self, name: &str) -> Result<Option<Value>> {
        self.get(&format!("{OPTION_PREFIX}{name}"))
    }

    pub fn set_option(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set(&format!("{OPTION_PREFIX}{name}"), value)
    }

    /// Option value that only applies to the current file.
    pub fn file_local_option(&self, name: &str) -> Result<Option<Value>> {
        self.get(&format!("{FILE_LOCAL_PREFIX}{name}"))
    }

    pub fn set_file_local_option(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set(&format!("{FILE_LOCAL_PREFIX}{name}"), value)
    }

    /// Every option name the player declares.
    pub fn option_names(&self) -> Result<Vec<String>> {
        self.name_list("options")
    }

    /// Every property name the player declares.
    pub fn property_names(&self) -> Result<Vec<String>> {
        self.name_list("property-list")
    }

    fn name_list(&self, name: &str) -> Result<Vec<String>> {
        match self.get_as::<CommaList>(name)? {
            Some(list) => Ok(list.0),
            None => Ok(Vec::new()),
        }
    }

    /// Typed handle for a table property.
    pub fn property<P: MpvProperty>(&self) -> PropertyHandle<'_, Self, P> {
        PropertyHandle::new(self)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Run a command synchronously.
    pub fn command(&self, args: &[&str]) -> Result<Node> {
        self.ensure_running()?;
        tracing::debug!(?args, "Running command");
        match self.client.command(args) {
            Ok(node) => Ok(node),
            Err(code) => {
                code.check(args.iter().copied())?;
                Ok(Node::None)
            }
        }
    }

    /// Queue a command and return a ticket for its reply.
    pub fn command_async(&self, args: &[&str]) -> Result<EventTicket> {
        self.ensure_running()?;
        Ok(self.events.command_async(args)?)
    }

    /// Wait for the reply to an asynchronous command and return its result.
    pub fn wait_for_reply(&self, ticket: EventTicket, timeout: Option<Duration>) -> Result<Node> {
        let reply = self.events.wait(ticket, timeout)?;
        let command = reply.reply_userdata.to_string();
        reply.error.check([command])?;
        Ok(reply
            .as_command_reply()
            .map(|reply| reply.result.clone())
            .unwrap_or_default())
    }

    /// Load and play `path`, replacing the playlist.
    ///
    /// A later [`wait_for_playback`](Self::wait_for_playback) waits for the end
    /// of this file even if it finishes before the wait starts.
    pub fn play(&self, path: &str) -> Result<()> {
        self.ensure_running()?;
        *self.playback.lock() = Some(self.events.expect_event(EventId::EndFile));
        if let Err(err) = self.loadfile(path, LoadMode::Replace) {
            self.playback.lock().take();
            return Err(err);
        }
        Ok(())
    }

    pub fn loadfile(&self, path: &str, mode: LoadMode) -> Result<()> {
        self.command(&["loadfile", path, mode.as_str()]).map(drop)
    }

    /// Stop playback and clear the playlist.
    pub fn stop(&self) -> Result<()> {
        self.command(&["stop"]).map(drop)
    }

    pub fn seek(&self, amount: f64, mode: SeekMode) -> Result<()> {
        self.command(&["seek", &amount.to_string(), mode.as_str()])
            .map(drop)
    }

    pub fn playlist_next(&self) -> Result<()> {
        self.command(&["playlist-next"]).map(drop)
    }

    pub fn playlist_prev(&self) -> Result<()> {
        self.command(&["playlist-prev"]).map(drop)
    }

    pub fn playlist_clear(&self) -> Result<()> {
        self.command(&["playlist-clear"]).map(drop)
    }

    /// Toggle a flag property.
    pub fn cycle(&self, name: &str) -> Result<()> {
        self.command(&["cycle", name]).map(drop)
    }

    /// Add `delta` to a numeric property.
    pub fn add(&self, name: &str, delta: f64) -> Result<()> {
        self.command(&["add", name, &delta.to_string()]).map(drop)
    }

    pub fn show_text(&self, text: &str) -> Result<()> {
        self.command(&["show-text", text]).map(drop)
    }

    /// Ask the player to shut down. Waiters are woken once it does; the
    /// handle is still destroyed by [`terminate`](Self::terminate).
    pub fn quit(&self) -> Result<()> {
        self.command(&["quit"]).map(drop)
    }

    // ========================================================================
    // Waiting
    // ========================================================================

    /// Block until the current file ends, returning the end-file event.
    ///
    /// Fails with a terminated error if the player shuts down first.
    pub fn wait_for_playback(&self) -> Result<Event> {
        let ticket = self
            .playback
            .lock()
            .take()
            .unwrap_or_else(|| self.events.expect_event(EventId::EndFile));
        Ok(self.events.wait(ticket, None)?)
    }

    /// Block until the next event of kind `event_id`.
    pub fn wait_for_event(&self, event_id: EventId, timeout: Option<Duration>) -> Result<Event> {
        self.ensure_running()?;
        Ok(self.events.wait_for_event(event_id, timeout)?)
    }

    /// Ticket for the next event of kind `event_id`, to pass to [`wait`](Self::wait).
    pub fn expect_event(&self, event_id: EventId) -> EventTicket {
        self.events.expect_event(event_id)
    }

    pub fn wait(&self, ticket: EventTicket, timeout: Option<Duration>) -> Result<Event> {
        Ok(self.events.wait(ticket, timeout)?)
    }

    /// Deliver queued events on this thread. Only for players built without
    /// an event thread.
    pub fn dispatch_pending(&self, timeout: Duration) -> Result<usize> {
        self.ensure_running()?;
        Ok(self.events.dispatch_pending(timeout)?)
    }

    // ========================================================================
    // Observers and callbacks
    // ========================================================================

    /// Call `handler` with `(name, value)` whenever `name` changes.
    ///
    /// Returns the handle to pass to [`unobserve_property`](Self::unobserve_property).
    pub fn observe_property<F>(&self, name: &str, handler: F) -> Result<ObserverHandle>
    where
        F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
    {
        let handle = ObserverHandle::from_fn(handler);
        self.observe_property_with(name, handle.clone())?;
        Ok(handle)
    }

    /// Subscribe an existing handle, for example one shared across properties.
    pub fn observe_property_with(&self, name: &str, handler: ObserverHandle) -> Result<()> {
        self.ensure_running()?;
        self.events.observe_property(name, handler)?;
        Ok(())
    }

    /// Unsubscribe `handler` from `name`. Never fails; unknown pairs are ignored.
    pub fn unobserve_property(&self, name: &str, handler: &ObserverHandle) -> bool {
        self.events.unobserve_property(name, handler)
    }

    /// Subscribe one handler to several properties at once.
    ///
    /// ```rust,ignore
    /// let group = mpv.property_observer(&["pause", "mute"], |name, value| {
    ///     println!("{name}: {value:?}");
    /// })?;
    /// group.observe("volume")?;
    /// group.unobserve_mpv_properties();
    /// ```
    pub fn property_observer<F>(&self, names: &[&str], handler: F) -> Result<ObserverGroup>
    where
        F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
    {
        self.ensure_running()?;
        let group = ObserverGroup::new(Arc::clone(&self.events), ObserverHandle::from_fn(handler));
        for name in names {
            group.observe(name)?;
        }
        Ok(group)
    }

    /// Call `callback` with every event.
    pub fn register_event_callback<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handle = CallbackHandle::from_fn(callback);
        self.events.register_event_callback(handle.clone());
        handle
    }

    pub fn register_event_callback_with(&self, callback: CallbackHandle) -> bool {
        self.events.register_event_callback(callback)
    }

    /// Remove a callback. Once this returns it is not called again.
    pub fn unregister_event_callback(&self, callback: &CallbackHandle) -> bool {
        self.events.unregister_event_callback(callback)
    }

    /// Blocking iterator over events from now on. Ends at termination.
    pub fn events(&self) -> EventIterator {
        self.events.events()
    }

    /// Install or remove the log handler.
    pub fn set_log_handler(&self, handler: Option<LogHandle>) -> Result<()> {
        self.ensure_running()?;
        Ok(self.events.set_log_handler(handler)?)
    }

    pub fn event_manager(&self) -> &Arc<EventManager> {
        &self.events
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Shut the player down. Idempotent.
    ///
    /// Stops the event thread, destroys the native handle, then releases every
    /// observer and callback. Blocked waiters are woken with a terminated
    /// error. When called from inside a callback the join and destroy happen
    /// on a short-lived reaper thread once the callback returns.
    pub fn terminate(&self) {
        {
            let mut state = self.state.lock();
            if *state == LifecycleState::Terminated {
                return;
            }
            *state = LifecycleState::Terminated;
        }
        tracing::info!("Terminating player");
        self.playback.lock().take();

        match self.events.stop() {
            StopOutcome::Deferred(handle) => {
                let client = Arc::clone(&self.client);
                let events = Arc::clone(&self.events);
                let reaper = thread::Builder::new()
                    .name("mpv-reaper".to_string())
                    .spawn(move || {
                        handle.join();
                        client.terminate_destroy();
                        events.release();
                    });
                if let Err(err) = reaper {
                    tracing::error!(error = %err, "Failed to spawn reaper thread, destroying inline");
                    self.client.terminate_destroy();
                    self.events.release();
                }
            }
            StopOutcome::Joined | StopOutcome::NotRunning => {
                self.client.terminate_destroy();
                self.events.release();
            }
        }
    }
}

fn spec_for(name: &str) -> Option<&'static PropertySpec> {
    let base = name
        .strip_prefix(OPTION_PREFIX)
        .or_else(|| name.strip_prefix(FILE_LOCAL_PREFIX))
        .unwrap_or(name);
    lookup(base)
}

impl PropertyHost for Mpv {
    type Error = SdkError;

    fn read_property(&self, spec: &PropertySpec) -> Result<Option<Value>> {
        self.read_native(spec.name, spec.kind)
    }

    fn write_property(&self, spec: &PropertySpec, value: Value) -> Result<()> {
        self.write_value(spec.name, Some(spec), value)
    }
}

impl Drop for Mpv {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for Mpv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mpv")
            .field("state", &self.lifecycle_state())
            .field("events", &self.events)
            .finish()
    }
}
