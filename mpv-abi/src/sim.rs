//! Deterministic in-process stand-in for libmpv
//!
//! [`SimulatedMpv`] implements [`NativeClient`] on top of a small typed property
//! store and an event queue. It follows the native rules that matter to the
//! binding: format conversion on get/set, `no-` prefixed flag options,
//! property-change events only when a value actually changes, wakeups that
//! interrupt a blocking wait, and the file lifecycle events emitted by
//! `loadfile`. Playback finishes instantly unless manual playback is enabled.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::client::NativeClient;
use crate::error::{ErrorCode, NativeResult};
use crate::event::{
    ClientMessage, CommandReply, EndFile, EndFileReason, Event, EventId, EventPayload, StartFile,
};
use crate::format::Format;
use crate::node::Node;

const LOG_LEVELS: &[&str] = &["fatal", "error", "warn", "info", "status", "v", "debug", "trace"];

const OPTION_ALIASES: &[(&str, &str)] = &[("fs", "fullscreen"), ("vid", "video"), ("aid", "audio")];

const LOOP_PROPERTIES: &[&str] = &["loop", "loop-file", "loop-playlist"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Flag,
    Int,
    Double,
    Str,
    Node,
}

#[derive(Debug, Clone, Copy)]
enum Init {
    Unset,
    Flag(bool),
    Int(i64),
    Double(f64),
    Str(&'static str),
    EmptyList,
}

const RW: bool = true;
const RO: bool = false;

#[rustfmt::skip]
const DEFAULTS: &[(&str, Kind, Init, bool)] = &[
    ("ab-loop-a", Kind::Str, Init::Str("no"), RW),
    ("ab-loop-b", Kind::Str, Init::Str("no"), RW),
    ("alang", Kind::Str, Init::Str(""), RW),
    ("ao", Kind::Str, Init::Str(""), RW),
    ("audio", Kind::Str, Init::Str("auto"), RW),
    ("audio-delay", Kind::Double, Init::Double(0.0), RW),
    ("audio-device-list", Kind::Node, Init::EmptyList, RO),
    ("audio-display", Kind::Str, Init::Str("embedded-first"), RW),
    ("border", Kind::Flag, Init::Flag(true), RW),
    ("brightness", Kind::Int, Init::Int(0), RW),
    ("chapter", Kind::Int, Init::Unset, RW),
    ("chapter-list", Kind::Node, Init::EmptyList, RO),
    ("chapters", Kind::Int, Init::Unset, RO),
    ("config", Kind::Flag, Init::Flag(false), RW),
    ("contrast", Kind::Int, Init::Int(0), RW),
    ("core-idle", Kind::Flag, Init::Flag(true), RO),
    ("cursor-autohide", Kind::Str, Init::Str("1000"), RW),
    ("cursor-autohide-fs-only", Kind::Flag, Init::Flag(false), RW),
    ("deinterlace", Kind::Str, Init::Str("no"), RW),
    ("duration", Kind::Double, Init::Unset, RO),
    ("end", Kind::Str, Init::Str("none"), RW),
    ("eof-reached", Kind::Flag, Init::Unset, RO),
    ("file-format", Kind::Str, Init::Unset, RO),
    ("filename", Kind::Str, Init::Unset, RO),
    ("force-window", Kind::Str, Init::Str("no"), RW),
    ("fullscreen", Kind::Flag, Init::Flag(false), RW),
    ("gamma", Kind::Int, Init::Int(0), RW),
    ("geometry", Kind::Str, Init::Str(""), RW),
    ("hue", Kind::Int, Init::Int(0), RW),
    ("hwdec", Kind::Str, Init::Str("no"), RW),
    ("idle", Kind::Str, Init::Str("no"), RW),
    ("idle-active", Kind::Flag, Init::Flag(true), RO),
    ("image-display-duration", Kind::Double, Init::Double(5.0), RW),
    ("input-default-bindings", Kind::Flag, Init::Flag(false), RW),
    ("input-ipc-server", Kind::Str, Init::Str(""), RW),
    ("input-vo-keyboard", Kind::Flag, Init::Flag(false), RW),
    ("keep-open", Kind::Str, Init::Str("no"), RW),
    ("loop", Kind::Str, Init::Str("no"), RW),
    ("loop-file", Kind::Str, Init::Str("no"), RW),
    ("loop-playlist", Kind::Str, Init::Str("no"), RW),
    ("media-title", Kind::Str, Init::Unset, RO),
    ("metadata", Kind::Node, Init::Unset, RO),
    ("mpv-version", Kind::Str, Init::Str("mpv 0.38.0"), RO),
    ("msg-level", Kind::Str, Init::Str(""), RW),
    ("mute", Kind::Flag, Init::Flag(false), RW),
    ("ontop", Kind::Flag, Init::Flag(false), RW),
    ("osc", Kind::Flag, Init::Flag(false), RW),
    ("osd-level", Kind::Int, Init::Int(1), RW),
    ("path", Kind::Str, Init::Unset, RO),
    ("pause", Kind::Flag, Init::Flag(false), RW),
    ("percent-pos", Kind::Double, Init::Unset, RW),
    ("pid", Kind::Int, Init::Int(4242), RO),
    ("playlist", Kind::Node, Init::EmptyList, RO),
    ("playlist-count", Kind::Int, Init::Int(0), RO),
    ("playlist-pos", Kind::Int, Init::Int(-1), RW),
    ("saturation", Kind::Int, Init::Int(0), RW),
    ("screenshot-directory", Kind::Str, Init::Str(""), RW),
    ("screenshot-format", Kind::Str, Init::Str("jpg"), RW),
    ("seeking", Kind::Flag, Init::Flag(false), RO),
    ("slang", Kind::Str, Init::Str(""), RW),
    ("speed", Kind::Double, Init::Double(1.0), RW),
    ("start", Kind::Str, Init::Str("none"), RW),
    ("sub-delay", Kind::Double, Init::Double(0.0), RW),
    ("sub-scale", Kind::Double, Init::Double(1.0), RW),
    ("sub-visibility", Kind::Flag, Init::Flag(true), RW),
    ("terminal", Kind::Flag, Init::Flag(false), RW),
    ("time-pos", Kind::Double, Init::Unset, RW),
    ("time-remaining", Kind::Double, Init::Unset, RO),
    ("title", Kind::Str, Init::Str("${?media-title:${media-title}}${!media-title:No file}"), RW),
    ("track-list", Kind::Node, Init::EmptyList, RO),
    ("video", Kind::Str, Init::Str("auto"), RW),
    ("vo", Kind::Str, Init::Str(""), RW),
    ("volume", Kind::Double, Init::Double(100.0), RW),
    ("volume-max", Kind::Double, Init::Double(130.0), RW),
    ("window-scale", Kind::Double, Init::Double(1.0), RW),
    ("ytdl", Kind::Flag, Init::Flag(false), RW),
];

/// Simulated media duration in seconds.
const MEDIA_DURATION: f64 = 5.0;

#[derive(Debug, Clone)]
struct SimProperty {
    kind: Kind,
    value: Option<Node>,
    writable: bool,
}

#[derive(Debug)]
struct Observer {
    id: u64,
    name: String,
    format: Format,
}

#[derive(Debug, Default)]
struct SimState {
    initialized: bool,
    destroyed: bool,
    properties: BTreeMap<String, SimProperty>,
    observers: Vec<Observer>,
    log_level: Option<usize>,
    manual_playback: bool,
    initial_notifications: bool,
    playing: Option<i64>,
    next_entry_id: i64,
}

#[derive(Debug, Default)]
struct EventQueue {
    pending: VecDeque<Event>,
    wakeups: usize,
    closed: bool,
}

/// A simulated player instance.
///
/// # Example
///
/// ```rust,ignore
/// let sim = Arc::new(SimulatedMpv::new());
/// sim.set_option_string("fs", "")?;
/// sim.initialize()?;
/// assert_eq!(sim.property_value("fullscreen"), Some(Node::Flag(true)));
/// ```
///
/// Observers only hear about changes by default. libmpv also sends the
/// current value right after a property is observed; enable that with
/// [`set_initial_notifications`](Self::set_initial_notifications).
///
/// Lock order is always state before queue.
#[derive(Debug)]
pub struct SimulatedMpv {
    state: Mutex<SimState>,
    queue: Mutex<EventQueue>,
    ready: Condvar,
}

impl Default for SimulatedMpv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedMpv {
    pub fn new() -> Self {
        let properties = DEFAULTS
            .iter()
            .map(|(name, kind, init, writable)| {
                let value = match init {
                    Init::Unset => None,
                    Init::Flag(b) => Some(Node::Flag(*b)),
                    Init::Int(i) => Some(Node::Int64(*i)),
                    Init::Double(d) => Some(Node::Double(*d)),
                    Init::Str(s) => Some(Node::String((*s).to_string())),
                    Init::EmptyList => Some(Node::Array(Vec::new())),
                };
                let property = SimProperty {
                    kind: *kind,
                    value,
                    writable: *writable,
                };
                ((*name).to_string(), property)
            })
            .collect();

        Self {
            state: Mutex::new(SimState {
                properties,
                next_entry_id: 1,
                ..SimState::default()
            }),
            queue: Mutex::new(EventQueue::default()),
            ready: Condvar::new(),
        }
    }

    /// Keep files "playing" after `loadfile` until [`finish_playback`](Self::finish_playback).
    pub fn set_manual_playback(&self, manual: bool) {
        self.state.lock().manual_playback = manual;
    }

    /// Send each new observer the property's current value, as libmpv does.
    pub fn set_initial_notifications(&self, enabled: bool) {
        self.state.lock().initial_notifications = enabled;
    }

    /// End the current file as if it reached its end.
    pub fn finish_playback(&self) {
        let mut state = self.state.lock();
        self.finish_file(&mut state, EndFileReason::Eof, ErrorCode::SUCCESS);
    }

    /// Queue an arbitrary event.
    pub fn push_event(&self, event: Event) {
        let mut queue = self.queue.lock();
        queue.pending.push_back(event);
        self.ready.notify_all();
    }

    /// Current raw value of a property, `None` if unset or unknown.
    pub fn property_value(&self, name: &str) -> Option<Node> {
        let state = self.state.lock();
        let name = resolve_alias(name);
        state.properties.get(name).and_then(|p| p.value.clone())
    }

    /// Number of live native observer registrations.
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// Property names with at least one native registration.
    pub fn observed_names(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut names: Vec<String> = state.observers.iter().map(|o| o.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing.is_some()
    }

    /// Minimum log level requested by the client, if any.
    pub fn log_level(&self) -> Option<&'static str> {
        self.state.lock().log_level.map(|rank| LOG_LEVELS[rank])
    }

    /// Events queued but not yet taken by `wait_event`.
    pub fn pending_events(&self) -> usize {
        self.queue.lock().pending.len()
    }

    fn live(&self) -> NativeResult<parking_lot::MutexGuard<'_, SimState>> {
        let state = self.state.lock();
        if state.destroyed {
            return Err(ErrorCode::UNINITIALIZED);
        }
        Ok(state)
    }

    /// Store a value, emitting change events to observers when it differs.
    fn update(&self, state: &mut SimState, name: &str, value: Option<Node>) {
        let Some(property) = state.properties.get_mut(name) else {
            return;
        };
        if property.value == value {
            return;
        }
        property.value = value.clone();

        let events: Vec<Event> = state
            .observers
            .iter()
            .filter(|o| o.name == name)
            .map(|o| {
                let rendered = value
                    .as_ref()
                    .and_then(|v| render(v, o.format).ok());
                Event::property_change(o.id, name, rendered)
            })
            .collect();
        self.enqueue(events);
    }

    fn enqueue(&self, events: impl IntoIterator<Item = Event>) {
        let mut queue = self.queue.lock();
        let before = queue.pending.len();
        queue.pending.extend(events);
        if queue.pending.len() != before {
            self.ready.notify_all();
        }
    }

    fn logs_enabled(state: &SimState, level: &str) -> bool {
        let rank = LOG_LEVELS.iter().position(|l| *l == level);
        matches!((state.log_level, rank), (Some(max), Some(rank)) if rank <= max)
    }

    fn set_typed(&self, state: &mut SimState, name: &str, value: &Node) -> NativeResult<()> {
        let property = state
            .properties
            .get(name)
            .ok_or(ErrorCode::PROPERTY_NOT_FOUND)?;
        if !property.writable {
            return Err(ErrorCode::PROPERTY_ERROR);
        }
        if property.value.is_none() && property.kind != Kind::Node {
            return Err(ErrorCode::PROPERTY_UNAVAILABLE);
        }
        let coerced = coerce(property.kind, value)?;
        if LOOP_PROPERTIES.contains(&name) && !valid_loop_value(&coerced) {
            return Err(ErrorCode::PROPERTY_ERROR);
        }
        self.update(state, name, Some(coerced));
        Ok(())
    }

    fn load_file(&self, state: &mut SimState, path: &str) -> i64 {
        if state.playing.is_some() {
            self.finish_file(state, EndFileReason::Stop, ErrorCode::SUCCESS);
        }
        let entry = state.next_entry_id;
        state.next_entry_id += 1;

        self.enqueue([Event::new(EventId::StartFile)
            .with_payload(EventPayload::StartFile(StartFile { playlist_entry_id: entry }))]);

        if path.is_empty() {
            state.playing = Some(entry);
            self.finish_file(state, EndFileReason::Error, ErrorCode::LOADING_FAILED);
            return entry;
        }

        state.playing = Some(entry);
        let filename = path.rsplit('/').next().unwrap_or(path).to_string();
        self.update(state, "path", Some(Node::from(path)));
        self.update(state, "filename", Some(Node::String(filename.clone())));
        self.update(state, "media-title", Some(Node::String(filename)));
        self.update(state, "file-format", Some(Node::from("webm")));
        self.update(state, "duration", Some(Node::Double(MEDIA_DURATION)));
        self.update(state, "time-pos", Some(Node::Double(0.0)));
        self.update(state, "time-remaining", Some(Node::Double(MEDIA_DURATION)));
        self.update(state, "percent-pos", Some(Node::Double(0.0)));
        self.update(state, "eof-reached", Some(Node::Flag(false)));
        self.update(state, "playlist-count", Some(Node::Int64(1)));
        self.update(state, "playlist-pos", Some(Node::Int64(0)));
        self.update(
            state,
            "playlist",
            Some(Node::Array(vec![Node::Map(vec![
                ("filename".into(), Node::from(path)),
                ("current".into(), Node::Flag(true)),
                ("id".into(), Node::Int64(entry)),
            ])])),
        );
        self.update(
            state,
            "track-list",
            Some(Node::Array(vec![Node::Map(vec![
                ("id".into(), Node::Int64(1)),
                ("type".into(), Node::from("video")),
                ("selected".into(), Node::Flag(true)),
            ])])),
        );
        self.update(state, "metadata", Some(Node::Map(Vec::new())));
        self.update(state, "core-idle", Some(Node::Flag(false)));
        self.update(state, "idle-active", Some(Node::Flag(false)));

        if Self::logs_enabled(state, "info") {
            self.enqueue([Event::log_message("cplayer", "info", format!("Playing: {path}\n"))]);
        }
        self.enqueue([Event::new(EventId::FileLoaded), Event::new(EventId::PlaybackRestart)]);

        if !state.manual_playback {
            self.finish_file(state, EndFileReason::Eof, ErrorCode::SUCCESS);
        }
        entry
    }

    fn finish_file(&self, state: &mut SimState, reason: EndFileReason, error: ErrorCode) {
        let Some(entry) = state.playing.take() else {
            return;
        };
        if reason == EndFileReason::Eof {
            self.update(state, "time-pos", Some(Node::Double(MEDIA_DURATION)));
            self.update(state, "eof-reached", Some(Node::Flag(true)));
        }
        self.enqueue([Event::new(EventId::EndFile).with_payload(EventPayload::EndFile(EndFile {
            reason,
            error,
            playlist_entry_id: entry,
        }))]);

        for name in [
            "path",
            "filename",
            "media-title",
            "file-format",
            "duration",
            "time-pos",
            "time-remaining",
            "percent-pos",
            "eof-reached",
            "metadata",
        ] {
            self.update(state, name, None);
        }
        self.update(state, "track-list", Some(Node::Array(Vec::new())));
        self.update(state, "playlist-pos", Some(Node::Int64(-1)));
        self.update(state, "core-idle", Some(Node::Flag(true)));
        self.update(state, "idle-active", Some(Node::Flag(true)));
        self.enqueue([Event::new(EventId::Idle)]);
    }

    fn run_command(&self, state: &mut SimState, args: &[&str]) -> NativeResult<Node> {
        let (name, rest) = args.split_first().ok_or(ErrorCode::INVALID_PARAMETER)?;
        match (*name, rest) {
            ("loadfile", [path, ..]) => {
                let mode = rest.get(1).copied().unwrap_or("replace");
                if mode == "append" && state.playing.is_some() {
                    let count = state
                        .properties
                        .get("playlist-count")
                        .and_then(|p| p.value.as_ref())
                        .and_then(Node::as_i64)
                        .unwrap_or(0);
                    self.update(state, "playlist-count", Some(Node::Int64(count + 1)));
                    return Ok(Node::None);
                }
                let entry = self.load_file(state, path);
                Ok(Node::Map(vec![("playlist_entry_id".into(), Node::Int64(entry))]))
            }
            ("stop", _) => {
                self.finish_file(state, EndFileReason::Stop, ErrorCode::SUCCESS);
                Ok(Node::None)
            }
            ("set", [prop, value]) => {
                let prop = resolve_alias(prop);
                self.set_typed(state, prop, &Node::from(*value))
                    .map_err(|_| ErrorCode::COMMAND)?;
                Ok(Node::None)
            }
            ("cycle", [prop, ..]) => {
                let prop = resolve_alias(prop);
                let current = state
                    .properties
                    .get(prop)
                    .and_then(|p| p.value.as_ref())
                    .and_then(Node::as_bool)
                    .ok_or(ErrorCode::COMMAND)?;
                self.set_typed(state, prop, &Node::Flag(!current))
                    .map_err(|_| ErrorCode::COMMAND)?;
                Ok(Node::None)
            }
            ("add", [prop, rest @ ..]) => {
                let prop = resolve_alias(prop);
                let delta: f64 = match rest.first() {
                    Some(v) => v.parse().map_err(|_| ErrorCode::INVALID_PARAMETER)?,
                    None => 1.0,
                };
                let current = state
                    .properties
                    .get(prop)
                    .and_then(|p| p.value.clone())
                    .ok_or(ErrorCode::COMMAND)?;
                let next = match current {
                    Node::Int64(i) => Node::Int64(i.saturating_add(delta as i64)),
                    Node::Double(d) => Node::Double(d + delta),
                    _ => return Err(ErrorCode::COMMAND),
                };
                self.set_typed(state, prop, &next)
                    .map_err(|_| ErrorCode::COMMAND)?;
                Ok(Node::None)
            }
            ("seek", [amount, rest @ ..]) => {
                if state.playing.is_none() {
                    return Err(ErrorCode::COMMAND);
                }
                let amount: f64 = amount.parse().map_err(|_| ErrorCode::INVALID_PARAMETER)?;
                let mode = rest.first().copied().unwrap_or("relative");
                let current = state
                    .properties
                    .get("time-pos")
                    .and_then(|p| p.value.as_ref())
                    .and_then(Node::as_f64)
                    .unwrap_or(0.0);
                let target = match mode {
                    "absolute" => amount,
                    "absolute-percent" => MEDIA_DURATION * amount / 100.0,
                    "relative-percent" => current + MEDIA_DURATION * amount / 100.0,
                    _ => current + amount,
                };
                let target = target.clamp(0.0, MEDIA_DURATION);
                self.update(state, "time-pos", Some(Node::Double(target)));
                self.update(state, "time-remaining", Some(Node::Double(MEDIA_DURATION - target)));
                self.update(
                    state,
                    "percent-pos",
                    Some(Node::Double(target / MEDIA_DURATION * 100.0)),
                );
                self.enqueue([Event::new(EventId::Seek), Event::new(EventId::PlaybackRestart)]);
                Ok(Node::None)
            }
            ("playlist-next" | "playlist-prev", _) => Err(ErrorCode::COMMAND),
            ("playlist-clear", _) => Ok(Node::None),
            ("show-text", [_, ..]) => Ok(Node::None),
            ("script-message", args) => {
                let args = args.iter().map(|a| a.to_string()).collect();
                self.enqueue([Event::new(EventId::ClientMessage)
                    .with_payload(EventPayload::ClientMessage(ClientMessage { args }))]);
                Ok(Node::None)
            }
            ("quit", _) => {
                self.finish_file(state, EndFileReason::Quit, ErrorCode::SUCCESS);
                self.enqueue([Event::new(EventId::Shutdown)]);
                Ok(Node::None)
            }
            _ => Err(ErrorCode::INVALID_PARAMETER),
        }
    }

    fn read(&self, state: &SimState, name: &str, format: Format) -> NativeResult<Node> {
        let value = match name {
            "property-list" => Node::Array(
                state
                    .properties
                    .keys()
                    .map(|k| Node::String(k.clone()))
                    .chain(["options", "property-list"].map(Node::from))
                    .collect(),
            ),
            "options" => Node::Array(
                state
                    .properties
                    .iter()
                    .filter(|(_, p)| p.writable)
                    .map(|(k, _)| Node::String(k.clone()))
                    .collect(),
            ),
            _ => {
                let property = state
                    .properties
                    .get(name)
                    .ok_or(ErrorCode::PROPERTY_NOT_FOUND)?;
                property
                    .value
                    .clone()
                    .ok_or(ErrorCode::PROPERTY_UNAVAILABLE)?
            }
        };
        render(&value, format)
    }
}

fn resolve_alias(name: &str) -> &str {
    OPTION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
        .unwrap_or(name)
}

/// Strip the `options/` and `file-local-options/` prefixes.
fn strip_option_prefix(name: &str) -> (&str, bool) {
    if let Some(rest) = name.strip_prefix("options/") {
        (resolve_alias(rest), true)
    } else if let Some(rest) = name.strip_prefix("file-local-options/") {
        (resolve_alias(rest), true)
    } else {
        (name, false)
    }
}

fn valid_loop_value(value: &Node) -> bool {
    match value.as_str() {
        Some("inf" | "no" | "yes" | "force") => true,
        Some(s) => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

fn format_double(d: f64) -> String {
    format!("{d:.6}")
}

/// Convert an incoming value into a property's storage kind.
fn coerce(kind: Kind, value: &Node) -> NativeResult<Node> {
    let converted = match (kind, value) {
        (Kind::Node, v) => Some(v.clone()),
        (Kind::Flag, Node::Flag(b)) => Some(Node::Flag(*b)),
        (Kind::Flag, Node::String(s)) => match s.as_str() {
            "yes" => Some(Node::Flag(true)),
            "no" => Some(Node::Flag(false)),
            _ => None,
        },
        (Kind::Int, Node::Int64(i)) => Some(Node::Int64(*i)),
        (Kind::Int, Node::Double(d)) if d.is_finite() && d.fract() == 0.0 => {
            Some(Node::Int64(*d as i64))
        }
        (Kind::Int, Node::String(s)) => s.parse().ok().map(Node::Int64),
        (Kind::Double, Node::Double(d)) => Some(Node::Double(*d)),
        (Kind::Double, Node::Int64(i)) => Some(Node::Double(*i as f64)),
        (Kind::Double, Node::String(s)) => s.parse().ok().map(Node::Double),
        (Kind::Str, Node::String(s)) => Some(Node::String(s.clone())),
        (Kind::Str, Node::ByteArray(b)) => Some(Node::String(String::from_utf8_lossy(b).into_owned())),
        (Kind::Str, Node::Flag(b)) => Some(Node::from(if *b { "yes" } else { "no" })),
        (Kind::Str, Node::Int64(i)) => Some(Node::String(i.to_string())),
        (Kind::Str, Node::Double(d)) => Some(Node::String(format_double(*d))),
        _ => None,
    };
    converted.ok_or(ErrorCode::PROPERTY_FORMAT)
}

/// Render a stored value in the requested format.
fn render(value: &Node, format: Format) -> NativeResult<Node> {
    let rendered = match (format, value) {
        (Format::None | Format::Node, v) => Some(v.clone()),
        (Format::String | Format::OsdString, v) => match v {
            Node::String(s) => Some(Node::String(s.clone())),
            Node::Flag(b) => Some(Node::from(if *b { "yes" } else { "no" })),
            Node::Int64(i) => Some(Node::String(i.to_string())),
            Node::Double(d) => Some(Node::String(format_double(*d))),
            Node::ByteArray(b) => Some(Node::ByteArray(b.clone())),
            Node::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(|items| Node::String(items.join(","))),
            Node::Map(_) | Node::None => None,
        },
        (Format::Flag, Node::Flag(b)) => Some(Node::Flag(*b)),
        (Format::Int64, Node::Int64(i)) => Some(Node::Int64(*i)),
        (Format::Double, Node::Double(d)) => Some(Node::Double(*d)),
        (Format::Double, Node::Int64(i)) => Some(Node::Double(*i as f64)),
        (Format::NodeArray, Node::Array(_)) | (Format::NodeMap, Node::Map(_)) => Some(value.clone()),
        _ => None,
    };
    rendered.ok_or(ErrorCode::PROPERTY_FORMAT)
}

impl NativeClient for SimulatedMpv {
    fn set_option_string(&self, name: &str, value: &str) -> NativeResult<()> {
        let mut state = self.live()?;

        let (target, flag_value) = match name.strip_prefix("no-") {
            Some(rest) if value.is_empty() && state.properties.contains_key(resolve_alias(rest)) => {
                (resolve_alias(rest), Some(false))
            }
            _ => (resolve_alias(name), value.is_empty().then_some(true)),
        };
        let property = state
            .properties
            .get(target)
            .ok_or(ErrorCode::OPTION_NOT_FOUND)?;
        if !property.writable {
            return Err(ErrorCode::OPTION_NOT_FOUND);
        }

        let node = match (property.kind, flag_value) {
            (Kind::Flag, Some(b)) => Node::Flag(b),
            (Kind::Str, Some(false)) => Node::from("no"),
            (_, Some(_)) => return Err(ErrorCode::OPTION_FORMAT),
            (kind, None) => coerce(kind, &Node::from(value)).map_err(|_| ErrorCode::OPTION_FORMAT)?,
        };
        if LOOP_PROPERTIES.contains(&target) && !valid_loop_value(&node) {
            return Err(ErrorCode::OPTION_ERROR);
        }
        let target = target.to_string();
        self.update(&mut state, &target, Some(node));
        Ok(())
    }

    fn initialize(&self) -> NativeResult<()> {
        let mut state = self.live()?;
        if state.initialized {
            return Err(ErrorCode::INVALID_PARAMETER);
        }
        state.initialized = true;
        Ok(())
    }

    fn get_property(&self, name: &str, format: Format) -> NativeResult<Node> {
        let state = self.live()?;
        let (name, _) = strip_option_prefix(name);
        self.read(&state, name, format)
    }

    fn set_property(&self, name: &str, _format: Format, value: &Node) -> NativeResult<()> {
        let mut state = self.live()?;
        let (name, _) = strip_option_prefix(name);
        let name = name.to_string();
        self.set_typed(&mut state, &name, value)
    }

    fn command(&self, args: &[&str]) -> NativeResult<Node> {
        let mut state = self.live()?;
        self.run_command(&mut state, args)
    }

    fn command_async(&self, reply_userdata: u64, args: &[&str]) -> NativeResult<()> {
        let mut state = self.live()?;
        let (error, result) = match self.run_command(&mut state, args) {
            Ok(node) => (ErrorCode::SUCCESS, node),
            Err(code) => (code, Node::None),
        };
        self.enqueue([Event::new(EventId::CommandReply)
            .with_reply_userdata(reply_userdata)
            .with_error(error)
            .with_payload(EventPayload::CommandReply(CommandReply { result }))]);
        Ok(())
    }

    fn observe_property(&self, reply_userdata: u64, name: &str, format: Format) -> NativeResult<()> {
        let mut state = self.live()?;
        state.observers.push(Observer {
            id: reply_userdata,
            name: name.to_string(),
            format,
        });
        if state.initial_notifications {
            let current = state
                .properties
                .get(resolve_alias(name))
                .and_then(|p| p.value.as_ref())
                .and_then(|v| render(v, format).ok());
            self.enqueue([Event::property_change(reply_userdata, name, current)]);
        }
        Ok(())
    }

    fn unobserve_property(&self, reply_userdata: u64) -> NativeResult<usize> {
        let mut state = self.live()?;
        let before = state.observers.len();
        state.observers.retain(|o| o.id != reply_userdata);
        Ok(before - state.observers.len())
    }

    fn request_log_messages(&self, min_level: &str) -> NativeResult<()> {
        let mut state = self.live()?;
        state.log_level = match min_level {
            "no" => None,
            "terminal-default" => LOG_LEVELS.iter().position(|l| *l == "status"),
            level => Some(
                LOG_LEVELS
                    .iter()
                    .position(|l| *l == level)
                    .ok_or(ErrorCode::INVALID_PARAMETER)?,
            ),
        };
        Ok(())
    }

    fn wait_event(&self, timeout: f64) -> Event {
        let mut queue = self.queue.lock();
        loop {
            if let Some(event) = queue.pending.pop_front() {
                return event;
            }
            if queue.wakeups > 0 {
                queue.wakeups -= 1;
                return Event::none();
            }
            if queue.closed {
                return Event::new(EventId::Shutdown);
            }
            if timeout == 0.0 {
                return Event::none();
            }
            if timeout < 0.0 {
                self.ready.wait(&mut queue);
            } else if self
                .ready
                .wait_for(&mut queue, Duration::from_secs_f64(timeout))
                .timed_out()
            {
                return Event::none();
            }
        }
    }

    fn wakeup(&self) {
        let mut queue = self.queue.lock();
        queue.wakeups += 1;
        self.ready.notify_all();
    }

    fn terminate_destroy(&self) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.observers.clear();
        drop(state);

        self.queue.lock().closed = true;
        self.ready.notify_all();
        tracing::debug!("Destroyed simulated mpv instance");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sim: &SimulatedMpv) -> Vec<Event> {
        std::iter::from_fn(|| {
            let event = sim.wait_event(0.0);
            (!event.is_none()).then_some(event)
        })
        .collect()
    }

    #[test]
    fn test_flag_options() {
        let sim = SimulatedMpv::new();
        sim.set_option_string("fs", "").unwrap();
        sim.set_option_string("no-video", "").unwrap();
        sim.set_option_string("cursor-autohide-fs-only", "").unwrap();

        assert_eq!(sim.property_value("fullscreen"), Some(Node::Flag(true)));
        assert_eq!(sim.property_value("video"), Some(Node::from("no")));
        assert_eq!(sim.property_value("cursor-autohide-fs-only"), Some(Node::Flag(true)));
    }

    #[test]
    fn test_unknown_option() {
        let sim = SimulatedMpv::new();
        assert_eq!(
            sim.set_option_string("this-option-does-not-exist", ""),
            Err(ErrorCode::OPTION_NOT_FOUND)
        );
        assert_eq!(sim.set_option_string("osd-level", ""), Err(ErrorCode::OPTION_FORMAT));
        assert_eq!(sim.set_option_string("loop", "sometimes"), Err(ErrorCode::OPTION_ERROR));
    }

    #[test]
    fn test_get_formats() {
        let sim = SimulatedMpv::new();
        assert_eq!(sim.get_property("osd-level", Format::Int64), Ok(Node::Int64(1)));
        assert_eq!(sim.get_property("osd-level", Format::String), Ok(Node::from("1")));
        assert_eq!(sim.get_property("volume", Format::String), Ok(Node::from("100.000000")));
        assert_eq!(sim.get_property("mute", Format::String), Ok(Node::from("no")));
        assert_eq!(sim.get_property("mute", Format::Int64), Err(ErrorCode::PROPERTY_FORMAT));
        assert_eq!(
            sim.get_property("duration", Format::Double),
            Err(ErrorCode::PROPERTY_UNAVAILABLE)
        );
        assert_eq!(
            sim.get_property("no-such-property", Format::Node),
            Err(ErrorCode::PROPERTY_NOT_FOUND)
        );
    }

    #[test]
    fn test_option_prefix_reads_same_storage() {
        let sim = SimulatedMpv::new();
        sim.set_option_string("loop", "inf").unwrap();
        assert_eq!(sim.get_property("options/loop", Format::String), Ok(Node::from("inf")));
        assert_eq!(sim.get_property("options/fs", Format::Flag), Ok(Node::Flag(false)));
    }

    #[test]
    fn test_set_rules() {
        let sim = SimulatedMpv::new();
        assert_eq!(sim.set_property("core-idle", Format::Flag, &Node::Flag(false)), Err(ErrorCode::PROPERTY_ERROR));
        assert_eq!(sim.set_property("mute", Format::Int64, &Node::Int64(1)), Err(ErrorCode::PROPERTY_FORMAT));
        assert_eq!(sim.set_property("time-pos", Format::Double, &Node::Double(1.0)), Err(ErrorCode::PROPERTY_UNAVAILABLE));
        sim.set_property("volume", Format::Double, &Node::Double(f64::NAN)).unwrap();
        sim.set_property("osd-level", Format::Int64, &Node::Int64(-1)).unwrap();
    }

    #[test]
    fn test_observer_sees_changes_only() {
        let sim = SimulatedMpv::new();
        sim.observe_property(9, "mute", Format::Node).unwrap();
        sim.set_property("mute", Format::Flag, &Node::Flag(false)).unwrap();
        assert!(drain(&sim).is_empty());

        sim.set_property("mute", Format::Flag, &Node::Flag(true)).unwrap();
        let events = drain(&sim);
        assert_eq!(events, vec![Event::property_change(9, "mute", Some(Node::Flag(true)))]);

        assert_eq!(sim.unobserve_property(9), Ok(1));
        assert_eq!(sim.unobserve_property(9), Ok(0));
    }

    #[test]
    fn test_initial_notification_carries_current_value() {
        let sim = SimulatedMpv::new();
        sim.set_initial_notifications(true);
        sim.set_option_string("loop", "inf").unwrap();
        sim.observe_property(4, "loop", Format::String).unwrap();
        sim.observe_property(5, "duration", Format::Double).unwrap();

        assert_eq!(
            drain(&sim),
            vec![
                Event::property_change(4, "loop", Some(Node::String("inf".into()))),
                Event::property_change(5, "duration", None),
            ]
        );
    }

    #[test]
    fn test_add_saturates_at_integer_bounds() {
        let sim = SimulatedMpv::new();
        sim.set_property("osd-level", Format::Int64, &Node::Int64(i64::MAX - 1))
            .unwrap();
        sim.command(&["add", "osd-level", "10"]).unwrap();
        assert_eq!(sim.property_value("osd-level"), Some(Node::Int64(i64::MAX)));
    }

    #[test]
    fn test_loadfile_lifecycle_events() {
        let sim = SimulatedMpv::new();
        sim.request_log_messages("info").unwrap();
        sim.command(&["loadfile", "/media/test.webm"]).unwrap();

        let ids: Vec<EventId> = drain(&sim).iter().map(|e| e.event_id).collect();
        assert_eq!(
            ids,
            vec![
                EventId::StartFile,
                EventId::LogMessage,
                EventId::FileLoaded,
                EventId::PlaybackRestart,
                EventId::EndFile,
                EventId::Idle,
            ]
        );
        assert!(!sim.is_playing());
    }

    #[test]
    fn test_manual_playback() {
        let sim = SimulatedMpv::new();
        sim.set_manual_playback(true);
        sim.command(&["loadfile", "clip.webm"]).unwrap();
        assert!(sim.is_playing());
        assert_eq!(sim.get_property("duration", Format::Double), Ok(Node::Double(5.0)));
        sim.command(&["seek", "50", "absolute-percent"]).unwrap();
        assert_eq!(sim.property_value("time-pos"), Some(Node::Double(2.5)));

        sim.finish_playback();
        assert!(!sim.is_playing());
        assert!(drain(&sim).iter().any(|e| e.event_id == EventId::EndFile));
    }

    #[test]
    fn test_command_async_reply() {
        let sim = SimulatedMpv::new();
        sim.command_async(77, &["frobnicate"]).unwrap();
        let reply = sim.wait_event(0.0);
        assert_eq!(reply.event_id, EventId::CommandReply);
        assert_eq!(reply.reply_userdata, 77);
        assert_eq!(reply.error, ErrorCode::INVALID_PARAMETER);
    }

    #[test]
    fn test_wakeup_interrupts_blocking_wait() {
        let sim = std::sync::Arc::new(SimulatedMpv::new());
        let waiter = {
            let sim = sim.clone();
            std::thread::spawn(move || sim.wait_event(-1.0))
        };
        std::thread::sleep(Duration::from_millis(20));
        sim.wakeup();
        assert!(waiter.join().unwrap().is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let sim = SimulatedMpv::new();
        sim.terminate_destroy();
        sim.terminate_destroy();
        assert!(sim.is_destroyed());
        assert_eq!(sim.initialize(), Err(ErrorCode::UNINITIALIZED));
        assert_eq!(sim.wait_event(-1.0).event_id, EventId::Shutdown);
    }
}
