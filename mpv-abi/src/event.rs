//! Events produced by the native event queue
//!
//! Events are copied out of native memory as soon as they are received, so an
//! [`Event`] owns all of its data and can be handed to any number of callbacks.

use serde::{Serialize, Serializer};

use crate::error::ErrorCode;
use crate::node::Node;

/// Kind of an event, with the native numeric ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EventId {
    None = 0,
    Shutdown = 1,
    LogMessage = 2,
    GetPropertyReply = 3,
    SetPropertyReply = 4,
    CommandReply = 5,
    StartFile = 6,
    EndFile = 7,
    FileLoaded = 8,
    TracksChanged = 9,
    TrackSwitched = 10,
    Idle = 11,
    Pause = 12,
    Unpause = 13,
    Tick = 14,
    ScriptInputDispatch = 15,
    ClientMessage = 16,
    VideoReconfig = 17,
    AudioReconfig = 18,
    MetadataUpdate = 19,
    Seek = 20,
    PlaybackRestart = 21,
    PropertyChange = 22,
    ChapterChange = 23,
    QueueOverflow = 24,
    Hook = 25,
}

impl EventId {
    pub const ALL: [EventId; 26] = [
        EventId::None,
        EventId::Shutdown,
        EventId::LogMessage,
        EventId::GetPropertyReply,
        EventId::SetPropertyReply,
        EventId::CommandReply,
        EventId::StartFile,
        EventId::EndFile,
        EventId::FileLoaded,
        EventId::TracksChanged,
        EventId::TrackSwitched,
        EventId::Idle,
        EventId::Pause,
        EventId::Unpause,
        EventId::Tick,
        EventId::ScriptInputDispatch,
        EventId::ClientMessage,
        EventId::VideoReconfig,
        EventId::AudioReconfig,
        EventId::MetadataUpdate,
        EventId::Seek,
        EventId::PlaybackRestart,
        EventId::PropertyChange,
        EventId::ChapterChange,
        EventId::QueueOverflow,
        EventId::Hook,
    ];

    pub fn from_raw(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Event name as printed by libmpv.
    pub fn name(self) -> &'static str {
        match self {
            EventId::None => "none",
            EventId::Shutdown => "shutdown",
            EventId::LogMessage => "log-message",
            EventId::GetPropertyReply => "get-property-reply",
            EventId::SetPropertyReply => "set-property-reply",
            EventId::CommandReply => "command-reply",
            EventId::StartFile => "start-file",
            EventId::EndFile => "end-file",
            EventId::FileLoaded => "file-loaded",
            EventId::TracksChanged => "tracks-changed",
            EventId::TrackSwitched => "track-switched",
            EventId::Idle => "idle",
            EventId::Pause => "pause",
            EventId::Unpause => "unpause",
            EventId::Tick => "tick",
            EventId::ScriptInputDispatch => "script-input-dispatch",
            EventId::ClientMessage => "client-message",
            EventId::VideoReconfig => "video-reconfig",
            EventId::AudioReconfig => "audio-reconfig",
            EventId::MetadataUpdate => "metadata-update",
            EventId::Seek => "seek",
            EventId::PlaybackRestart => "playback-restart",
            EventId::PropertyChange => "property-change",
            EventId::ChapterChange => "chapter-change",
            EventId::QueueOverflow => "event-queue-overflow",
            EventId::Hook => "hook",
        }
    }
}

impl Serialize for EventId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_raw())
    }
}

/// Why playback of a file ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EndFileReason {
    Eof = 0,
    Stop = 2,
    Quit = 3,
    Error = 4,
    Redirect = 5,
}

impl EndFileReason {
    pub fn from_raw(reason: i32) -> Option<Self> {
        match reason {
            0 => Some(EndFileReason::Eof),
            2 => Some(EndFileReason::Stop),
            3 => Some(EndFileReason::Quit),
            4 => Some(EndFileReason::Error),
            5 => Some(EndFileReason::Redirect),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl Serialize for EndFileReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_raw())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEvent {
    pub name: String,
    /// `None` when the property is currently unavailable.
    pub value: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessage {
    pub prefix: String,
    pub level: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartFile {
    pub playlist_entry_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndFile {
    pub reason: EndFileReason,
    pub error: ErrorCode,
    pub playlist_entry_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMessage {
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReply {
    pub result: Node,
}

/// Kind-specific event data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Property(PropertyEvent),
    Log(LogMessage),
    StartFile(StartFile),
    EndFile(EndFile),
    ClientMessage(ClientMessage),
    CommandReply(CommandReply),
}

/// One event taken off the native queue.
///
/// Serializes to `{event_id, error, reply_userdata, event}` where `event` is
/// the payload or `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub event_id: EventId,
    pub error: ErrorCode,
    pub reply_userdata: u64,
    #[serde(rename = "event")]
    pub payload: Option<EventPayload>,
}

impl Event {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            error: ErrorCode::SUCCESS,
            reply_userdata: 0,
            payload: None,
        }
    }

    /// The empty event returned on timeout or wakeup.
    pub fn none() -> Self {
        Self::new(EventId::None)
    }

    pub fn with_reply_userdata(mut self, reply_userdata: u64) -> Self {
        self.reply_userdata = reply_userdata;
        self
    }

    pub fn with_error(mut self, error: ErrorCode) -> Self {
        self.error = error;
        self
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn property_change(reply_userdata: u64, name: impl Into<String>, value: Option<Node>) -> Self {
        Self::new(EventId::PropertyChange)
            .with_reply_userdata(reply_userdata)
            .with_payload(EventPayload::Property(PropertyEvent {
                name: name.into(),
                value,
            }))
    }

    pub fn log_message(
        prefix: impl Into<String>,
        level: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(EventId::LogMessage).with_payload(EventPayload::Log(LogMessage {
            prefix: prefix.into(),
            level: level.into(),
            text: text.into(),
        }))
    }

    pub fn is_none(&self) -> bool {
        self.event_id == EventId::None
    }

    pub fn as_property(&self) -> Option<&PropertyEvent> {
        match &self.payload {
            Some(EventPayload::Property(p)) => Some(p),
            _ => None,
        }
    }

    pub fn as_log_message(&self) -> Option<&LogMessage> {
        match &self.payload {
            Some(EventPayload::Log(m)) => Some(m),
            _ => None,
        }
    }

    pub fn as_end_file(&self) -> Option<&EndFile> {
        match &self.payload {
            Some(EventPayload::EndFile(e)) => Some(e),
            _ => None,
        }
    }

    pub fn as_command_reply(&self) -> Option<&CommandReply> {
        match &self.payload {
            Some(EventPayload::CommandReply(r)) => Some(r),
            _ => None,
        }
    }

    /// Render as the JSON object handed to scripting consumers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
