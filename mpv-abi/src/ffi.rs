//! libmpv backend
//!
//! Declares the subset of `client.h` the binding uses and wraps the raw handle
//! in [`LibMpv`]. All data crossing the boundary is copied into owned
//! [`Node`]/[`Event`] values before the native memory is released.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;

use parking_lot::RwLock;

use crate::client::NativeClient;
use crate::error::{ErrorCode, NativeResult};
use crate::event::{
    ClientMessage, CommandReply, EndFile, EndFileReason, Event, EventId, EventPayload, LogMessage,
    PropertyEvent, StartFile,
};
use crate::format::Format;
use crate::node::Node;

#[allow(non_camel_case_types)]
mod sys {
    use std::ffi::{c_char, c_double, c_int, c_void};

    #[repr(C)]
    pub struct mpv_handle {
        _private: [u8; 0],
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub union mpv_node_u {
        pub string: *mut c_char,
        pub flag: c_int,
        pub int64: i64,
        pub double_: c_double,
        pub list: *mut mpv_node_list,
        pub ba: *mut mpv_byte_array,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct mpv_node {
        pub u: mpv_node_u,
        pub format: c_int,
    }

    #[repr(C)]
    pub struct mpv_node_list {
        pub num: c_int,
        pub values: *mut mpv_node,
        pub keys: *mut *mut c_char,
    }

    #[repr(C)]
    pub struct mpv_byte_array {
        pub data: *mut c_void,
        pub size: usize,
    }

    #[repr(C)]
    pub struct mpv_event {
        pub event_id: c_int,
        pub error: c_int,
        pub reply_userdata: u64,
        pub data: *mut c_void,
    }

    #[repr(C)]
    pub struct mpv_event_property {
        pub name: *const c_char,
        pub format: c_int,
        pub data: *mut c_void,
    }

    #[repr(C)]
    pub struct mpv_event_log_message {
        pub prefix: *const c_char,
        pub level: *const c_char,
        pub text: *const c_char,
        pub log_level: c_int,
    }

    #[repr(C)]
    pub struct mpv_event_start_file {
        pub playlist_entry_id: i64,
    }

    #[repr(C)]
    pub struct mpv_event_end_file {
        pub reason: c_int,
        pub error: c_int,
        pub playlist_entry_id: i64,
        pub playlist_insert_id: i64,
        pub playlist_insert_num_entries: c_int,
    }

    #[repr(C)]
    pub struct mpv_event_client_message {
        pub num_args: c_int,
        pub args: *mut *const c_char,
    }

    #[repr(C)]
    pub struct mpv_event_command {
        pub result: mpv_node,
    }

    #[link(name = "mpv")]
    extern "C" {
        pub fn mpv_create() -> *mut mpv_handle;
        pub fn mpv_initialize(ctx: *mut mpv_handle) -> c_int;
        pub fn mpv_terminate_destroy(ctx: *mut mpv_handle);
        pub fn mpv_set_option_string(
            ctx: *mut mpv_handle,
            name: *const c_char,
            data: *const c_char,
        ) -> c_int;
        pub fn mpv_get_property(
            ctx: *mut mpv_handle,
            name: *const c_char,
            format: c_int,
            data: *mut c_void,
        ) -> c_int;
        pub fn mpv_set_property(
            ctx: *mut mpv_handle,
            name: *const c_char,
            format: c_int,
            data: *mut c_void,
        ) -> c_int;
        pub fn mpv_command_ret(
            ctx: *mut mpv_handle,
            args: *mut *const c_char,
            result: *mut mpv_node,
        ) -> c_int;
        pub fn mpv_command_async(
            ctx: *mut mpv_handle,
            reply_userdata: u64,
            args: *mut *const c_char,
        ) -> c_int;
        pub fn mpv_observe_property(
            mpv: *mut mpv_handle,
            reply_userdata: u64,
            name: *const c_char,
            format: c_int,
        ) -> c_int;
        pub fn mpv_unobserve_property(mpv: *mut mpv_handle, registered_reply_userdata: u64) -> c_int;
        pub fn mpv_request_log_messages(ctx: *mut mpv_handle, min_level: *const c_char) -> c_int;
        pub fn mpv_wait_event(ctx: *mut mpv_handle, timeout: c_double) -> *mut mpv_event;
        pub fn mpv_wakeup(ctx: *mut mpv_handle);
        pub fn mpv_free(data: *mut c_void);
        pub fn mpv_free_node_contents(node: *mut mpv_node);
    }
}

/// Native status into a [`NativeResult`].
fn status(code: c_int) -> NativeResult<c_int> {
    if code < 0 {
        Err(ErrorCode(code))
    } else {
        Ok(code)
    }
}

fn c_string(value: &str) -> NativeResult<CString> {
    CString::new(value).map_err(|_| ErrorCode::INVALID_PARAMETER)
}

/// Copy a borrowed C string, falling back to lossy UTF-8.
unsafe fn copy_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Copy a C string into a node, keeping non-UTF-8 data as bytes.
unsafe fn string_node(ptr: *const c_char) -> Node {
    if ptr.is_null() {
        return Node::None;
    }
    let bytes = CStr::from_ptr(ptr).to_bytes();
    match std::str::from_utf8(bytes) {
        Ok(s) => Node::String(s.to_string()),
        Err(_) => Node::ByteArray(bytes.to_vec()),
    }
}

unsafe fn node_from_raw(node: &sys::mpv_node) -> Node {
    match Format::from_raw(node.format) {
        Some(Format::String) | Some(Format::OsdString) => string_node(node.u.string),
        Some(Format::Flag) => Node::Flag(node.u.flag != 0),
        Some(Format::Int64) => Node::Int64(node.u.int64),
        Some(Format::Double) => Node::Double(node.u.double_),
        Some(Format::NodeArray) => {
            let list = &*node.u.list;
            let items = (0..list.num.max(0) as usize)
                .map(|i| node_from_raw(&*list.values.add(i)))
                .collect();
            Node::Array(items)
        }
        Some(Format::NodeMap) => {
            let list = &*node.u.list;
            let entries = (0..list.num.max(0) as usize)
                .map(|i| {
                    let key = copy_str(*list.keys.add(i));
                    (key, node_from_raw(&*list.values.add(i)))
                })
                .collect();
            Node::Map(entries)
        }
        Some(Format::ByteArray) => {
            let ba = &*node.u.ba;
            if ba.data.is_null() {
                Node::ByteArray(Vec::new())
            } else {
                Node::ByteArray(std::slice::from_raw_parts(ba.data as *const u8, ba.size).to_vec())
            }
        }
        _ => Node::None,
    }
}

/// Owns the allocations backing a borrowed `mpv_node` tree.
#[derive(Default)]
struct NodeArena {
    strings: Vec<CString>,
    values: Vec<Vec<sys::mpv_node>>,
    keys: Vec<Vec<*mut c_char>>,
    lists: Vec<Box<sys::mpv_node_list>>,
    bytes: Vec<Box<sys::mpv_byte_array>>,
    byte_data: Vec<Vec<u8>>,
}

impl NodeArena {
    fn build(&mut self, node: &Node) -> NativeResult<sys::mpv_node> {
        let (u, format) = match node {
            Node::None => (sys::mpv_node_u { int64: 0 }, Format::None),
            Node::String(s) => {
                let cs = c_string(s)?;
                let u = sys::mpv_node_u {
                    string: cs.as_ptr() as *mut c_char,
                };
                self.strings.push(cs);
                (u, Format::String)
            }
            Node::Flag(b) => (sys::mpv_node_u { flag: c_int::from(*b) }, Format::Flag),
            Node::Int64(i) => (sys::mpv_node_u { int64: *i }, Format::Int64),
            Node::Double(d) => (sys::mpv_node_u { double_: *d }, Format::Double),
            Node::Array(items) => {
                let mut values = items
                    .iter()
                    .map(|item| self.build(item))
                    .collect::<NativeResult<Vec<_>>>()?;
                let list = self.list(&mut values, ptr::null_mut())?;
                self.values.push(values);
                (sys::mpv_node_u { list }, Format::NodeArray)
            }
            Node::Map(entries) => {
                let mut values = Vec::with_capacity(entries.len());
                let mut keys = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let ck = c_string(key)?;
                    keys.push(ck.as_ptr() as *mut c_char);
                    self.strings.push(ck);
                    values.push(self.build(value)?);
                }
                let list = self.list(&mut values, keys.as_mut_ptr())?;
                self.values.push(values);
                self.keys.push(keys);
                (sys::mpv_node_u { list }, Format::NodeMap)
            }
            Node::ByteArray(data) => {
                let mut data = data.clone();
                let mut ba = Box::new(sys::mpv_byte_array {
                    data: data.as_mut_ptr() as *mut c_void,
                    size: data.len(),
                });
                let u = sys::mpv_node_u {
                    ba: &mut *ba as *mut _,
                };
                self.byte_data.push(data);
                self.bytes.push(ba);
                (u, Format::ByteArray)
            }
        };
        Ok(sys::mpv_node {
            u,
            format: format.as_raw(),
        })
    }

    fn list(
        &mut self,
        values: &mut [sys::mpv_node],
        keys: *mut *mut c_char,
    ) -> NativeResult<*mut sys::mpv_node_list> {
        let num = c_int::try_from(values.len()).map_err(|_| ErrorCode::INVALID_PARAMETER)?;
        let mut list = Box::new(sys::mpv_node_list {
            num,
            values: values.as_mut_ptr(),
            keys,
        });
        let ptr = &mut *list as *mut _;
        self.lists.push(list);
        Ok(ptr)
    }
}

/// Null-terminated argument vector for command calls.
struct CommandArgs {
    _owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CommandArgs {
    fn new(args: &[&str]) -> NativeResult<Self> {
        let owned = args
            .iter()
            .map(|arg| c_string(arg))
            .collect::<NativeResult<Vec<_>>>()?;
        let mut ptrs: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(ptr::null());
        Ok(Self { _owned: owned, ptrs })
    }

    fn as_mut_ptr(&mut self) -> *mut *const c_char {
        self.ptrs.as_mut_ptr()
    }
}

unsafe fn event_from_raw(raw: &sys::mpv_event) -> Event {
    let Some(event_id) = EventId::from_raw(raw.event_id) else {
        tracing::debug!(event_id = raw.event_id, "Skipping unknown native event");
        return Event::none();
    };
    let mut event = Event::new(event_id)
        .with_error(ErrorCode(raw.error))
        .with_reply_userdata(raw.reply_userdata);
    if raw.data.is_null() {
        return event;
    }

    let payload = match event_id {
        EventId::PropertyChange | EventId::GetPropertyReply => {
            let prop = &*(raw.data as *const sys::mpv_event_property);
            let value = match Format::from_raw(prop.format) {
                Some(Format::None) | None => None,
                Some(Format::Node) => Some(node_from_raw(&*(prop.data as *const sys::mpv_node))),
                Some(Format::String) | Some(Format::OsdString) => {
                    Some(string_node(*(prop.data as *const *const c_char)))
                }
                Some(Format::Flag) => Some(Node::Flag(*(prop.data as *const c_int) != 0)),
                Some(Format::Int64) => Some(Node::Int64(*(prop.data as *const i64))),
                Some(Format::Double) => Some(Node::Double(*(prop.data as *const f64))),
                Some(_) => None,
            };
            Some(EventPayload::Property(PropertyEvent {
                name: copy_str(prop.name),
                value,
            }))
        }
        EventId::LogMessage => {
            let msg = &*(raw.data as *const sys::mpv_event_log_message);
            Some(EventPayload::Log(LogMessage {
                prefix: copy_str(msg.prefix),
                level: copy_str(msg.level),
                text: copy_str(msg.text),
            }))
        }
        EventId::StartFile => {
            let start = &*(raw.data as *const sys::mpv_event_start_file);
            Some(EventPayload::StartFile(StartFile {
                playlist_entry_id: start.playlist_entry_id,
            }))
        }
        EventId::EndFile => {
            let end = &*(raw.data as *const sys::mpv_event_end_file);
            EndFileReason::from_raw(end.reason).map(|reason| {
                EventPayload::EndFile(EndFile {
                    reason,
                    error: ErrorCode(end.error),
                    playlist_entry_id: end.playlist_entry_id,
                })
            })
        }
        EventId::ClientMessage => {
            let msg = &*(raw.data as *const sys::mpv_event_client_message);
            let args = (0..msg.num_args.max(0) as usize)
                .map(|i| copy_str(*msg.args.add(i)))
                .collect();
            Some(EventPayload::ClientMessage(ClientMessage { args }))
        }
        EventId::CommandReply => {
            let cmd = &*(raw.data as *const sys::mpv_event_command);
            Some(EventPayload::CommandReply(CommandReply {
                result: node_from_raw(&cmd.result),
            }))
        }
        _ => None,
    };
    if let Some(payload) = payload {
        event = event.with_payload(payload);
    }
    event
}

/// A libmpv instance.
///
/// The handle pointer is swapped to null on destruction; every call takes the
/// read side of the lock, so no call can overlap `mpv_terminate_destroy`.
pub struct LibMpv {
    handle: RwLock<*mut sys::mpv_handle>,
}

// libmpv's client API is thread-safe; the pointer itself is guarded by the lock.
unsafe impl Send for LibMpv {}
unsafe impl Sync for LibMpv {}

impl LibMpv {
    /// Create an uninitialized instance.
    pub fn create() -> NativeResult<Self> {
        let handle = unsafe { sys::mpv_create() };
        if handle.is_null() {
            return Err(ErrorCode::NOMEM);
        }
        tracing::debug!("Created libmpv handle");
        Ok(Self {
            handle: RwLock::new(handle),
        })
    }

    fn with_handle<T>(&self, f: impl FnOnce(*mut sys::mpv_handle) -> NativeResult<T>) -> NativeResult<T> {
        let handle = self.handle.read();
        if handle.is_null() {
            return Err(ErrorCode::UNINITIALIZED);
        }
        f(*handle)
    }
}

impl NativeClient for LibMpv {
    fn set_option_string(&self, name: &str, value: &str) -> NativeResult<()> {
        let name = c_string(name)?;
        let value = c_string(value)?;
        self.with_handle(|h| unsafe {
            status(sys::mpv_set_option_string(h, name.as_ptr(), value.as_ptr())).map(drop)
        })
    }

    fn initialize(&self) -> NativeResult<()> {
        self.with_handle(|h| unsafe { status(sys::mpv_initialize(h)).map(drop) })
    }

    fn get_property(&self, name: &str, format: Format) -> NativeResult<Node> {
        let cname = c_string(name)?;
        self.with_handle(|h| unsafe {
            match format {
                Format::String | Format::OsdString => {
                    let mut out: *mut c_char = ptr::null_mut();
                    status(sys::mpv_get_property(
                        h,
                        cname.as_ptr(),
                        format.as_raw(),
                        &mut out as *mut *mut c_char as *mut c_void,
                    ))?;
                    let node = string_node(out);
                    sys::mpv_free(out as *mut c_void);
                    Ok(node)
                }
                Format::Flag => {
                    let mut out: c_int = 0;
                    status(sys::mpv_get_property(
                        h,
                        cname.as_ptr(),
                        format.as_raw(),
                        &mut out as *mut c_int as *mut c_void,
                    ))?;
                    Ok(Node::Flag(out != 0))
                }
                Format::Int64 => {
                    let mut out: i64 = 0;
                    status(sys::mpv_get_property(
                        h,
                        cname.as_ptr(),
                        format.as_raw(),
                        &mut out as *mut i64 as *mut c_void,
                    ))?;
                    Ok(Node::Int64(out))
                }
                Format::Double => {
                    let mut out: f64 = 0.0;
                    status(sys::mpv_get_property(
                        h,
                        cname.as_ptr(),
                        format.as_raw(),
                        &mut out as *mut f64 as *mut c_void,
                    ))?;
                    Ok(Node::Double(out))
                }
                _ => {
                    let mut out = sys::mpv_node {
                        u: sys::mpv_node_u { int64: 0 },
                        format: Format::None.as_raw(),
                    };
                    status(sys::mpv_get_property(
                        h,
                        cname.as_ptr(),
                        Format::Node.as_raw(),
                        &mut out as *mut sys::mpv_node as *mut c_void,
                    ))?;
                    let node = node_from_raw(&out);
                    sys::mpv_free_node_contents(&mut out);
                    Ok(node)
                }
            }
        })
    }

    fn set_property(&self, name: &str, format: Format, value: &Node) -> NativeResult<()> {
        let cname = c_string(name)?;
        self.with_handle(|h| unsafe {
            match (format, value) {
                (Format::String | Format::OsdString, Node::String(_) | Node::ByteArray(_)) => {
                    let bytes = match value {
                        Node::String(s) => s.as_bytes().to_vec(),
                        Node::ByteArray(b) => b.clone(),
                        _ => Vec::new(),
                    };
                    let data = CString::new(bytes).map_err(|_| ErrorCode::INVALID_PARAMETER)?;
                    let mut ptr = data.as_ptr();
                    status(sys::mpv_set_property(
                        h,
                        cname.as_ptr(),
                        Format::String.as_raw(),
                        &mut ptr as *mut *const c_char as *mut c_void,
                    ))
                    .map(drop)
                }
                (Format::Flag, Node::Flag(b)) => {
                    let mut data = c_int::from(*b);
                    status(sys::mpv_set_property(
                        h,
                        cname.as_ptr(),
                        Format::Flag.as_raw(),
                        &mut data as *mut c_int as *mut c_void,
                    ))
                    .map(drop)
                }
                (Format::Int64, Node::Int64(i)) => {
                    let mut data = *i;
                    status(sys::mpv_set_property(
                        h,
                        cname.as_ptr(),
                        Format::Int64.as_raw(),
                        &mut data as *mut i64 as *mut c_void,
                    ))
                    .map(drop)
                }
                (Format::Double, Node::Double(d)) => {
                    let mut data = *d;
                    status(sys::mpv_set_property(
                        h,
                        cname.as_ptr(),
                        Format::Double.as_raw(),
                        &mut data as *mut f64 as *mut c_void,
                    ))
                    .map(drop)
                }
                _ => {
                    let mut arena = NodeArena::default();
                    let mut node = arena.build(value)?;
                    status(sys::mpv_set_property(
                        h,
                        cname.as_ptr(),
                        Format::Node.as_raw(),
                        &mut node as *mut sys::mpv_node as *mut c_void,
                    ))
                    .map(drop)
                }
            }
        })
    }

    fn command(&self, args: &[&str]) -> NativeResult<Node> {
        let mut argv = CommandArgs::new(args)?;
        self.with_handle(|h| unsafe {
            let mut out = sys::mpv_node {
                u: sys::mpv_node_u { int64: 0 },
                format: Format::None.as_raw(),
            };
            status(sys::mpv_command_ret(h, argv.as_mut_ptr(), &mut out))?;
            let node = node_from_raw(&out);
            sys::mpv_free_node_contents(&mut out);
            Ok(node)
        })
    }

    fn command_async(&self, reply_userdata: u64, args: &[&str]) -> NativeResult<()> {
        let mut argv = CommandArgs::new(args)?;
        self.with_handle(|h| unsafe {
            status(sys::mpv_command_async(h, reply_userdata, argv.as_mut_ptr())).map(drop)
        })
    }

    fn observe_property(&self, reply_userdata: u64, name: &str, format: Format) -> NativeResult<()> {
        let cname = c_string(name)?;
        self.with_handle(|h| unsafe {
            status(sys::mpv_observe_property(
                h,
                reply_userdata,
                cname.as_ptr(),
                format.as_raw(),
            ))
            .map(drop)
        })
    }

    fn unobserve_property(&self, reply_userdata: u64) -> NativeResult<usize> {
        self.with_handle(|h| unsafe {
            status(sys::mpv_unobserve_property(h, reply_userdata)).map(|n| n as usize)
        })
    }

    fn request_log_messages(&self, min_level: &str) -> NativeResult<()> {
        let level = c_string(min_level)?;
        self.with_handle(|h| unsafe {
            status(sys::mpv_request_log_messages(h, level.as_ptr())).map(drop)
        })
    }

    fn wait_event(&self, timeout: f64) -> Event {
        let handle = self.handle.read();
        if handle.is_null() {
            return Event::new(EventId::Shutdown);
        }
        unsafe {
            let raw = sys::mpv_wait_event(*handle, timeout);
            if raw.is_null() {
                return Event::none();
            }
            event_from_raw(&*raw)
        }
    }

    fn wakeup(&self) {
        let handle = self.handle.read();
        if !handle.is_null() {
            unsafe { sys::mpv_wakeup(*handle) };
        }
    }

    fn terminate_destroy(&self) {
        let mut handle = self.handle.write();
        if handle.is_null() {
            return;
        }
        unsafe { sys::mpv_terminate_destroy(*handle) };
        *handle = ptr::null_mut();
        tracing::debug!("Destroyed libmpv handle");
    }
}

impl Drop for LibMpv {
    fn drop(&mut self) {
        self.terminate_destroy();
    }
}
