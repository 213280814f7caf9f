//! Event fan-out
//!
//! Every event taken off the native queue goes through [`Dispatcher::dispatch`],
//! which hands it to, in order: the reply waiter for its tag, the registered
//! event callbacks, property observers or the log handler, and finally the
//! waiters for its kind.
//!
//! Host code runs isolated: a panicking callback is logged and the remaining
//! callbacks still run. Dispatch holds a reentrant gate so that deregistration
//! from another thread waits for an in-flight dispatch, while deregistration
//! from inside a callback does not deadlock.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use mpv_abi::{Event, EventId, NativeClient};
use mpv_properties::{from_native, lookup, Value};
use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::handler::{CallbackHandle, LogHandle, ObserverHandle};
use crate::registry::ObserverRegistry;
use crate::waiters::Waiters;

/// Counters kept by the dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub events_dispatched: u64,
    pub handler_panics: u64,
}

#[derive(Default)]
pub struct Dispatcher {
    observers: ObserverRegistry,
    callbacks: Mutex<Vec<CallbackHandle>>,
    waiters: Waiters,
    log_handler: RwLock<Option<LogHandle>>,
    gate: ReentrantMutex<()>,
    events_dispatched: AtomicU64,
    handler_panics: AtomicU64,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("observers", &self.observers)
            .field("callbacks", &self.callback_count())
            .field("log_handler", &self.has_log_handler())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn waiters(&self) -> &Waiters {
        &self.waiters
    }

    /// Route one event to everything interested in it.
    pub fn dispatch(&self, event: &Event) {
        let _gate = self.gate.lock();
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(event = event.event_id.name(), "Dispatching event");

        self.waiters.fulfill_reply(event);

        let callbacks = self.callbacks.lock().clone();
        for callback in &callbacks {
            self.guarded(event.event_id, || callback.notify(event));
        }

        match event.event_id {
            EventId::PropertyChange => self.notify_observers(event),
            EventId::LogMessage => self.notify_log_handler(event),
            _ => {}
        }

        self.waiters.fulfill_kind(event);
    }

    fn notify_observers(&self, event: &Event) {
        let Some(change) = event.as_property() else {
            return;
        };
        let handlers = self.observers.handlers_for(&change.name);
        if handlers.is_empty() {
            return;
        }

        let value = change.value.clone().and_then(|node| match lookup(&change.name) {
            Some(spec) => from_native(spec.kind, node),
            None => Some(Value::from(node)),
        });

        for handler in &handlers {
            self.guarded(event.event_id, || {
                handler.notify(&change.name, value.as_ref())
            });
        }
    }

    fn notify_log_handler(&self, event: &Event) {
        let Some(message) = event.as_log_message() else {
            return;
        };
        let Some(handler) = self.log_handler.read().clone() else {
            return;
        };
        let text = message.text.trim_end_matches('\n');
        self.guarded(event.event_id, || {
            handler.on_log(&message.level, &message.prefix, text)
        });
    }

    fn guarded(&self, event_id: EventId, f: impl FnOnce()) {
        if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
            self.handler_panics.fetch_add(1, Ordering::Relaxed);
            tracing::error!(event = event_id.name(), "Event handler panicked");
        }
    }

    /// Add `callback` unless it is already registered.
    pub fn register_callback(&self, callback: CallbackHandle) -> bool {
        let mut callbacks = self.callbacks.lock();
        if callbacks.contains(&callback) {
            return false;
        }
        callbacks.push(callback);
        true
    }

    /// Remove `callback`. Returns whether it was registered.
    ///
    /// Waits for an in-flight dispatch on another thread to finish, so the
    /// callback is never invoked after this returns.
    pub fn unregister_callback(&self, callback: &CallbackHandle) -> bool {
        self.unregister_callback_by_id(callback.id())
    }

    pub fn unregister_callback_by_id(&self, id: usize) -> bool {
        let _gate = self.gate.lock();
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|cb| cb.id() != id);
        callbacks.len() != before
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Remove `handler` from each of `names`, returning how many
    /// subscriptions were dropped.
    pub fn unobserve_all(
        &self,
        client: Option<&dyn NativeClient>,
        handler: &ObserverHandle,
        names: &[String],
    ) -> usize {
        let _gate = self.gate.lock();
        names
            .iter()
            .filter(|name| self.observers.unobserve(client, name, handler))
            .count()
    }

    /// Remove `handler` from one property, waiting out an in-flight dispatch.
    pub fn unobserve(
        &self,
        client: Option<&dyn NativeClient>,
        name: &str,
        handler: &ObserverHandle,
    ) -> bool {
        let _gate = self.gate.lock();
        self.observers.unobserve(client, name, handler)
    }

    pub fn set_log_handler(&self, handler: Option<LogHandle>) {
        let _gate = self.gate.lock();
        *self.log_handler.write() = handler;
    }

    pub fn has_log_handler(&self) -> bool {
        self.log_handler.read().is_some()
    }

    /// Drop every observer, callback and the log handler. Returns how many
    /// subscriptions and callbacks were released.
    pub fn clear(&self) -> usize {
        let _gate = self.gate.lock();
        let mut released = self.observers.clear();
        released += std::mem::take(&mut *self.callbacks.lock()).len();
        if self.log_handler.write().take().is_some() {
            released += 1;
        }
        released
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpv_abi::{Node, SimulatedMpv};
    use std::sync::Arc;

    type Seen = Arc<Mutex<Vec<String>>>;

    fn recording_callback(seen: &Seen, tag: &'static str) -> CallbackHandle {
        let seen = Arc::clone(seen);
        CallbackHandle::from_fn(move |event| {
            seen.lock().push(format!("{tag}:{}", event.event_id.name()));
        })
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let dispatcher = Dispatcher::new();
        let seen: Seen = Arc::default();
        dispatcher.register_callback(recording_callback(&seen, "a"));
        dispatcher.register_callback(recording_callback(&seen, "b"));

        dispatcher.dispatch(&Event::new(EventId::Idle));

        assert_eq!(*seen.lock(), vec!["a:idle", "b:idle"]);
    }

    #[test]
    fn test_duplicate_callback_registers_once() {
        let dispatcher = Dispatcher::new();
        let cb = CallbackHandle::from_fn(|_| {});
        assert!(dispatcher.register_callback(cb.clone()));
        assert!(!dispatcher.register_callback(cb.clone()));
        assert_eq!(dispatcher.callback_count(), 1);
        assert!(dispatcher.unregister_callback(&cb));
        assert!(!dispatcher.unregister_callback(&cb));
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let dispatcher = Dispatcher::new();
        let seen: Seen = Arc::default();
        dispatcher.register_callback(CallbackHandle::from_fn(|_| panic!("boom")));
        dispatcher.register_callback(recording_callback(&seen, "after"));

        dispatcher.dispatch(&Event::new(EventId::FileLoaded));
        dispatcher.dispatch(&Event::new(EventId::Idle));

        assert_eq!(*seen.lock(), vec!["after:file-loaded", "after:idle"]);
        assert_eq!(dispatcher.stats().handler_panics, 2);
        assert_eq!(dispatcher.stats().events_dispatched, 2);
    }

    #[test]
    fn test_property_values_are_coerced_by_table() {
        let client = SimulatedMpv::new();
        let dispatcher = Dispatcher::new();
        let seen: Arc<Mutex<Vec<(String, Option<Value>)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let handler = ObserverHandle::from_fn(move |name, value| {
            sink.lock().push((name.to_string(), value.cloned()));
        });
        dispatcher
            .observers()
            .observe(&client, "osd-level", handler.clone())
            .unwrap();
        dispatcher
            .observers()
            .observe(&client, "some-script-property", handler)
            .unwrap();

        dispatcher.dispatch(&Event::property_change(1, "osd-level", Some(Node::Int64(0))));
        dispatcher.dispatch(&Event::property_change(2, "some-script-property", Some(Node::from("x"))));
        dispatcher.dispatch(&Event::property_change(1, "osd-level", None));
        dispatcher.dispatch(&Event::property_change(3, "mute", Some(Node::Flag(true))));

        assert_eq!(
            *seen.lock(),
            vec![
                ("osd-level".to_string(), Some(Value::Int(0))),
                ("some-script-property".to_string(), Some(Value::Str("x".to_string()))),
                ("osd-level".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_log_messages_reach_handler_trimmed() {
        let dispatcher = Dispatcher::new();
        let lines: Arc<Mutex<Vec<(String, String, String)>>> = Arc::default();
        let sink = Arc::clone(&lines);
        dispatcher.set_log_handler(Some(crate::handler::log_handler_fn(
            move |level, module, message| {
                sink.lock()
                    .push((level.to_string(), module.to_string(), message.to_string()));
            },
        )));

        dispatcher.dispatch(&Event::log_message("cplayer", "info", "Playing: a.mkv\n"));

        assert_eq!(
            *lines.lock(),
            vec![(
                "info".to_string(),
                "cplayer".to_string(),
                "Playing: a.mkv".to_string()
            )]
        );
    }

    #[test]
    fn test_callback_can_unregister_itself() {
        let dispatcher = Arc::new(Dispatcher::new());
        let calls = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<usize>>> = Arc::default();

        let d = Arc::clone(&dispatcher);
        let c = Arc::clone(&calls);
        let s = Arc::clone(&slot);
        let cb = CallbackHandle::from_fn(move |_| {
            *c.lock() += 1;
            if let Some(id) = *s.lock() {
                d.unregister_callback_by_id(id);
            }
        });
        *slot.lock() = Some(cb.id());
        dispatcher.register_callback(cb);

        dispatcher.dispatch(&Event::new(EventId::Idle));
        dispatcher.dispatch(&Event::new(EventId::Idle));
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_clear_releases_everything() {
        let client = SimulatedMpv::new();
        let dispatcher = Dispatcher::new();
        dispatcher.register_callback(CallbackHandle::from_fn(|_| {}));
        dispatcher
            .observers()
            .observe(&client, "mute", ObserverHandle::from_fn(|_, _| {}))
            .unwrap();
        dispatcher.set_log_handler(Some(crate::handler::log_handler_fn(|_, _, _| {})));

        assert_eq!(dispatcher.clear(), 3);
        assert_eq!(dispatcher.callback_count(), 0);
        assert!(!dispatcher.has_log_handler());
    }
}
