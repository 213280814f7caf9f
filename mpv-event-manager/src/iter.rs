//! Blocking iterator over dispatched events
//!
//! An [`EventIterator`] is an event callback that forwards clones into a
//! channel. It ends once the manager is released, and deregisters itself when
//! dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use mpv_abi::Event;

use crate::dispatch::Dispatcher;
use crate::handler::CallbackHandle;

/// Blocking iterator over events
///
/// `next()` blocks until an event is dispatched or the manager is released.
/// Use `try_recv()` for non-blocking access.
#[derive(Debug)]
pub struct EventIterator {
    rx: Receiver<Event>,
    callback_id: usize,
    dispatcher: Weak<Dispatcher>,
}

impl EventIterator {
    pub(crate) fn register(dispatcher: &Arc<Dispatcher>) -> Self {
        let (tx, rx) = channel::unbounded();
        let callback = CallbackHandle::from_fn(move |event: &Event| {
            let _ = tx.send(event.clone());
        });
        let callback_id = callback.id();
        dispatcher.register_callback(callback);
        Self {
            rx,
            callback_id,
            dispatcher: Arc::downgrade(dispatcher),
        }
    }

    /// Block until an event is available
    ///
    /// Returns `None` once the manager has been released.
    pub fn recv(&self) -> Option<Event> {
        self.rx.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Block until an event is available or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking iterator over currently buffered events
    pub fn try_iter(&self) -> TryIterator<'_> {
        TryIterator { inner: self }
    }

    /// Iterator that blocks for up to `timeout` on each `next()`
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIterator<'_> {
        TimeoutIterator {
            inner: self,
            timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Iterator for EventIterator {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Drop for EventIterator {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher.unregister_callback_by_id(self.callback_id);
        }
    }
}

/// Non-blocking iterator over currently buffered events
pub struct TryIterator<'a> {
    inner: &'a EventIterator,
}

impl Iterator for TryIterator<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIterator<'a> {
    inner: &'a EventIterator,
    timeout: Duration,
}

impl Iterator for TimeoutIterator<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpv_abi::EventId;

    #[test]
    fn test_try_recv_empty() {
        let dispatcher = Arc::new(Dispatcher::new());
        let iter = EventIterator::register(&dispatcher);
        assert!(iter.try_recv().is_none());
        assert!(iter.is_empty());
    }

    #[test]
    fn test_receives_dispatched_events() {
        let dispatcher = Arc::new(Dispatcher::new());
        let iter = EventIterator::register(&dispatcher);

        dispatcher.dispatch(&Event::new(EventId::StartFile));
        dispatcher.dispatch(&Event::new(EventId::FileLoaded));

        let ids: Vec<EventId> = iter.try_iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![EventId::StartFile, EventId::FileLoaded]);
    }

    #[test]
    fn test_ends_when_dispatcher_is_cleared() {
        let dispatcher = Arc::new(Dispatcher::new());
        let mut iter = EventIterator::register(&dispatcher);
        dispatcher.dispatch(&Event::new(EventId::Idle));
        dispatcher.clear();

        assert_eq!(iter.next().map(|e| e.event_id), Some(EventId::Idle));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_drop_unregisters() {
        let dispatcher = Arc::new(Dispatcher::new());
        let iter = EventIterator::register(&dispatcher);
        assert_eq!(dispatcher.callback_count(), 1);
        drop(iter);
        assert_eq!(dispatcher.callback_count(), 0);
    }

    #[test]
    fn test_timeout_iter_stops_on_timeout() {
        let dispatcher = Arc::new(Dispatcher::new());
        let iter = EventIterator::register(&dispatcher);
        assert_eq!(iter.timeout_iter(Duration::from_millis(5)).count(), 0);
    }
}
