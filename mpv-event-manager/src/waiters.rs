//! Threads blocked on a specific event
//!
//! A reply waiter is keyed by reply tag and is woken by exactly one event. A
//! kind waiter is woken by the next event of a given [`EventId`]. Closing the
//! table drops every pending sender, which wakes the waiters with
//! [`EventManagerError::Terminated`]. Dropping a ticket removes its entry, so
//! abandoned or timed-out waits do not accumulate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use dashmap::DashMap;
use mpv_abi::{Event, EventId};
use parking_lot::Mutex;

use crate::error::{EventManagerError, Result};

type ReplyTable = DashMap<u64, Sender<Event>>;

/// Where a ticket's sender lives, so dropping the ticket can remove it.
#[derive(Debug)]
enum Registration {
    Reply { table: Weak<ReplyTable>, reply_userdata: u64 },
    Kind { table: Weak<Mutex<KindWaiters>>, id: u64 },
}

/// A pending wait for one event.
#[derive(Debug)]
pub struct EventTicket {
    rx: Receiver<Event>,
    registration: Registration,
}

impl EventTicket {
    /// Reply tag this ticket waits for, if it waits for a reply.
    pub fn reply_userdata(&self) -> Option<u64> {
        match self.registration {
            Registration::Reply { reply_userdata, .. } => Some(reply_userdata),
            Registration::Kind { .. } => None,
        }
    }

    /// Block until the event arrives or the manager shuts down.
    pub fn wait(self) -> Result<Event> {
        self.rx.recv().map_err(|_| EventManagerError::Terminated)
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Event> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => EventManagerError::Timeout,
            RecvTimeoutError::Disconnected => EventManagerError::Terminated,
        })
    }

    /// The event, if it already arrived.
    pub fn try_take(&self) -> Result<Option<Event>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EventManagerError::Terminated),
        }
    }
}

impl Drop for EventTicket {
    fn drop(&mut self) {
        match &self.registration {
            Registration::Reply { table, reply_userdata } => {
                if let Some(table) = table.upgrade() {
                    table.remove(reply_userdata);
                }
            }
            Registration::Kind { table, id } => {
                if let Some(table) = table.upgrade() {
                    table.lock().waiting.retain(|waiter| waiter.id != *id);
                }
            }
        }
    }
}

#[derive(Debug)]
struct KindWaiter {
    id: u64,
    event_id: EventId,
    tx: Sender<Event>,
}

#[derive(Debug, Default)]
struct KindWaiters {
    closed: bool,
    next_id: u64,
    waiting: Vec<KindWaiter>,
}

/// Reply and kind waiters for one player.
#[derive(Debug, Default)]
pub struct Waiters {
    replies: Arc<ReplyTable>,
    kinds: Arc<Mutex<KindWaiters>>,
    closed: AtomicBool,
}

impl Waiters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in the reply tagged `reply_userdata`.
    ///
    /// Must happen before the request is issued, so the reply cannot be missed.
    pub fn expect_reply(&self, reply_userdata: u64) -> EventTicket {
        let (tx, rx) = channel::bounded(1);
        self.replies.insert(reply_userdata, tx);
        if self.closed.load(Ordering::SeqCst) {
            self.replies.remove(&reply_userdata);
        }
        EventTicket {
            rx,
            registration: Registration::Reply {
                table: Arc::downgrade(&self.replies),
                reply_userdata,
            },
        }
    }

    /// Forget a reply waiter, for example after the request failed to send.
    pub fn cancel_reply(&self, reply_userdata: u64) {
        self.replies.remove(&reply_userdata);
    }

    /// Register interest in the next event of kind `event_id`.
    pub fn expect_event(&self, event_id: EventId) -> EventTicket {
        let (tx, rx) = channel::bounded(1);
        let mut kinds = self.kinds.lock();
        kinds.next_id += 1;
        let id = kinds.next_id;
        if !kinds.closed {
            kinds.waiting.push(KindWaiter { id, event_id, tx });
        }
        EventTicket {
            rx,
            registration: Registration::Kind {
                table: Arc::downgrade(&self.kinds),
                id,
            },
        }
    }

    /// Hand `event` to the waiter for its reply tag. Returns whether one was woken.
    pub fn fulfill_reply(&self, event: &Event) -> bool {
        if event.reply_userdata == 0 {
            return false;
        }
        match self.replies.remove(&event.reply_userdata) {
            Some((_, tx)) => tx.send(event.clone()).is_ok(),
            None => false,
        }
    }

    /// Hand `event` to every waiter for its kind. Returns how many were woken.
    pub fn fulfill_kind(&self, event: &Event) -> usize {
        let mut kinds = self.kinds.lock();
        let mut woken = 0;
        kinds.waiting.retain(|waiter| {
            if waiter.event_id != event.event_id {
                return true;
            }
            if waiter.tx.send(event.clone()).is_ok() {
                woken += 1;
            }
            false
        });
        woken
    }

    pub fn pending(&self) -> usize {
        self.replies.len() + self.kinds.lock().waiting.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wake every waiter with a terminated error and refuse new ones.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.replies.clear();
        let mut kinds = self.kinds.lock();
        kinds.closed = true;
        kinds.waiting.clear();
    }
}
