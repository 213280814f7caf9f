//! Background event loop thread
//!
//! The thread blocks in `wait_event` and hands each event to the
//! [`Dispatcher`]. It exits when a stop is requested (after draining what is
//! already queued, if configured) or when the player reports shutdown.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use mpv_abi::{EventId, NativeClient};

use crate::config::EventLoopConfig;
use crate::dispatch::Dispatcher;
use crate::error::{EventManagerError, Result};

static ACTIVE_EVENT_LOOPS: AtomicUsize = AtomicUsize::new(0);

/// Number of event loop threads currently alive in this process.
pub fn active_event_loops() -> usize {
    ACTIVE_EVENT_LOOPS.load(Ordering::SeqCst)
}

struct LiveGuard;

impl LiveGuard {
    fn enter() -> Self {
        ACTIVE_EVENT_LOOPS.fetch_add(1, Ordering::SeqCst);
        LiveGuard
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        ACTIVE_EVENT_LOOPS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to a running event loop thread
#[derive(Debug)]
pub struct EventLoopHandle {
    thread: JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

impl EventLoopHandle {
    /// Ask the loop to exit and wake it from `wait_event`.
    pub fn request_stop(&self, client: &dyn NativeClient) {
        self.stop.store(true, Ordering::SeqCst);
        client.wakeup();
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread.thread().id()
    }

    /// Whether the caller is the event loop thread itself.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id()
    }

    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Wait for the thread to exit. Must not be called from the thread itself.
    pub fn join(self) {
        let name = self.thread.thread().name().unwrap_or("event loop").to_string();
        if self.thread.join().is_err() {
            tracing::error!(thread = %name, "Event loop thread panicked");
        }
    }
}

/// Spawn the event loop thread.
pub fn spawn_event_loop(
    client: Arc<dyn NativeClient>,
    dispatcher: Arc<Dispatcher>,
    config: &EventLoopConfig,
) -> Result<EventLoopHandle> {
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);
    let drain = config.drain_on_shutdown;

    // Counted from before the spawn so the thread is visible as soon as this returns
    let live = LiveGuard::enter();
    let thread = thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || {
            let _live = live;
            run_event_loop(client.as_ref(), &dispatcher, &thread_stop, drain);
        })
        .map_err(EventManagerError::ThreadSpawn)?;

    Ok(EventLoopHandle { thread, stop })
}

fn run_event_loop(
    client: &dyn NativeClient,
    dispatcher: &Dispatcher,
    stop: &AtomicBool,
    drain: bool,
) {
    tracing::info!("Event loop started");

    loop {
        if stop.load(Ordering::SeqCst) {
            if drain {
                let drained = drain_pending(client, dispatcher);
                tracing::debug!(drained, "Drained queued events before stopping");
            }
            break;
        }

        let event = client.wait_event(-1.0);
        if event.is_none() {
            continue;
        }

        let shutdown = event.event_id == EventId::Shutdown;
        dispatcher.dispatch(&event);
        if shutdown {
            tracing::debug!("Player reported shutdown");
            dispatcher.waiters().close();
            break;
        }
    }

    tracing::info!("Event loop shut down");
}

/// Dispatch everything already queued without blocking.
pub(crate) fn drain_pending(client: &dyn NativeClient, dispatcher: &Dispatcher) -> usize {
    let mut drained = 0;
    loop {
        let event = client.wait_event(0.0);
        if event.is_none() {
            return drained;
        }
        drained += 1;
        let shutdown = event.event_id == EventId::Shutdown;
        dispatcher.dispatch(&event);
        if shutdown {
            return drained;
        }
    }
}
