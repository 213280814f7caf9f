//! Event manager
//!
//! Owns the dispatcher and the event loop thread for one player, and gives
//! the rest of the SDK a synchronous API over them.
//!
//! Shutdown is two-phase. [`EventManager::stop`] stops delivery: it wakes all
//! waiters, stops the thread and lets go of the native client.
//! [`EventManager::release`] then drops host callbacks once the native
//! handle is gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mpv_abi::{next_reply_userdata, Event, EventId, NativeClient};
use parking_lot::{Mutex, RwLock};

use crate::config::EventLoopConfig;
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::error::{EventManagerError, Result};
use crate::handler::{CallbackHandle, LogHandle, ObserverHandle};
use crate::iter::EventIterator;
use crate::waiters::EventTicket;
use crate::worker::{drain_pending, spawn_event_loop, EventLoopHandle};

/// Result of [`EventManager::stop`]
#[derive(Debug)]
pub enum StopOutcome {
    /// No event loop was running
    NotRunning,
    /// The event loop thread has exited
    Joined,
    /// Stop was requested from the event loop thread itself; the caller must
    /// join the handle from another thread.
    Deferred(EventLoopHandle),
}

/// Event manager for one player
///
/// # Example
///
/// ```rust,ignore
/// use mpv_event_manager::{EventManager, EventLoopConfig, ObserverHandle};
///
/// let manager = EventManager::new(client, EventLoopConfig::default())?;
/// manager.start()?;
///
/// let printer = ObserverHandle::from_fn(|name, value| println!("{name} = {value:?}"));
/// manager.observe_property("volume", printer.clone())?;
///
/// for event in manager.events() {
///     println!("{}", event.event_id.name());
/// }
/// ```
pub struct EventManager {
    client: RwLock<Option<Arc<dyn NativeClient>>>,
    dispatcher: Arc<Dispatcher>,
    worker: Mutex<Option<EventLoopHandle>>,
    config: EventLoopConfig,
    stopped: AtomicBool,
}

impl EventManager {
    /// Create a manager for `client`. The event loop is not started.
    pub fn new(client: Arc<dyn NativeClient>, config: EventLoopConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: RwLock::new(Some(client)),
            dispatcher: Arc::new(Dispatcher::new()),
            worker: Mutex::new(None),
            config,
            stopped: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &EventLoopConfig {
        &self.config
    }

    fn client(&self) -> Result<Arc<dyn NativeClient>> {
        self.client
            .read()
            .clone()
            .ok_or(EventManagerError::Terminated)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Event loop thread
    // ========================================================================

    /// Spawn the event loop thread.
    pub fn start(&self) -> Result<()> {
        let client = self.client()?;
        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(EventLoopHandle::is_running) {
            return Err(EventManagerError::AlreadyRunning);
        }
        *worker = Some(spawn_event_loop(
            client,
            Arc::clone(&self.dispatcher),
            &self.config,
        )?);
        tracing::debug!(thread = %self.config.thread_name, "Started event loop");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(EventLoopHandle::is_running)
    }

    /// Whether the caller is running on this manager's event loop thread.
    pub fn is_event_thread(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(EventLoopHandle::is_current)
    }

    /// Dispatch queued events on the calling thread.
    ///
    /// Waits up to `timeout` for the first event, then takes whatever else is
    /// already queued. Only valid while the event loop thread is not running.
    pub fn dispatch_pending(&self, timeout: Duration) -> Result<usize> {
        if self.is_running() {
            return Err(EventManagerError::AlreadyRunning);
        }
        let client = self.client()?;
        let first = client.wait_event(timeout.as_secs_f64());
        if first.is_none() {
            return Ok(0);
        }
        let shutdown = first.event_id == EventId::Shutdown;
        self.dispatcher.dispatch(&first);
        if shutdown {
            return Ok(1);
        }
        Ok(1 + drain_pending(client.as_ref(), &self.dispatcher))
    }

    // ========================================================================
    // Observers and callbacks
    // ========================================================================

    /// Subscribe `handler` to `name`. Returns the native observer id.
    pub fn observe_property(&self, name: &str, handler: ObserverHandle) -> Result<u64> {
        let client = self.client()?;
        Ok(self
            .dispatcher
            .observers()
            .observe(client.as_ref(), name, handler)?)
    }

    /// Unsubscribe `handler` from `name`. Unknown pairs are ignored.
    pub fn unobserve_property(&self, name: &str, handler: &ObserverHandle) -> bool {
        let client = self.client.read().clone();
        self.dispatcher.unobserve(client.as_deref(), name, handler)
    }

    /// Unsubscribe `handler` from every name in `names`.
    pub fn unobserve_all(&self, handler: &ObserverHandle, names: &[String]) -> usize {
        let client = self.client.read().clone();
        self.dispatcher
            .unobserve_all(client.as_deref(), handler, names)
    }

    pub fn observed_properties(&self) -> Vec<String> {
        self.dispatcher.observers().properties()
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.dispatcher.observers().handler_count(name)
    }

    pub fn register_event_callback(&self, callback: CallbackHandle) -> bool {
        self.dispatcher.register_callback(callback)
    }

    pub fn unregister_event_callback(&self, callback: &CallbackHandle) -> bool {
        self.dispatcher.unregister_callback(callback)
    }

    /// Install or remove the log handler.
    ///
    /// Installing one asks the player for messages at the configured level;
    /// removing it turns player logging off.
    pub fn set_log_handler(&self, handler: Option<LogHandle>) -> Result<()> {
        let client = self.client()?;
        let level = if handler.is_some() {
            self.config.log_level.as_str()
        } else {
            "no"
        };
        client
            .request_log_messages(level)
            .map_err(|code| code.into_error([level]))?;
        self.dispatcher.set_log_handler(handler);
        Ok(())
    }

    /// Blocking iterator over every event dispatched from now on.
    pub fn events(&self) -> EventIterator {
        EventIterator::register(&self.dispatcher)
    }

    // ========================================================================
    // Requests and waits
    // ========================================================================

    /// Issue an asynchronous command and return a ticket for its reply.
    pub fn command_async(&self, args: &[&str]) -> Result<EventTicket> {
        let client = self.client()?;
        let reply_userdata = next_reply_userdata();
        let ticket = self.dispatcher.waiters().expect_reply(reply_userdata);
        if let Err(code) = client.command_async(reply_userdata, args) {
            self.dispatcher.waiters().cancel_reply(reply_userdata);
            return Err(code.into_error(args.iter().copied()).into());
        }
        Ok(ticket)
    }

    /// Ticket for the next event of kind `event_id`.
    ///
    /// Take the ticket before triggering the event so it cannot be missed.
    pub fn expect_event(&self, event_id: EventId) -> EventTicket {
        self.dispatcher.waiters().expect_event(event_id)
    }

    /// Block until `ticket` is fulfilled.
    ///
    /// With the event loop running this waits on the ticket. Without it, the
    /// calling thread pumps the native queue itself until the event arrives.
    pub fn wait(&self, ticket: EventTicket, timeout: Option<Duration>) -> Result<Event> {
        if self.is_event_thread() {
            return Err(EventManagerError::OnEventThread);
        }
        if self.is_running() || self.is_stopped() {
            return match timeout {
                Some(timeout) => ticket.wait_timeout(timeout),
                None => ticket.wait(),
            };
        }
        self.pump_until(&ticket, timeout)
    }

    /// Block until the next event of kind `event_id`.
    pub fn wait_for_event(&self, event_id: EventId, timeout: Option<Duration>) -> Result<Event> {
        let ticket = self.expect_event(event_id);
        self.wait(ticket, timeout)
    }

    fn pump_until(&self, ticket: &EventTicket, timeout: Option<Duration>) -> Result<Event> {
        let client = self.client()?;
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(event) = ticket.try_take()? {
                return Ok(event);
            }
            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(EventManagerError::Timeout);
                    }
                    (deadline - now).as_secs_f64()
                }
                None => -1.0,
            };
            let event = client.wait_event(wait);
            if event.is_none() {
                continue;
            }
            let shutdown = event.event_id == EventId::Shutdown;
            self.dispatcher.dispatch(&event);
            if shutdown {
                return ticket.try_take()?.ok_or(EventManagerError::Terminated);
            }
        }
    }

    // ========================================================================
    // Shutdown
    // ========================================================================

    /// Stop event delivery.
    ///
    /// Wakes every waiter with [`EventManagerError::Terminated`], stops the
    /// event loop and drops this manager's reference to the native client.
    /// Idempotent.
    pub fn stop(&self) -> StopOutcome {
        self.stopped.store(true, Ordering::SeqCst);
        self.dispatcher.waiters().close();

        let client = self.client.write().take();
        let Some(handle) = self.worker.lock().take() else {
            // A caller may be pumping the native queue in `wait`; it must
            // leave `wait_event` before the handle can be destroyed.
            if let Some(client) = client.as_deref() {
                client.wakeup();
            }
            return StopOutcome::NotRunning;
        };
        if let Some(client) = client.as_deref() {
            handle.request_stop(client);
        }
        if handle.is_current() {
            tracing::debug!("Stop requested from the event loop thread, deferring join");
            return StopOutcome::Deferred(handle);
        }
        handle.join();
        StopOutcome::Joined
    }

    /// Drop every observer, callback and the log handler. Returns how many
    /// were released.
    pub fn release(&self) -> usize {
        let released = self.dispatcher.clear();
        tracing::debug!(released, "Released event subscribers");
        released
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("running", &self.is_running())
            .field("stopped", &self.is_stopped())
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for EventManager {
    fn drop(&mut self) {
        if !self.is_stopped() {
            self.stop();
        }
    }
}
