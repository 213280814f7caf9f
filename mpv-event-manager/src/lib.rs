//! # mpv Event Manager
//!
//! Event delivery for one player: a background thread that takes events off
//! the native queue and fans them out to property observers, event callbacks,
//! a log handler and threads blocked on a particular event.
//!
//! ## Overview
//!
//! - **Observer registry**: one native observer per property, any number of
//!   host handlers behind it, deregistered when the last handler leaves
//! - **Isolated callbacks**: a panicking handler is logged and the others
//!   still run
//! - **Waiters**: reply and event tickets, all woken with
//!   [`EventManagerError::Terminated`] on shutdown
//! - **Sync API**: everything is blocking; no async runtime is involved
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mpv_event_manager::{EventManager, EventLoopConfig, ObserverHandle};
//! use mpv_abi::EventId;
//!
//! let manager = EventManager::new(client, EventLoopConfig::default())?;
//! manager.start()?;
//!
//! let handler = ObserverHandle::from_fn(|name, value| println!("{name}: {value:?}"));
//! manager.observe_property("pause", handler.clone())?;
//!
//! let ticket = manager.expect_event(EventId::EndFile);
//! client.command(&["loadfile", "clip.mkv"])?;
//! manager.wait(ticket, None)?;
//!
//! manager.stop();
//! manager.release();
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod iter;
pub mod manager;
pub mod registry;
pub mod waiters;
pub mod worker;

pub use config::EventLoopConfig;
pub use dispatch::{DispatchStats, Dispatcher};
pub use error::{EventManagerError, Result};
pub use handler::{
    log_handler_fn, CallbackHandle, EventCallback, LogHandle, LogHandler, ObserverHandle,
    PropertyObserver,
};
pub use iter::EventIterator;
pub use manager::{EventManager, StopOutcome};
pub use registry::ObserverRegistry;
pub use waiters::{EventTicket, Waiters};
pub use worker::{active_event_loops, EventLoopHandle};
