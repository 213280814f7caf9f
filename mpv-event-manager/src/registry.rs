//! Observer registry
//!
//! Tracks which handlers observe which property. The first handler for a
//! property registers one native observer under a fresh reply tag; further
//! handlers fan out from it, and removing the last handler deregisters it.
//! Native calls happen under the registry lock so registration and
//! bookkeeping cannot disagree.

use std::collections::HashMap;

use mpv_abi::{next_reply_userdata, Format, MpvError, NativeClient};
use parking_lot::Mutex;

use crate::handler::ObserverHandle;

#[derive(Debug)]
struct PropertyEntry {
    observer_id: u64,
    handlers: Vec<ObserverHandle>,
}

/// Property name to subscribed handlers, in subscription order.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    entries: Mutex<HashMap<String, PropertyEntry>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `name`, returning the native observer id.
    ///
    /// Subscribing a handler that is already subscribed to `name` changes
    /// nothing.
    pub fn observe(
        &self,
        client: &dyn NativeClient,
        name: &str,
        handler: ObserverHandle,
    ) -> Result<u64, MpvError> {
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get_mut(name) {
            if !entry.handlers.contains(&handler) {
                entry.handlers.push(handler);
            }
            return Ok(entry.observer_id);
        }

        let observer_id = next_reply_userdata();
        if let Err(code) = client.observe_property(observer_id, name, Format::Node) {
            return Err(code.into_error([name]));
        }
        tracing::debug!(property = name, observer_id, "Registered native property observer");

        entries.insert(
            name.to_string(),
            PropertyEntry {
                observer_id,
                handlers: vec![handler],
            },
        );
        Ok(observer_id)
    }

    /// Remove `handler` from `name`. Returns whether it was subscribed.
    ///
    /// Unknown handlers and properties are ignored. When the last handler
    /// goes, the native observer is deregistered if a client is given;
    /// a failure there is logged, never returned.
    pub fn unobserve(
        &self,
        client: Option<&dyn NativeClient>,
        name: &str,
        handler: &ObserverHandle,
    ) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(name) else {
            return false;
        };
        let before = entry.handlers.len();
        entry.handlers.retain(|h| h != handler);
        if entry.handlers.len() == before {
            return false;
        }

        if entry.handlers.is_empty() {
            let observer_id = entry.observer_id;
            entries.remove(name);
            if let Some(client) = client {
                match client.unobserve_property(observer_id) {
                    Ok(_) => tracing::debug!(
                        property = name,
                        observer_id,
                        "Deregistered native property observer"
                    ),
                    Err(code) => tracing::warn!(
                        property = name,
                        observer_id,
                        %code,
                        "Failed to deregister native property observer"
                    ),
                }
            }
        }
        true
    }

    /// Snapshot of the handlers for `name`, in subscription order.
    pub fn handlers_for(&self, name: &str) -> Vec<ObserverHandle> {
        self.entries
            .lock()
            .get(name)
            .map(|entry| entry.handlers.clone())
            .unwrap_or_default()
    }

    pub fn observer_id(&self, name: &str) -> Option<u64> {
        self.entries.lock().get(name).map(|entry| entry.observer_id)
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.entries
            .lock()
            .get(name)
            .map_or(0, |entry| entry.handlers.len())
    }

    /// Observed property names, sorted.
    pub fn properties(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry without touching the native side. Returns how many
    /// subscriptions were released.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let released = entries.values().map(|entry| entry.handlers.len()).sum();
        entries.clear();
        released
    }
}
