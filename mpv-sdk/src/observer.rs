//! Multi-property observer groups
//!
//! An [`ObserverGroup`] subscribes one handler to several properties and can
//! drop all of those subscriptions in one step. The bulk release runs under
//! the dispatcher's delivery gate, so no event is delivered while the group is
//! half torn down.

use std::sync::Arc;

use mpv_event_manager::{EventManager, ObserverHandle};
use parking_lot::Mutex;

use crate::error::Result;

/// One handler observing many properties
///
/// Dropping the group does not unsubscribe; call
/// [`unobserve_mpv_properties`](Self::unobserve_mpv_properties).
pub struct ObserverGroup {
    events: Arc<EventManager>,
    handler: ObserverHandle,
    names: Mutex<Vec<String>>,
}

impl ObserverGroup {
    pub(crate) fn new(events: Arc<EventManager>, handler: ObserverHandle) -> Self {
        Self {
            events,
            handler,
            names: Mutex::new(Vec::new()),
        }
    }

    /// Add `name` to the group.
    pub fn observe(&self, name: &str) -> Result<&Self> {
        self.events.observe_property(name, self.handler.clone())?;
        let mut names = self.names.lock();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        Ok(self)
    }

    /// Properties currently observed through this group.
    pub fn properties(&self) -> Vec<String> {
        self.names.lock().clone()
    }

    pub fn handler(&self) -> &ObserverHandle {
        &self.handler
    }

    /// Remove every subscription of this group. Returns how many were removed.
    ///
    /// Safe to call repeatedly and after the player has terminated.
    pub fn unobserve_mpv_properties(&self) -> usize {
        let names = std::mem::take(&mut *self.names.lock());
        let removed = self.events.unobserve_all(&self.handler, &names);
        tracing::debug!(removed, "Released observer group");
        removed
    }
}

impl std::fmt::Debug for ObserverGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverGroup")
            .field("handler", &self.handler)
            .field("properties", &self.properties())
            .finish()
    }
}
