//! Host callback traits and identity-carrying handles
//!
//! Handles wrap an `Arc` and compare by pointer. Cloning a handle, or building
//! two handles from clones of the same `Arc<T>`, yields the same subscriber,
//! which is what lets `unobserve` find a subscription again.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use mpv_abi::Event;
use mpv_properties::Value;

/// Receives `(property name, coerced value)` for an observed property.
pub trait PropertyObserver: Send + Sync + 'static {
    fn on_property_change(&self, name: &str, value: Option<&Value>);
}

impl<F> PropertyObserver for F
where
    F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
{
    fn on_property_change(&self, name: &str, value: Option<&Value>) {
        self(name, value)
    }
}

/// Receives every event taken off the queue.
pub trait EventCallback: Send + Sync + 'static {
    fn on_event(&self, event: &Event);
}

impl<F> EventCallback for F
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Receives player log lines as `(level, module, message)`.
pub trait LogHandler: Send + Sync + 'static {
    fn on_log(&self, level: &str, module: &str, message: &str);
}

impl<F> LogHandler for F
where
    F: Fn(&str, &str, &str) + Send + Sync + 'static,
{
    fn on_log(&self, level: &str, module: &str, message: &str) {
        self(level, module, message)
    }
}

/// Shared log handler.
pub type LogHandle = Arc<dyn LogHandler>;

fn thin_ptr<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as *const () as usize
}

/// A property observer with pointer identity.
#[derive(Clone)]
pub struct ObserverHandle(Arc<dyn PropertyObserver>);

impl ObserverHandle {
    pub fn new(observer: impl PropertyObserver) -> Self {
        Self(Arc::new(observer))
    }

    /// Wrap a closure.
    ///
    /// Prefer this over [`new`](Self::new) for closures so their argument
    /// lifetimes are inferred correctly.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&Value>) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Stable identity of the underlying observer.
    pub fn id(&self) -> usize {
        thin_ptr(&self.0)
    }

    pub(crate) fn notify(&self, name: &str, value: Option<&Value>) {
        self.0.on_property_change(name, value);
    }
}

impl<T: PropertyObserver> From<Arc<T>> for ObserverHandle {
    fn from(observer: Arc<T>) -> Self {
        Self(observer)
    }
}

impl PartialEq for ObserverHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ObserverHandle {}

impl Hash for ObserverHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverHandle({:#x})", self.id())
    }
}

/// An event callback with pointer identity.
#[derive(Clone)]
pub struct CallbackHandle(Arc<dyn EventCallback>);

impl CallbackHandle {
    pub fn new(callback: impl EventCallback) -> Self {
        Self(Arc::new(callback))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn id(&self) -> usize {
        thin_ptr(&self.0)
    }

    pub(crate) fn notify(&self, event: &Event) {
        self.0.on_event(event);
    }
}

impl<T: EventCallback> From<Arc<T>> for CallbackHandle {
    fn from(callback: Arc<T>) -> Self {
        Self(callback)
    }
}

impl PartialEq for CallbackHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for CallbackHandle {}

impl Hash for CallbackHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackHandle({:#x})", self.id())
    }
}

/// Wrap a closure as a shared log handler.
pub fn log_handler_fn<F>(f: F) -> LogHandle
where
    F: Fn(&str, &str, &str) + Send + Sync + 'static,
{
    Arc::new(f)
}
