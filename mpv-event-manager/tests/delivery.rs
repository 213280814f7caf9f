//! Event delivery through the background thread

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mpv_abi::{EventId, NativeClient, Node, SimulatedMpv};
use mpv_event_manager::{
    CallbackHandle, EventLoopConfig, EventManager, ObserverHandle, StopOutcome,
};
use mpv_properties::Value;
use parking_lot::Mutex;
use rstest::rstest;

fn manager_with_thread(start: bool) -> (Arc<SimulatedMpv>, EventManager) {
    let sim = Arc::new(SimulatedMpv::new());
    sim.initialize().unwrap();
    let client: Arc<dyn NativeClient> = sim.clone();
    let manager = EventManager::new(client, EventLoopConfig::default()).unwrap();
    if start {
        manager.start().unwrap();
    }
    (sim, manager)
}

fn running_manager() -> (Arc<SimulatedMpv>, EventManager) {
    manager_with_thread(true)
}

type Changes = Arc<Mutex<Vec<(String, Option<Value>)>>>;

fn recording_observer(changes: &Changes) -> ObserverHandle {
    let sink = Arc::clone(changes);
    ObserverHandle::from_fn(move |name, value| {
        sink.lock().push((name.to_string(), value.cloned()));
    })
}

#[test]
fn test_observers_fan_out_in_subscription_order() {
    let (sim, manager) = running_manager();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    for tag in ["first", "second"] {
        let sink = Arc::clone(&order);
        manager
            .observe_property("mute", ObserverHandle::from_fn(move |_, _| sink.lock().push(tag)))
            .unwrap();
    }
    assert_eq!(sim.observer_count(), 1);

    let settled = manager.expect_event(EventId::PropertyChange);
    sim.set_property("mute", mpv_abi::Format::Flag, &Node::Flag(true))
        .unwrap();
    manager.wait(settled, Some(Duration::from_secs(2))).unwrap();

    assert_eq!(*order.lock(), vec!["first", "second"]);
    manager.stop();
}

#[test]
fn test_last_unsubscribe_removes_native_observer() {
    let (sim, manager) = running_manager();
    let changes: Changes = Arc::default();
    let a = recording_observer(&changes);
    let b = recording_observer(&changes);

    manager.observe_property("volume", a.clone()).unwrap();
    manager.observe_property("volume", b.clone()).unwrap();
    assert!(manager.unobserve_property("volume", &a));
    assert_eq!(sim.observer_count(), 1);
    assert!(manager.unobserve_property("volume", &b));
    assert_eq!(sim.observer_count(), 0);
    assert!(!manager.unobserve_property("volume", &b));
    manager.stop();
}

#[test]
fn test_panicking_observer_does_not_stop_delivery() {
    let (sim, manager) = running_manager();
    let changes: Changes = Arc::default();
    manager
        .observe_property("pause", ObserverHandle::from_fn(|_, _| panic!("observer failed")))
        .unwrap();
    manager
        .observe_property("pause", recording_observer(&changes))
        .unwrap();

    let settled = manager.expect_event(EventId::PropertyChange);
    sim.set_property("pause", mpv_abi::Format::Flag, &Node::Flag(true))
        .unwrap();
    manager.wait(settled, Some(Duration::from_secs(2))).unwrap();

    assert_eq!(
        *changes.lock(),
        vec![("pause".to_string(), Some(Value::Bool(true)))]
    );
    assert_eq!(manager.stats().handler_panics, 1);
    manager.stop();
}

#[rstest]
#[case::event_thread(true)]
#[case::caller_pumps(false)]
fn test_stop_wakes_blocked_waiters(#[case] start: bool) {
    let (_sim, manager) = manager_with_thread(start);
    let manager = Arc::new(manager);
    let ticket = manager.expect_event(EventId::Shutdown);

    let waiter = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || manager.wait(ticket, None))
    };
    thread::sleep(Duration::from_millis(20));
    manager.stop();

    assert!(waiter.join().unwrap().unwrap_err().is_terminated());
}

#[test]
fn test_stop_from_callback_is_deferred() {
    let (sim, manager) = running_manager();
    let manager = Arc::new(manager);
    let outcome: Arc<Mutex<Option<StopOutcome>>> = Arc::default();

    let weak = Arc::downgrade(&manager);
    let slot = Arc::clone(&outcome);
    manager.register_event_callback(CallbackHandle::from_fn(move |event| {
        if event.event_id != EventId::Idle {
            return;
        }
        if let Some(manager) = weak.upgrade() {
            *slot.lock() = Some(manager.stop());
        }
    }));

    sim.push_event(mpv_abi::Event::new(EventId::Idle));
    let handle = loop {
        if let Some(outcome) = outcome.lock().take() {
            break outcome;
        }
        thread::sleep(Duration::from_millis(5));
    };

    match handle {
        StopOutcome::Deferred(handle) => handle.join(),
        other => panic!("expected a deferred stop, got {other:?}"),
    }
    assert!(!manager.is_running());
}

#[test]
fn test_release_ends_event_iterators() {
    let (sim, manager) = running_manager();
    let mut events = manager.events();

    sim.push_event(mpv_abi::Event::new(EventId::Idle));
    assert_eq!(
        events.recv_timeout(Duration::from_secs(2)).map(|e| e.event_id),
        Some(EventId::Idle)
    );

    manager.stop();
    manager.release();
    assert!(events.next().is_none());
}
