//! Shared helpers for the SDK integration suites

#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mpv_abi::SimulatedMpv;
use mpv_sdk::{Mpv, MpvBuilder, NativeClient};

/// Build `builder` on a fresh simulated backend.
pub fn build(builder: MpvBuilder) -> (Arc<SimulatedMpv>, Mpv) {
    let sim = Arc::new(SimulatedMpv::new());
    let client: Arc<dyn NativeClient> = sim.clone();
    let mpv = builder.build_with(move || Ok(client)).unwrap();
    (sim, mpv)
}

/// Player with the event thread running.
pub fn player() -> (Arc<SimulatedMpv>, Mpv) {
    build(MpvBuilder::new())
}

/// Player without an event thread; events are pumped by waits.
pub fn quiet_player() -> (Arc<SimulatedMpv>, Mpv) {
    build(MpvBuilder::new().with_event_thread(false))
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub const MEDIA: &str = "/media/test.webm";
