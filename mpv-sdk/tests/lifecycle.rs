//! Event thread lifecycle
//!
//! Kept to a single test so no other player in this binary skews the
//! thread count.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mpv_abi::SimulatedMpv;
use mpv_sdk::{active_event_loops, MpvBuilder, NativeClient, SdkError};

#[test]
fn test_event_thread_exists_only_while_running() {
    assert_eq!(active_event_loops(), 0);

    // Rejected options allocate nothing
    let created = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&created);
    let err = MpvBuilder::new()
        .with_flag("this-is-not-an-option")
        .build_with(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(Arc::new(SimulatedMpv::new()) as Arc<dyn NativeClient>)
        })
        .unwrap_err();
    assert!(matches!(err, SdkError::UnknownOption(_)));
    assert!(!created.load(Ordering::SeqCst));
    assert_eq!(active_event_loops(), 0);

    // Explicit termination
    let (sim, mpv) = common::player();
    assert_eq!(active_event_loops(), 1);
    mpv.terminate();
    assert_eq!(active_event_loops(), 0);
    assert!(sim.is_destroyed());

    // Termination by drop
    let (sim, mpv) = common::player();
    assert_eq!(active_event_loops(), 1);
    drop(mpv);
    assert_eq!(active_event_loops(), 0);
    assert!(sim.is_destroyed());

    // No thread requested
    let (_sim, mpv) = common::quiet_player();
    assert_eq!(active_event_loops(), 0);
    mpv.terminate();
}
