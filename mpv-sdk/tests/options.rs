//! Construction-time flags and options, and option access afterwards

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rstest::rstest;

use mpv_abi::SimulatedMpv;
use mpv_sdk::{ErrorKind, MpvBuilder, NativeClient, Node, SdkError, Value};

fn str_value(s: &str) -> Option<Value> {
    Some(Value::Str(s.to_string()))
}

#[rstest]
#[case::flag(MpvBuilder::new().with_flag("nonexistent-flag"))]
#[case::negated_flag(MpvBuilder::new().with_flag("no-nonexistent-flag"))]
#[case::keyword(MpvBuilder::new().with_option("nonexistent_option", 1))]
fn test_unknown_option_fails_before_handle_exists(#[case] builder: MpvBuilder) {
    let created = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&created);

    let err = builder
        .build_with(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(Arc::new(SimulatedMpv::new()) as Arc<dyn NativeClient>)
        })
        .unwrap_err();

    assert!(matches!(err, SdkError::UnknownOption(_)));
    assert!(!created.load(Ordering::SeqCst));
}

#[test]
fn test_flags_and_options_are_applied() {
    let (_sim, mpv) = common::build(
        MpvBuilder::new()
            .with_flags(["no-video", "cursor-autohide-fs-only", "fs"])
            .with_option("osd_level", 0)
            .with_option("loop", "inf")
            .with_option("deinterlace", "no"),
    );

    assert_eq!(mpv.get("video").unwrap(), str_value("no"));
    assert_eq!(mpv.get("cursor-autohide-fs-only").unwrap(), Some(Value::Bool(true)));
    assert_eq!(mpv.get("fullscreen").unwrap(), Some(Value::Bool(true)));
    assert_eq!(mpv.get("cursor-autohide").unwrap(), str_value("1000"));
    assert_eq!(mpv.get("osd-level").unwrap(), Some(Value::Int(0)));
    assert_eq!(mpv.get("loop").unwrap(), str_value("inf"));
    assert_eq!(mpv.get("deinterlace").unwrap(), str_value("no"));
    mpv.terminate();
}

#[test]
fn test_rejected_option_value_destroys_handle() {
    let sim = Arc::new(SimulatedMpv::new());
    let client: Arc<dyn NativeClient> = sim.clone();

    let err = MpvBuilder::new()
        .with_option("loop", "sometimes")
        .build_with(move || Ok(client))
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::OptionError));
    assert!(sim.is_destroyed());
    assert!(!sim.is_initialized());
}

#[test]
fn test_option_names_cover_known_options() {
    let (_sim, mpv) = common::quiet_player();
    let names = mpv.option_names().unwrap();

    assert!(names.iter().any(|n| n == "osd-level"));
    assert!(names.iter().any(|n| n == "loop"));
    for name in &names {
        if let Err(err) = mpv.option(name) {
            assert!(err.kind().is_some(), "{name}: {err}");
        }
    }
}

#[test]
fn test_property_names_include_options() {
    let (_sim, mpv) = common::quiet_player();
    let properties = mpv.property_names().unwrap();
    let options = mpv.option_names().unwrap();
    assert!(options.iter().all(|o| properties.contains(o)));
}

#[test]
fn test_option_and_file_local_option_access() {
    let (_sim, mpv) = common::quiet_player();

    mpv.set_option("osd-level", 3).unwrap();
    assert_eq!(mpv.option("osd-level").unwrap(), Some(Value::Int(3)));
    assert_eq!(mpv.get("osd-level").unwrap(), Some(Value::Int(3)));

    mpv.set_file_local_option("speed", 1.5).unwrap();
    assert_eq!(mpv.file_local_option("speed").unwrap(), Some(Value::Float(1.5)));

    let err = mpv.option("no-such-option").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PropertyNotFound));
}

#[test]
fn test_commands_change_state() {
    let (sim, mpv) = common::quiet_player();

    mpv.cycle("mute").unwrap();
    assert_eq!(sim.property_value("mute"), Some(Node::Flag(true)));

    mpv.add("volume", -10.0).unwrap();
    assert_eq!(mpv.get("volume").unwrap(), Some(Value::Float(90.0)));

    mpv.show_text("hello").unwrap();
    mpv.playlist_clear().unwrap();
    assert_eq!(
        mpv.command(&["frobnicate"]).unwrap_err().kind(),
        Some(ErrorKind::InvalidParameter)
    );
}
