//! Typed reads and writes through the player

mod common;

use proptest::prelude::*;
use rstest::rstest;

use mpv_sdk::{Attributes, ByteString, ErrorKind, SdkError, Value};
use mpv_properties::ALL_PROPERTIES;

// ============================================================================
// Boundary inputs
// ============================================================================

fn boundary_values() -> Vec<Value> {
    vec![
        Value::Int(0),
        Value::Int(1),
        Value::Int(-1),
        Value::Float(0.0),
        Value::Float(1.0),
        Value::Float(-1.0),
        Value::Float(f64::NAN),
        Value::Str(String::new()),
        Value::Str("foo".to_string()),
        Value::Str("a".repeat(27_000)),
        Value::Bytes(ByteString(Vec::new())),
        Value::Bytes(ByteString(b"foo".to_vec())),
        Value::Bytes(ByteString(vec![b'a'; 27_000])),
        Value::Bool(true),
        Value::Bool(false),
    ]
}

fn is_mapped_failure(err: &SdkError) -> bool {
    err.kind().is_some()
}

#[test]
fn test_boundary_writes_succeed_or_fail_with_mapped_error() {
    let (_sim, mpv) = common::quiet_player();

    for spec in ALL_PROPERTIES.iter().filter(|spec| spec.access.writable()) {
        for value in boundary_values() {
            let shown = format!("{} = {:?}", spec.name, value.type_name());
            if let Err(err) = mpv.set(spec.name, value) {
                assert!(is_mapped_failure(&err), "{shown}: unmapped failure {err}");
            }
        }
    }
}

#[test]
fn test_reads_of_every_property_never_panic() {
    let (_sim, mpv) = common::quiet_player();

    for spec in ALL_PROPERTIES.iter().filter(|spec| spec.access.readable()) {
        if let Err(err) = mpv.get(spec.name) {
            assert!(is_mapped_failure(&err), "{}: unmapped failure {err}", spec.name);
        }
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[rstest]
#[case::flag("mute", Value::Bool(true))]
#[case::int("osd-level", Value::Int(3))]
#[case::float("volume", Value::Float(42.5))]
#[case::float_from_int("speed", Value::Int(2))]
#[case::string("loop", Value::Str("inf".to_string()))]
#[case::empty_string("geometry", Value::Str(String::new()))]
fn test_round_trip_keeps_semantic_type(#[case] name: &str, #[case] value: Value) {
    let (_sim, mpv) = common::quiet_player();
    let expected_type = match &value {
        Value::Int(_) if name == "speed" => "float",
        other => other.type_name(),
    };

    mpv.set(name, value).unwrap();
    let read = mpv.get(name).unwrap().unwrap();
    assert_eq!(read.type_name(), expected_type);
}

#[test]
fn test_typed_accessors() {
    let (_sim, mpv) = common::quiet_player();

    mpv.mute().set(true).unwrap();
    assert_eq!(mpv.mute().get().unwrap(), Some(true));

    mpv.loop_().set("inf").unwrap();
    assert_eq!(mpv.loop_().get().unwrap().as_deref(), Some("inf"));
    assert_eq!(mpv.get_attr("loop_").unwrap(), Some(Value::Str("inf".to_string())));

    mpv.volume().set(55.0).unwrap();
    assert_eq!(mpv.volume().get().unwrap(), Some(55.0));
}

#[test]
fn test_flag_rejects_non_bool() {
    let (_sim, mpv) = common::quiet_player();
    let err = mpv.set("mute", 1).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PropertyFormat));
}

#[test]
fn test_read_only_write_is_property_error() {
    let (_sim, mpv) = common::quiet_player();
    let err = mpv.set("idle-active", false).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PropertyError));
}

#[test]
fn test_unknown_name_is_not_found() {
    let (_sim, mpv) = common::quiet_player();
    let err = mpv.get("definitely-not-a-property").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PropertyNotFound));
}

#[test]
fn test_numeric_strings_are_normalized() {
    let (_sim, mpv) = common::quiet_player();
    mpv.set("osd-level", "2").unwrap();
    assert_eq!(mpv.get("osd-level").unwrap(), Some(Value::Int(2)));
}

#[test]
fn test_get_as_converts() {
    let (_sim, mpv) = common::quiet_player();
    let volume: Option<f64> = mpv.get_as("volume").unwrap();
    assert_eq!(volume, Some(100.0));
    assert!(matches!(
        mpv.get_as::<bool>("volume"),
        Err(SdkError::Value(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_volume_accepts_any_float(volume in proptest::num::f64::ANY) {
        let (_sim, mpv) = common::quiet_player();
        mpv.volume().set(volume).unwrap();
        let read = mpv.volume().get().unwrap().unwrap();
        prop_assert!(read == volume || (read.is_nan() && volume.is_nan()));
    }

    #[test]
    fn prop_string_properties_store_any_text(text in "[ -~]{0,64}") {
        let (_sim, mpv) = common::quiet_player();
        mpv.set("screenshot-directory", text.as_str()).unwrap();
        prop_assert_eq!(mpv.get("screenshot-directory").unwrap(), Some(Value::Str(text)));
    }
}
