//! Invariants of the property table and the write-side marshaling rules

use mpv_abi::{ErrorKind, Format, Node};
use mpv_properties::{
    from_native, is_valid_name, lookup, lookup_attribute, name_to_attribute, properties,
    to_native, PropertyType, Value, ALL_PROPERTIES,
};
use proptest::prelude::*;

#[test]
fn test_table_sanity() {
    assert!(ALL_PROPERTIES.len() > 100);
    for spec in properties() {
        assert!(!spec.access.is_empty(), "{} has no access", spec.name);
        assert!(is_valid_name(spec.name), "{} is not a valid name", spec.name);
        let allowed = match spec.kind {
            PropertyType::Flag
            | PropertyType::Int
            | PropertyType::Float
            | PropertyType::Str
            | PropertyType::Bytes
            | PropertyType::CommaList => true,
            PropertyType::Raw(format) => Format::from_raw(format.as_raw()) == Some(format),
        };
        assert!(allowed, "{} has an unexpected type", spec.name);
    }
}

#[test]
fn test_every_name_resolves_as_attribute() {
    for spec in properties() {
        let attribute = name_to_attribute(spec.name);
        assert!(!attribute.contains('-'));
        assert_eq!(lookup_attribute(&attribute), Some(spec));
        assert_eq!(lookup(spec.name), Some(spec));
    }
}

#[test]
fn test_names_used_by_the_player_exist() {
    for name in [
        "loop", "mute", "fullscreen", "osd-level", "deinterlace", "cursor-autohide",
        "core-idle", "idle-active", "property-list", "options", "pause", "volume",
    ] {
        assert!(lookup(name).is_some(), "missing {name}");
    }
}

fn writable(kind: PropertyType) -> impl Iterator<Item = &'static mpv_properties::PropertySpec> {
    properties().filter(move |spec| spec.kind == kind && spec.access.writable())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_any_int_marshals_for_int_properties(i in any::<i64>()) {
        for spec in writable(PropertyType::Int) {
            let (format, node) = to_native(spec, Value::Int(i)).unwrap();
            prop_assert_eq!(format, Format::Int64);
            prop_assert_eq!(node, Node::Int64(i));
        }
    }

    #[test]
    fn prop_any_float_marshals_for_float_properties(f in any::<f64>()) {
        for spec in writable(PropertyType::Float) {
            let (format, _) = to_native(spec, Value::Float(f)).unwrap();
            prop_assert_eq!(format, Format::Double);
        }
    }

    #[test]
    fn prop_any_text_marshals_for_str_properties(s in ".{0,64}") {
        for spec in writable(PropertyType::Str) {
            let (_, node) = to_native(spec, Value::from(s.as_str())).unwrap();
            prop_assert_eq!(node.as_str(), Some(s.as_str()));
        }
    }

    #[test]
    fn prop_any_bytes_marshal_for_bytes_properties(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        for spec in writable(PropertyType::Bytes) {
            let (_, node) = to_native(spec, Value::from(bytes.clone())).unwrap();
            prop_assert_eq!(node, Node::ByteArray(bytes.clone()));
        }
    }

    #[test]
    fn prop_flags_reject_non_bool(i in any::<i64>()) {
        for spec in writable(PropertyType::Flag) {
            let err = to_native(spec, Value::Int(i)).unwrap_err();
            prop_assert_eq!(err.kind, ErrorKind::PropertyFormat);
        }
    }

    /// Reading back what was written keeps the semantic type.
    #[test]
    fn prop_write_then_read_keeps_type(i in any::<i64>(), f in any::<f64>(), b in any::<bool>()) {
        for (kind, value) in [
            (PropertyType::Int, Value::Int(i)),
            (PropertyType::Float, Value::Float(f)),
            (PropertyType::Flag, Value::Bool(b)),
        ] {
            let spec = writable(kind).next().unwrap();
            let (_, node) = to_native(spec, value.clone()).unwrap();
            let read = from_native(spec.kind, node).unwrap();
            prop_assert_eq!(read.type_name(), value.type_name());
        }
    }
}
