//! Conversion between host values and native nodes
//!
//! Writes are strict: a value must fit the declared type, with a few widening
//! conversions (integers into floats, scalars into strings). Reads are lenient:
//! whatever the native layer returns is coerced toward the declared type, and
//! falls back to the untyped conversion when it cannot be.

use mpv_abi::{ErrorKind, Format, MpvError, Node};

use crate::property::{PropertySpec, PropertyType};
use crate::value::{ByteString, CommaList, Value};

fn format_error(spec: &PropertySpec, value: &Value) -> MpvError {
    MpvError::from_kind(
        ErrorKind::PropertyFormat,
        [
            spec.name.to_string(),
            format!("{} value for {} property", value.type_name(), spec.kind),
        ],
    )
}

/// Native format and node for writing `value` to the property described by `spec`.
pub fn to_native(spec: &PropertySpec, value: Value) -> Result<(Format, Node), MpvError> {
    let converted = match (spec.kind, value) {
        (PropertyType::Flag, Value::Bool(b)) => (Format::Flag, Node::Flag(b)),

        (PropertyType::Int, Value::Int(i)) => (Format::Int64, Node::Int64(i)),
        (PropertyType::Int, Value::Str(s)) => (Format::String, Node::String(s)),

        (PropertyType::Float, Value::Float(f)) => (Format::Double, Node::Double(f)),
        (PropertyType::Float, Value::Int(i)) => (Format::Double, Node::Double(i as f64)),
        (PropertyType::Float, Value::Str(s)) => (Format::String, Node::String(s)),

        (PropertyType::Str, Value::Str(s)) => (Format::String, Node::String(s)),
        (PropertyType::Str, Value::Bool(b)) => {
            (Format::String, Node::from(if b { "yes" } else { "no" }))
        }
        (PropertyType::Str, Value::Int(i)) => (Format::String, Node::String(i.to_string())),
        (PropertyType::Str, Value::Float(f)) => (Format::String, Node::String(f.to_string())),
        (PropertyType::Str, Value::List(list)) => (Format::String, Node::String(list.join())),
        (PropertyType::Str, Value::Bytes(b)) => match String::from_utf8(b.0) {
            Ok(s) => (Format::String, Node::String(s)),
            Err(err) => {
                let value = Value::Bytes(ByteString(err.into_bytes()));
                return Err(format_error(spec, &value));
            }
        },

        (PropertyType::Bytes, Value::Bytes(b)) => (Format::String, Node::ByteArray(b.0)),
        (PropertyType::Bytes, Value::Str(s)) => (Format::String, Node::ByteArray(s.into_bytes())),

        (PropertyType::CommaList, Value::List(list)) => (Format::String, Node::String(list.join())),
        (PropertyType::CommaList, Value::Str(s)) => (Format::String, Node::String(s)),

        (PropertyType::Raw(_), value) => (Format::Node, value.into_node()),

        (_, value) => return Err(format_error(spec, &value)),
    };
    Ok(converted)
}

/// Coerce a node read from the native layer toward `kind`.
///
/// Returns `None` only for [`Node::None`].
pub fn from_native(kind: PropertyType, node: Node) -> Option<Value> {
    let value = match (kind, node) {
        (_, Node::None) => return None,

        (PropertyType::Flag, Node::Flag(b)) => Value::Bool(b),
        (PropertyType::Flag, Node::String(s)) if s == "yes" || s == "no" => Value::Bool(s == "yes"),
        (PropertyType::Flag, Node::Int64(i)) if i == 0 || i == 1 => Value::Bool(i == 1),

        (PropertyType::Int, Node::Int64(i)) => Value::Int(i),
        (PropertyType::Int, Node::Double(d)) if d.is_finite() && d.fract() == 0.0 => {
            Value::Int(d as i64)
        }
        (PropertyType::Int, Node::String(s)) if s.parse::<i64>().is_ok() => {
            Value::Int(s.parse().unwrap_or_default())
        }

        (PropertyType::Float, Node::Double(d)) => Value::Float(d),
        (PropertyType::Float, Node::Int64(i)) => Value::Float(i as f64),
        (PropertyType::Float, Node::String(s)) if s.parse::<f64>().is_ok() => {
            Value::Float(s.parse().unwrap_or_default())
        }

        (PropertyType::Str, Node::String(s)) => Value::Str(s),
        (PropertyType::Str, Node::Flag(b)) => Value::Str(if b { "yes" } else { "no" }.to_string()),
        (PropertyType::Str, Node::Int64(i)) => Value::Str(i.to_string()),
        (PropertyType::Str, Node::Double(d)) => Value::Str(format!("{d:.6}")),
        (PropertyType::Str, Node::ByteArray(b)) => {
            Value::Str(String::from_utf8_lossy(&b).into_owned())
        }

        (PropertyType::Bytes, Node::String(s)) => Value::Bytes(ByteString(s.into_bytes())),
        (PropertyType::Bytes, Node::ByteArray(b)) => Value::Bytes(ByteString(b)),

        (PropertyType::CommaList, Node::String(s)) => Value::List(CommaList::parse(&s)),
        (PropertyType::CommaList, Node::Array(items)) => {
            match items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
            {
                Some(names) => Value::List(CommaList(names)),
                None => Value::Node(Node::Array(items)),
            }
        }

        (PropertyType::Raw(_), node) => Value::Node(node),

        (kind, node) => {
            tracing::trace!(?kind, "Node does not match declared type, passing it through");
            Value::from(node)
        }
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::lookup;
    use rstest::rstest;

    fn spec(name: &str) -> &'static PropertySpec {
        lookup(name).unwrap()
    }

    #[rstest]
    #[case("osd-level", Value::Int(0), Format::Int64)]
    #[case("volume", Value::Int(-1), Format::Double)]
    #[case("volume", Value::Float(f64::NAN), Format::Double)]
    #[case("loop", Value::from("inf"), Format::String)]
    #[case("loop", Value::from(false), Format::String)]
    #[case("stream-open-filename", Value::from(&b"\xff"[..]), Format::String)]
    #[case("vf", Value::from("scale=640:-2"), Format::Node)]
    #[case("mute", Value::Bool(true), Format::Flag)]
    fn test_accepted_writes(#[case] name: &str, #[case] value: Value, #[case] format: Format) {
        let (native, _) = to_native(spec(name), value).unwrap();
        assert_eq!(native, format);
    }

    #[rstest]
    #[case("mute", Value::Int(1))]
    #[case("mute", Value::from("yes"))]
    #[case("osd-level", Value::Float(1.5))]
    #[case("fullscreen", Value::from(&b"foo"[..]))]
    #[case("loop", Value::from(&b"\xff\xfe"[..]))]
    fn test_rejected_writes(#[case] name: &str, #[case] value: Value) {
        let err = to_native(spec(name), value).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PropertyFormat);
        assert_eq!(err.context[0], name);
    }

    #[test]
    fn test_long_strings_pass_through() {
        let long = "a".repeat(27_000);
        let (_, node) = to_native(spec("title"), Value::from(long.as_str())).unwrap();
        assert_eq!(node.as_str().map(str::len), Some(27_000));
    }

    #[test]
    fn test_bytes_stay_distinct() {
        let (_, node) = to_native(spec("stream-open-filename"), Value::from("foo")).unwrap();
        assert_eq!(node, Node::ByteArray(b"foo".to_vec()));
        assert_eq!(
            from_native(PropertyType::Bytes, Node::from("foo")),
            Some(Value::Bytes(ByteString(b"foo".to_vec())))
        );
    }

    #[rstest]
    #[case(PropertyType::Flag, Node::from("yes"), Value::Bool(true))]
    #[case(PropertyType::Int, Node::from("42"), Value::Int(42))]
    #[case(PropertyType::Float, Node::Int64(3), Value::Float(3.0))]
    #[case(PropertyType::Str, Node::Flag(false), Value::from("no"))]
    #[case(PropertyType::Str, Node::Double(1.0), Value::from("1.000000"))]
    #[case(PropertyType::CommaList, Node::from("a,b"), Value::from(vec!["a".to_string(), "b".to_string()]))]
    #[case(PropertyType::Flag, Node::from("maybe"), Value::from("maybe"))]
    fn test_read_coercion(#[case] kind: PropertyType, #[case] node: Node, #[case] expected: Value) {
        assert_eq!(from_native(kind, node), Some(expected));
    }

    #[test]
    fn test_none_reads_as_none() {
        assert_eq!(from_native(PropertyType::Float, Node::None), None);
    }
}
