//! Owned form of the native tagged-union value

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::format::Format;

/// A value exchanged with the native layer.
///
/// Maps keep their native insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    None,
    String(String),
    Flag(bool),
    Int64(i64),
    Double(f64),
    Array(Vec<Node>),
    Map(Vec<(String, Node)>),
    ByteArray(Vec<u8>),
}

impl Node {
    /// Format code describing this value.
    pub fn format(&self) -> Format {
        match self {
            Node::None => Format::None,
            Node::String(_) => Format::String,
            Node::Flag(_) => Format::Flag,
            Node::Int64(_) => Format::Int64,
            Node::Double(_) => Format::Double,
            Node::Array(_) => Format::NodeArray,
            Node::Map(_) => Format::NodeMap,
            Node::ByteArray(_) => Format::ByteArray,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Node::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Floating point view, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Double(d) => Some(*d),
            Node::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Node)]> {
        match self {
            Node::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Flag(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int64(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Double(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Array(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::None => serializer.serialize_none(),
            Node::String(s) => serializer.serialize_str(s),
            Node::Flag(b) => serializer.serialize_bool(*b),
            Node::Int64(i) => serializer.serialize_i64(*i),
            Node::Double(d) => serializer.serialize_f64(*d),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Node::ByteArray(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_formats() {
        assert_eq!(Node::None.format(), Format::None);
        assert_eq!(Node::from("x").format(), Format::String);
        assert_eq!(Node::Map(vec![]).format(), Format::NodeMap);
    }

    #[test]
    fn test_map_lookup_keeps_order() {
        let node = Node::Map(vec![
            ("title".into(), Node::from("Intro")),
            ("time".into(), Node::Double(0.0)),
        ]);
        assert_eq!(node.get("title").and_then(Node::as_str), Some("Intro"));
        assert_eq!(node.get("time").and_then(Node::as_f64), Some(0.0));
        assert!(node.get("missing").is_none());
    }

    #[test]
    fn test_json_shape() {
        let node = Node::Array(vec![
            Node::Map(vec![("id".into(), Node::Int64(1)), ("selected".into(), Node::Flag(true))]),
            Node::None,
        ]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!([{"id": 1, "selected": true}, null]));
    }
}
