//! Host-side property values
//!
//! [`Value`] is what callers read and write. It keeps text and byte strings
//! apart, and carries raw [`Node`] trees for properties without a simpler type.

use std::fmt;

use mpv_abi::Node;
use serde::Serialize;

/// Byte string that is not required to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ByteString(pub Vec<u8>);

impl ByteString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Comma-delimited list of names, such as `property-list`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct CommaList(pub Vec<String>);

impl CommaList {
    /// Split the native representation. An empty string is an empty list.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self(Vec::new());
        }
        Self(raw.split(',').map(str::to_string).collect())
    }

    pub fn join(&self) -> String {
        self.0.join(",")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|item| item == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CommaList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A property value after coercion to its semantic type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(ByteString),
    List(CommaList),
    Node(Node),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Node(_) => "node",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Native node carrying the same data.
    pub fn into_node(self) -> Node {
        match self {
            Value::Bool(b) => Node::Flag(b),
            Value::Int(i) => Node::Int64(i),
            Value::Float(f) => Node::Double(f),
            Value::Str(s) => Node::String(s),
            Value::Bytes(b) => Node::ByteArray(b.0),
            Value::List(list) => Node::Array(list.0.into_iter().map(Node::String).collect()),
            Value::Node(node) => node,
        }
    }

    /// String form used for options: booleans become `yes`/`no`.
    pub fn to_option_string(&self) -> String {
        match self {
            Value::Bool(true) => "yes".to_string(),
            Value::Bool(false) => "no".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(&b.0).into_owned(),
            Value::List(list) => list.join(),
            Value::Node(node) => node_to_option_string(node),
        }
    }
}

fn node_to_option_string(node: &Node) -> String {
    match node {
        Node::None => String::new(),
        Node::String(s) => s.clone(),
        Node::Flag(b) => (if *b { "yes" } else { "no" }).to_string(),
        Node::Int64(i) => i.to_string(),
        Node::Double(d) => d.to_string(),
        Node::Array(items) => items
            .iter()
            .map(node_to_option_string)
            .collect::<Vec<_>>()
            .join(","),
        Node::Map(entries) => entries
            .iter()
            .map(|(k, v)| format!("{k}={}", node_to_option_string(v)))
            .collect::<Vec<_>>()
            .join(","),
        Node::ByteArray(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_option_string())
    }
}

/// Untyped conversion used when a property has no table entry.
impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::String(s) => Value::Str(s),
            Node::Flag(b) => Value::Bool(b),
            Node::Int64(i) => Value::Int(i),
            Node::Double(d) => Value::Float(d),
            Node::ByteArray(b) => Value::Bytes(ByteString(b)),
            other => Value::Node(other),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<ByteString> for Value {
    fn from(v: ByteString) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(ByteString::from(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(ByteString(v))
    }
}

impl From<CommaList> for Value {
    fn from(v: CommaList) -> Self {
        Value::List(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(CommaList(v))
    }
}

/// A value did not have the type a typed accessor expected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("expected {expected} value, got {found}")]
pub struct ValueError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueError {
    pub fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.type_name(),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_bool().ok_or_else(|| ValueError::new("bool", &value))
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_i64().ok_or_else(|| ValueError::new("int", &value))
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_f64().ok_or_else(|| ValueError::new("float", &value))
    }
}

impl TryFrom<Value> for String {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ValueError::new("str", &other)),
        }
    }
}

impl TryFrom<Value> for ByteString {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Str(s) => Ok(ByteString(s.into_bytes())),
            other => Err(ValueError::new("bytes", &other)),
        }
    }
}

impl TryFrom<Value> for CommaList {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::List(list) => Ok(list),
            Value::Str(s) => Ok(CommaList::parse(&s)),
            other => Err(ValueError::new("list", &other)),
        }
    }
}

impl TryFrom<Value> for Node {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(value.into_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_list_parse() {
        assert!(CommaList::parse("").is_empty());
        let list = CommaList::parse("mute,volume,speed");
        assert_eq!(list.len(), 3);
        assert!(list.contains("volume"));
        assert_eq!(list.join(), "mute,volume,speed");
    }

    #[test]
    fn test_option_strings() {
        assert_eq!(Value::from(true).to_option_string(), "yes");
        assert_eq!(Value::from(false).to_option_string(), "no");
        assert_eq!(Value::from(0).to_option_string(), "0");
        assert_eq!(Value::from("inf").to_option_string(), "inf");
        assert_eq!(Value::from(vec!["a".to_string(), "b".to_string()]).to_option_string(), "a,b");
    }

    #[test]
    fn test_try_from_mismatch() {
        let err = bool::try_from(Value::from(1)).unwrap_err();
        assert_eq!(err, ValueError { expected: "bool", found: "int" });
        assert_eq!(f64::try_from(Value::from(2)).unwrap(), 2.0);
    }

    #[test]
    fn test_bytes_stay_bytes() {
        let value = Value::from(&b"\xff\x00abc"[..]);
        assert_eq!(value.type_name(), "bytes");
        assert_eq!(value.clone().into_node(), Node::ByteArray(b"\xff\x00abc".to_vec()));
        assert!(String::try_from(value).is_err());
    }

    #[test]
    fn test_untyped_node_conversion() {
        assert_eq!(Value::from(Node::from("x")), Value::from("x"));
        assert_eq!(Value::from(Node::Int64(3)), Value::Int(3));
        assert!(matches!(Value::from(Node::Array(vec![])), Value::Node(_)));
    }
}
