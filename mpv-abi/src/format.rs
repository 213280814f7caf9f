//! Raw value format codes understood by the native client API

use serde::{Serialize, Serializer};

/// Data format tag passed alongside every property read, write and observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Format {
    None = 0,
    String = 1,
    OsdString = 2,
    Flag = 3,
    Int64 = 4,
    Double = 5,
    Node = 6,
    NodeArray = 7,
    NodeMap = 8,
    ByteArray = 9,
}

impl Format {
    /// Every format in code order.
    pub const ALL: [Format; 10] = [
        Format::None,
        Format::String,
        Format::OsdString,
        Format::Flag,
        Format::Int64,
        Format::Double,
        Format::Node,
        Format::NodeArray,
        Format::NodeMap,
        Format::ByteArray,
    ];

    /// Convert a raw code, returning `None` for codes outside `0..=9`.
    pub fn from_raw(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::None => "none",
            Format::String => "string",
            Format::OsdString => "osd-string",
            Format::Flag => "flag",
            Format::Int64 => "int64",
            Format::Double => "double",
            Format::Node => "node",
            Format::NodeArray => "node-array",
            Format::NodeMap => "node-map",
            Format::ByteArray => "byte-array",
        }
    }

    /// Whether values of this format are carried as a node tree.
    pub fn is_node(self) -> bool {
        matches!(self, Format::Node | Format::NodeArray | Format::NodeMap)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_positions() {
        for (index, format) in Format::ALL.iter().enumerate() {
            assert_eq!(format.as_raw() as usize, index);
            assert_eq!(Format::from_raw(index as i32), Some(*format));
        }
    }

    #[test]
    fn test_out_of_range_codes() {
        assert_eq!(Format::from_raw(-1), None);
        assert_eq!(Format::from_raw(10), None);
    }

    #[test]
    fn test_node_formats() {
        assert!(Format::NodeMap.is_node());
        assert!(!Format::ByteArray.is_node());
    }
}
