//! Property descriptors and table lookup

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use mpv_abi::Format;

use crate::table::ALL_PROPERTIES;

/// Declared semantic type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Flag,
    Int,
    Float,
    Str,
    /// Text that may not be valid UTF-8.
    Bytes,
    /// Comma-delimited list of names.
    CommaList,
    /// No host-side coercion; exchanged as the given native format.
    Raw(Format),
}

impl PropertyType {
    /// Native format requested when reading.
    pub fn native_format(self) -> Format {
        match self {
            PropertyType::Flag => Format::Flag,
            PropertyType::Int => Format::Int64,
            PropertyType::Float => Format::Double,
            PropertyType::Str | PropertyType::Bytes | PropertyType::CommaList => Format::String,
            PropertyType::Raw(format) => format,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Flag => "flag",
            PropertyType::Int => "int",
            PropertyType::Float => "float",
            PropertyType::Str => "str",
            PropertyType::Bytes => "bytes",
            PropertyType::CommaList => "comma-list",
            PropertyType::Raw(_) => "raw",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Raw(format) => write!(f, "raw({format})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Whether a property can be read, written, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Access {
    read: bool,
    write: bool,
}

impl Access {
    pub const R: Access = Access { read: true, write: false };
    pub const W: Access = Access { read: false, write: true };
    pub const RW: Access = Access { read: true, write: true };

    pub const fn readable(self) -> bool {
        self.read
    }

    pub const fn writable(self) -> bool {
        self.write
    }

    pub const fn is_empty(self) -> bool {
        !self.read && !self.write
    }

    pub fn as_str(self) -> &'static str {
        match (self.read, self.write) {
            (true, true) => "rw",
            (true, false) => "r",
            (false, true) => "w",
            (false, false) => "",
        }
    }
}

/// One row of the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: PropertyType,
    pub access: Access,
}

impl PropertySpec {
    pub const fn new(name: &'static str, kind: PropertyType, access: Access) -> Self {
        Self { name, kind, access }
    }

    /// Attribute spelling of the name (`osd-level` becomes `osd_level`).
    pub fn attribute_name(&self) -> String {
        name_to_attribute(self.name)
    }
}

static BY_NAME: LazyLock<HashMap<&'static str, &'static PropertySpec>> =
    LazyLock::new(|| ALL_PROPERTIES.iter().map(|spec| (spec.name, spec)).collect());

/// Find a property by its hyphenated name.
pub fn lookup(name: &str) -> Option<&'static PropertySpec> {
    BY_NAME.get(name).copied()
}

/// Find a property by its attribute spelling.
pub fn lookup_attribute(attribute: &str) -> Option<&'static PropertySpec> {
    lookup(&attribute_to_name(attribute))
}

/// Every property in declaration order.
pub fn properties() -> impl Iterator<Item = &'static PropertySpec> {
    ALL_PROPERTIES.iter()
}

/// Hyphenated name for an attribute. A trailing underscore, used where the
/// name is a Rust keyword (`loop_`), is dropped.
pub fn attribute_to_name(attribute: &str) -> String {
    attribute.trim_end_matches('_').replace('_', "-")
}

pub fn name_to_attribute(name: &str) -> String {
    name.replace('-', "_")
}

/// Names are non-empty and made of `[-0-9a-z]`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b == b'-' || b.is_ascii_digit() || b.is_ascii_lowercase())
}
