//! # mpv properties
//!
//! Static knowledge about mpv's property and option space:
//!
//! - [`table`]: the property catalogue, with a marker type and an
//!   [`Attributes`] accessor per property
//! - [`options`]: option names accepted at construction
//! - [`marshal`]: value conversion to and from native nodes
//! - [`handle`]: the [`PropertyHost`] seam and typed [`PropertyHandle`]s
//!
//! # Example
//!
//! ```rust,ignore
//! use mpv_properties::{lookup, Attributes};
//!
//! let spec = lookup("osd-level").unwrap();
//! assert!(spec.access.writable());
//!
//! player.osd_level().set(0)?;
//! ```

#[macro_use]
mod macros;

pub mod handle;
pub mod marshal;
pub mod options;
pub mod property;
pub mod table;
pub mod value;

pub use handle::{MpvProperty, PropertyHandle, PropertyHost};
pub use marshal::{from_native, to_native};
pub use options::{is_known_flag, is_known_option, keyword_to_option, ALL_OPTIONS};
pub use property::{
    attribute_to_name, is_valid_name, lookup, lookup_attribute, name_to_attribute, properties,
    Access, PropertySpec, PropertyType,
};
pub use table::{Attributes, ALL_PROPERTIES};
pub use value::{ByteString, CommaList, Value, ValueError};
