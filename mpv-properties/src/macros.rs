//! Declarative macro for the property table
//!
//! One entry per property generates the table row, a zero-sized marker type
//! implementing [`MpvProperty`](crate::handle::MpvProperty), and an accessor
//! method on the [`Attributes`](crate::table::Attributes) extension trait.

/// Define the property table and its typed accessors.
///
/// Each entry is `method: "native-name", type, access;` where `type` is one of
/// `flag`, `int`, `float`, `str`, `bytes`, `comma_list`, `node`, `node_array`,
/// `node_map` and `access` is `r`, `w` or `rw`. The marker type is the method
/// name in camel case.
///
/// # Example
/// ```rust,ignore
/// define_properties! {
///     /// Audio mute state
///     mute: "mute", flag, rw;
///     chapter_list: "chapter-list", node_array, r;
/// }
///
/// // Generates `ALL_PROPERTIES`, `pub struct Mute;`, `pub struct ChapterList;`
/// // and `Attributes::mute()` / `Attributes::chapter_list()`.
/// ```
macro_rules! define_properties {
    (
        $(
            $(#[$meta:meta])*
            $method:ident : $name:literal, $kind:ident, $access:ident;
        )*
    ) => {
        paste::paste! {
            /// Every known property in declaration order.
            pub static ALL_PROPERTIES: &[$crate::property::PropertySpec] = &[
                $(
                    $crate::property::PropertySpec::new(
                        $name,
                        property_type!($kind),
                        access!($access),
                    ),
                )*
            ];

            $(
                $(#[$meta])*
                #[doc = concat!("\n\nMarker for the `", $name, "` property.")]
                #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
                pub struct [<$method:camel>];

                impl $crate::handle::MpvProperty for [<$method:camel>] {
                    const NAME: &'static str = $name;
                    const KIND: $crate::property::PropertyType = property_type!($kind);
                    const ACCESS: $crate::property::Access = access!($access);
                    type Value = property_value!($kind);
                }
            )*

            /// Typed accessor for every table property on any [`PropertyHost`].
            ///
            /// [`PropertyHost`]: crate::handle::PropertyHost
            pub trait Attributes: $crate::handle::PropertyHost + Sized {
                $(
                    #[doc = concat!("Handle for `", $name, "`.")]
                    fn $method(&self) -> $crate::handle::PropertyHandle<'_, Self, [<$method:camel>]> {
                        $crate::handle::PropertyHandle::new(self)
                    }
                )*
            }

            impl<H: $crate::handle::PropertyHost> Attributes for H {}
        }
    };
}

macro_rules! property_type {
    (flag) => { $crate::property::PropertyType::Flag };
    (int) => { $crate::property::PropertyType::Int };
    (float) => { $crate::property::PropertyType::Float };
    (str) => { $crate::property::PropertyType::Str };
    (bytes) => { $crate::property::PropertyType::Bytes };
    (comma_list) => { $crate::property::PropertyType::CommaList };
    (node) => { $crate::property::PropertyType::Raw(mpv_abi::Format::Node) };
    (node_array) => { $crate::property::PropertyType::Raw(mpv_abi::Format::NodeArray) };
    (node_map) => { $crate::property::PropertyType::Raw(mpv_abi::Format::NodeMap) };
}

macro_rules! property_value {
    (flag) => { bool };
    (int) => { i64 };
    (float) => { f64 };
    (str) => { ::std::string::String };
    (bytes) => { $crate::value::ByteString };
    (comma_list) => { $crate::value::CommaList };
    (node) => { mpv_abi::Node };
    (node_array) => { mpv_abi::Node };
    (node_map) => { mpv_abi::Node };
}

macro_rules! access {
    (r) => { $crate::property::Access::R };
    (w) => { $crate::property::Access::W };
    (rw) => { $crate::property::Access::RW };
}
