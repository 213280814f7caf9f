//! Typed property handles
//!
//! A [`PropertyHandle`] pairs a host (the player) with a marker type from the
//! property table. Every typed read and write funnels into the host's
//! [`PropertyHost`] implementation, so the typed surface and the name-indexed
//! surface share one code path.

use std::marker::PhantomData;

use crate::property::{Access, PropertySpec, PropertyType};
use crate::value::{Value, ValueError};

/// Something that can read and write properties by descriptor.
pub trait PropertyHost {
    type Error: From<ValueError>;

    /// Read a property, coerced to its declared type. `Ok(None)` means the
    /// native layer reported no value.
    fn read_property(&self, spec: &PropertySpec) -> Result<Option<Value>, Self::Error>;

    /// Write a property after coercion to its declared type.
    fn write_property(&self, spec: &PropertySpec, value: Value) -> Result<(), Self::Error>;
}

/// Compile-time description of one table property.
///
/// Implemented by the marker types generated from the property table.
pub trait MpvProperty {
    const NAME: &'static str;
    const KIND: PropertyType;
    const ACCESS: Access;

    /// Rust type values of this property convert to.
    type Value: Into<Value> + TryFrom<Value, Error = ValueError>;

    fn spec() -> PropertySpec {
        PropertySpec::new(Self::NAME, Self::KIND, Self::ACCESS)
    }
}

/// Typed access to one property on a host.
///
/// # Example
///
/// ```rust,ignore
/// use mpv_properties::Attributes;
///
/// mpv.osd_level().set(0)?;
/// let muted: Option<bool> = mpv.mute().get()?;
/// ```
pub struct PropertyHandle<'a, H, P> {
    host: &'a H,
    _property: PhantomData<P>,
}

impl<'a, H: PropertyHost, P: MpvProperty> PropertyHandle<'a, H, P> {
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            _property: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        P::NAME
    }

    pub fn spec(&self) -> PropertySpec {
        P::spec()
    }

    /// Current value, or `None` when the native layer reports none.
    pub fn get(&self) -> Result<Option<P::Value>, H::Error> {
        match self.host.read_property(&P::spec())? {
            Some(value) => Ok(Some(P::Value::try_from(value)?)),
            None => Ok(None),
        }
    }

    pub fn set(&self, value: impl Into<P::Value>) -> Result<(), H::Error> {
        let value: P::Value = value.into();
        self.host.write_property(&P::spec(), value.into())
    }
}

impl<H, P> Clone for PropertyHandle<'_, H, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H, P> Copy for PropertyHandle<'_, H, P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{from_native, to_native};
    use crate::table::{Attributes, Mute, OsdLevel};
    use mpv_abi::{MpvError, Node};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Host backed by a map of native nodes.
    #[derive(Default)]
    struct MapHost {
        nodes: RefCell<HashMap<&'static str, Node>>,
    }

    #[derive(Debug)]
    enum HostError {
        Native(MpvError),
        Value(ValueError),
    }

    impl From<ValueError> for HostError {
        fn from(err: ValueError) -> Self {
            HostError::Value(err)
        }
    }

    impl PropertyHost for MapHost {
        type Error = HostError;

        fn read_property(&self, spec: &PropertySpec) -> Result<Option<Value>, HostError> {
            let node = self.nodes.borrow().get(spec.name).cloned().unwrap_or_default();
            Ok(from_native(spec.kind, node))
        }

        fn write_property(&self, spec: &PropertySpec, value: Value) -> Result<(), HostError> {
            let (_, node) = to_native(spec, value).map_err(HostError::Native)?;
            self.nodes.borrow_mut().insert(spec.name, node);
            Ok(())
        }
    }

    #[test]
    fn test_typed_round_trip() {
        let host = MapHost::default();
        host.osd_level().set(0).unwrap();
        host.mute().set(true).unwrap();
        host.loop_().set("inf").unwrap();

        assert_eq!(host.osd_level().get().unwrap(), Some(0));
        assert_eq!(host.mute().get().unwrap(), Some(true));
        assert_eq!(host.loop_().get().unwrap().as_deref(), Some("inf"));
        assert_eq!(host.volume().get().unwrap(), None);
    }

    #[test]
    fn test_handle_metadata() {
        let host = MapHost::default();
        let handle: PropertyHandle<'_, _, OsdLevel> = PropertyHandle::new(&host);
        assert_eq!(handle.name(), "osd-level");
        assert_eq!(handle.spec().kind, PropertyType::Int);
        assert_eq!(Mute::spec().access, Access::RW);
    }

    #[test]
    fn test_mismatched_native_value_surfaces_value_error() {
        let host = MapHost::default();
        host.nodes.borrow_mut().insert("mute", Node::from("sometimes"));
        assert!(matches!(host.mute().get(), Err(HostError::Value(_))));
    }
}
