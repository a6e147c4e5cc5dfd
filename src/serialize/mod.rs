//! Conversion between application types and compound tags.
//!
//! A conversion is resolved in a fixed order: a [`Serializer`] registered for
//! the type, then the type's own [`NbtSerializable`] implementation, otherwise
//! `UnsupportedType`. [`ToTag`] extends this to values of any shape: standard
//! tag payloads pass through unchanged. The free functions here use the process-wide
//! [`Registry::global`]; register serializers before any concurrent use.

mod native;
mod registry;

pub use native::{NbtSerializable, ToTag};
pub use registry::{Registry, Serializer};

use crate::error::Result;
use crate::types::{Compound, Tag};

/// Registers `serializer` for `T` in the global registry.
pub fn register<T: 'static>(serializer: impl Serializer<T>) {
    Registry::global().register::<T>(serializer);
}

/// Registers a pair of conversion functions for `T` in the global registry.
pub fn register_fn<T, S, D>(serialize: S, deserialize: D)
where
    T: 'static,
    S: Fn(&T) -> Result<Compound> + Send + Sync + 'static,
    D: Fn(&Compound) -> Result<T> + Send + Sync + 'static,
{
    Registry::global().register_fn::<T, S, D>(serialize, deserialize);
}

pub fn serialize<T: NbtSerializable>(value: &T) -> Result<Compound> {
    Registry::global().serialize(value)
}

pub fn deserialize<T: NbtSerializable>(compound: &Compound) -> Result<T> {
    Registry::global().deserialize(compound)
}

pub fn serialize_registered<T: 'static>(value: &T) -> Result<Compound> {
    Registry::global().serialize_registered(value)
}

pub fn deserialize_registered<T: 'static>(compound: &Compound) -> Result<T> {
    Registry::global().deserialize_registered(compound)
}

/// Returns standard tag shapes unchanged and converts application types
/// through the dispatch order.
pub fn to_tag<V: ToTag + ?Sized>(value: &V) -> Result<Tag> {
    Registry::global().to_tag(value)
}

/// Returns standard tag shapes unchanged and converts anything else with its
/// registered serializer.
pub fn to_tag_registered<T: 'static>(value: &T) -> Result<Tag> {
    Registry::global().to_tag_registered(value)
}
