//! The native conversion capabilities.

use super::registry::Registry;
use crate::error::Result;
use crate::types::{Compound, Tag, TypedList};

/// A type that knows how to convert itself to and from a compound.
///
/// A [`Serializer`](super::Serializer) registered for the same type takes
/// precedence over this implementation.
pub trait NbtSerializable: Sized + 'static {
    /// Creates a compound representation of this value.
    fn to_compound(&self) -> Result<Compound>;

    /// Restores a value from its compound representation.
    fn from_compound(compound: &Compound) -> Result<Self>;
}

/// A value that can be stored as a tag.
///
/// Standard tag shapes convert to themselves. Every [`NbtSerializable`] type
/// converts to a compound, through a serializer registered in `registry` if
/// there is one and its own implementation otherwise.
pub trait ToTag {
    fn to_tag(&self, registry: &Registry) -> Result<Tag>;
}

impl<T: NbtSerializable> ToTag for T {
    fn to_tag(&self, registry: &Registry) -> Result<Tag> {
        registry.serialize(self).map(Tag::Compound)
    }
}

macro_rules! standard_shape {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToTag for $ty {
                fn to_tag(&self, _: &Registry) -> Result<Tag> {
                    Ok(Tag::from(self.clone()))
                }
            }
        )*
    };
}

standard_shape!(Tag, i8, i16, i32, i64, f32, f64, Vec<i8>, String, TypedList, Compound, Vec<i32>, bool);

impl ToTag for str {
    fn to_tag(&self, _: &Registry) -> Result<Tag> {
        Ok(Tag::from(self))
    }
}
