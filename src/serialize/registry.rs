//! The serializer registry and dispatch resolution.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use super::native::{NbtSerializable, ToTag};
use crate::error::{NbtError, Result};
use crate::types::{Compound, Tag, TypedList};

/// Converts values of `T` to and from compounds on behalf of `T`.
///
/// Register one with [`Registry::register`] to add NBT support for a type you
/// do not own, or to override a type's own [`NbtSerializable`] conversion.
pub trait Serializer<T>: Send + Sync + 'static {
    fn serialize(&self, value: &T) -> Result<Compound>;

    fn deserialize(&self, compound: &Compound) -> Result<T>;
}

/// A [`Serializer`] built from a pair of functions.
struct FnSerializer<S, D> {
    ser: S,
    de: D,
}

impl<T, S, D> Serializer<T> for FnSerializer<S, D>
where
    S: Fn(&T) -> Result<Compound> + Send + Sync + 'static,
    D: Fn(&Compound) -> Result<T> + Send + Sync + 'static,
{
    fn serialize(&self, value: &T) -> Result<Compound> {
        (self.ser)(value)
    }

    fn deserialize(&self, compound: &Compound) -> Result<T> {
        (self.de)(compound)
    }
}

/// One registered serializer, stored type-erased under `TypeId::of::<T>()`.
struct SerializerEntry<T: 'static> {
    type_name: &'static str,
    serializer: Box<dyn Serializer<T>>,
}

type ErasedEntry = Arc<dyn Any + Send + Sync>;

/// Maps application types to their registered serializers.
///
/// Meant to be filled once at startup and read afterwards. Lookups hand out a
/// shared handle, so serializers run without the lock held and may dispatch
/// nested types themselves.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, ErasedEntry>>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the typed read/write entry points.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Registers `serializer` for `T`, replacing any earlier registration.
    pub fn register<T: 'static>(&self, serializer: impl Serializer<T>) {
        let type_name = std::any::type_name::<T>();
        let entry: ErasedEntry = Arc::new(SerializerEntry {
            type_name,
            serializer: Box::new(serializer),
        });
        let previous = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), entry);
        if previous.is_some() {
            tracing::debug!(type_name, "replaced NBT serializer");
        } else {
            tracing::debug!(type_name, "registered NBT serializer");
        }
    }

    /// Registers a serializer built from two functions.
    pub fn register_fn<T, S, D>(&self, serialize: S, deserialize: D)
    where
        T: 'static,
        S: Fn(&T) -> Result<Compound> + Send + Sync + 'static,
        D: Fn(&Compound) -> Result<T> + Send + Sync + 'static,
    {
        self.register::<T>(FnSerializer {
            ser: serialize,
            de: deserialize,
        });
    }

    /// Removes the serializer for `T`. Returns whether one was registered.
    pub fn unregister<T: 'static>(&self) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TypeId::of::<T>())
            .is_some()
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    fn lookup<T: 'static>(&self) -> Option<Arc<SerializerEntry<T>>> {
        let erased = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()?;
        // Keyed by TypeId::of::<T>, so the downcast cannot fail.
        erased.downcast::<SerializerEntry<T>>().ok()
    }

    // -- Dispatch --

    /// Converts `value` into a compound: registered serializer first, then the
    /// type's own [`NbtSerializable`] conversion.
    pub fn serialize<T: NbtSerializable>(&self, value: &T) -> Result<Compound> {
        match self.lookup::<T>() {
            Some(entry) => entry.serializer.serialize(value),
            None => value.to_compound(),
        }
    }

    /// Converts a compound into `T`: registered serializer first, then the
    /// type's own [`NbtSerializable`] conversion.
    pub fn deserialize<T: NbtSerializable>(&self, compound: &Compound) -> Result<T> {
        match self.lookup::<T>() {
            Some(entry) => entry.serializer.deserialize(compound),
            None => T::from_compound(compound),
        }
    }

    /// Converts `value` with the serializer registered for `T`, or fails with
    /// `UnsupportedType`.
    pub fn serialize_registered<T: 'static>(&self, value: &T) -> Result<Compound> {
        let entry = self.require::<T>()?;
        tracing::trace!(type_name = entry.type_name, "serializing with registered NBT serializer");
        entry.serializer.serialize(value)
    }

    /// Converts a compound with the serializer registered for `T`, or fails
    /// with `UnsupportedType`.
    pub fn deserialize_registered<T: 'static>(&self, compound: &Compound) -> Result<T> {
        let entry = self.require::<T>()?;
        tracing::trace!(type_name = entry.type_name, "deserializing with registered NBT serializer");
        entry.serializer.deserialize(compound)
    }

    /// Converts a value into a tag.
    ///
    /// Standard tag shapes are returned unchanged. Other values become
    /// compounds: registered serializer first, then their own
    /// [`NbtSerializable`] conversion.
    pub fn to_tag<V: ToTag + ?Sized>(&self, value: &V) -> Result<Tag> {
        value.to_tag(self)
    }

    /// Converts any value into a tag without a native fallback.
    ///
    /// Values that already have one of the standard tag shapes are returned
    /// unchanged; anything else goes through its registered serializer.
    pub fn to_tag_registered<T: 'static>(&self, value: &T) -> Result<Tag> {
        match standard_tag(value) {
            Some(tag) => Ok(tag),
            None => self.serialize_registered(value).map(Tag::Compound),
        }
    }

    fn require<T: 'static>(&self) -> Result<Arc<SerializerEntry<T>>> {
        self.lookup::<T>()
            .ok_or_else(|| NbtError::UnsupportedType(std::any::type_name::<T>()))
    }
}

/// Matches `value` against the fixed set of standard tag payload types.
fn standard_tag(value: &dyn Any) -> Option<Tag> {
    macro_rules! standard_shapes {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(Tag::from(v.clone()));
                }
            )*
        };
    }

    if let Some(tag) = value.downcast_ref::<Tag>() {
        return Some(tag.clone());
    }
    standard_shapes!(i8, i16, i32, i64, f32, f64, Vec<i8>, String, TypedList, Compound, Vec<i32>);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagType;

    #[derive(Debug, PartialEq)]
    struct Pos {
        x: i32,
    }

    impl NbtSerializable for Pos {
        fn to_compound(&self) -> Result<Compound> {
            Ok([("native", self.x)].into_iter().collect())
        }

        fn from_compound(compound: &Compound) -> Result<Self> {
            Ok(Pos {
                x: compound.require_int("native")?,
            })
        }
    }

    struct PosSerializer;

    impl Serializer<Pos> for PosSerializer {
        fn serialize(&self, value: &Pos) -> Result<Compound> {
            Ok([("registered", value.x)].into_iter().collect())
        }

        fn deserialize(&self, compound: &Compound) -> Result<Pos> {
            Ok(Pos {
                x: compound.require_int("registered")? * 10,
            })
        }
    }

    #[test]
    fn native_conversion_without_registration() {
        let registry = Registry::new();
        let compound = registry.serialize(&Pos { x: 3 }).unwrap();
        assert_eq!(compound.get("native"), Some(&Tag::Int(3)));
        assert_eq!(registry.deserialize::<Pos>(&compound).unwrap(), Pos { x: 3 });
    }

    #[test]
    fn registered_serializer_overrides_native() {
        let registry = Registry::new();
        registry.register::<Pos>(PosSerializer);

        let compound = registry.serialize(&Pos { x: 3 }).unwrap();
        assert_eq!(compound.get("registered"), Some(&Tag::Int(3)));
        assert!(!compound.contains_key("native"));
        assert_eq!(registry.deserialize::<Pos>(&compound).unwrap(), Pos { x: 30 });

        assert!(registry.unregister::<Pos>());
        let compound = registry.serialize(&Pos { x: 3 }).unwrap();
        assert!(compound.contains_key("native"));
    }

    #[test]
    fn later_registration_wins() {
        let registry = Registry::new();
        registry.register::<Pos>(PosSerializer);
        registry.register_fn::<Pos, _, _>(
            |p: &Pos| Ok([("second", p.x)].into_iter().collect()),
            |c: &Compound| Ok(Pos { x: c.require_int("second")? }),
        );
        let compound = registry.serialize(&Pos { x: 1 }).unwrap();
        assert!(compound.contains_key("second"));
    }

    #[test]
    fn registered_only_dispatch() {
        struct Foreign(u64);

        let registry = Registry::new();
        assert!(matches!(
            registry.serialize_registered(&Foreign(1)),
            Err(NbtError::UnsupportedType(name)) if name.ends_with("Foreign")
        ));
        assert!(registry
            .deserialize_registered::<Foreign>(&Compound::new())
            .is_err());

        registry.register_fn::<Foreign, _, _>(
            |f: &Foreign| Ok([("v", f.0 as i64)].into_iter().collect()),
            |c: &Compound| Ok(Foreign(c.require_long("v")? as u64)),
        );
        assert!(registry.is_registered::<Foreign>());
        let compound = registry.serialize_registered(&Foreign(7)).unwrap();
        let back: Foreign = registry.deserialize_registered(&compound).unwrap();
        assert_eq!(back.0, 7);
    }

    #[test]
    fn to_tag_identity_for_standard_shapes() {
        let registry = Registry::new();
        assert_eq!(registry.to_tag(&7i8).unwrap(), Tag::Byte(7));
        assert_eq!(registry.to_tag(&7i16).unwrap(), Tag::Short(7));
        assert_eq!(registry.to_tag(&7i32).unwrap(), Tag::Int(7));
        assert_eq!(registry.to_tag(&7i64).unwrap(), Tag::Long(7));
        assert_eq!(registry.to_tag(&1.0f32).unwrap(), Tag::Float(1.0));
        assert_eq!(registry.to_tag(&1.0f64).unwrap(), Tag::Double(1.0));
        assert_eq!(registry.to_tag(&vec![1i8]).unwrap(), Tag::ByteArray(vec![1]));
        assert_eq!(registry.to_tag(&String::from("s")).unwrap(), Tag::from("s"));
        assert_eq!(registry.to_tag("s").unwrap(), Tag::from("s"));
        assert_eq!(registry.to_tag(&vec![1i32]).unwrap(), Tag::IntArray(vec![1]));
        assert_eq!(
            registry.to_tag(&TypedList::empty()).unwrap().tag_type(),
            TagType::List
        );
        assert_eq!(
            registry.to_tag(&Compound::new()).unwrap().tag_type(),
            TagType::Compound
        );
        assert_eq!(registry.to_tag(&Tag::Long(1)).unwrap(), Tag::Long(1));
    }

    #[test]
    fn to_tag_falls_back_to_native_conversion() {
        let registry = Registry::new();
        let tag = registry.to_tag(&Pos { x: 1 }).unwrap();
        assert_eq!(
            tag.as_compound().and_then(|c| c.get("native")),
            Some(&Tag::Int(1))
        );

        registry.register::<Pos>(PosSerializer);
        let tag = registry.to_tag(&Pos { x: 1 }).unwrap();
        assert_eq!(
            tag.as_compound().and_then(|c| c.get("registered")),
            Some(&Tag::Int(1))
        );
    }

    #[test]
    fn to_tag_registered_skips_native_conversion() {
        let registry = Registry::new();
        assert_eq!(
            registry.to_tag_registered(&7i32).unwrap(),
            Tag::Int(7)
        );
        assert!(matches!(
            registry.to_tag_registered(&Pos { x: 1 }),
            Err(NbtError::UnsupportedType(_))
        ));
        registry.register::<Pos>(PosSerializer);
        let tag = registry.to_tag_registered(&Pos { x: 1 }).unwrap();
        assert_eq!(
            tag.as_compound().and_then(|c| c.get("registered")),
            Some(&Tag::Int(1))
        );
    }

    #[test]
    fn serializers_may_dispatch_recursively() {
        struct Outer(Pos);

        let registry = Arc::new(Registry::new());
        let inner = Arc::clone(&registry);
        let inner_de = Arc::clone(&registry);
        registry.register_fn::<Outer, _, _>(
            move |o: &Outer| {
                let mut c = Compound::new();
                c.insert("pos", inner.serialize(&o.0)?);
                Ok(c)
            },
            move |c: &Compound| Ok(Outer(inner_de.deserialize(c.require_compound("pos")?)?)),
        );

        let compound = registry.serialize_registered(&Outer(Pos { x: 4 })).unwrap();
        let back: Outer = registry.deserialize_registered(&compound).unwrap();
        assert_eq!(back.0, Pos { x: 4 });
    }
}
