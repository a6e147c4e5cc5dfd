//! The keyed, heterogeneous `TAG_Compound` container.

use std::collections::HashMap;

use crate::error::{NbtError, Result};
use crate::serialize::{NbtSerializable, Registry, ToTag};
use crate::types::{Tag, TagType, TypedList};

/// A string-keyed map of tags that keeps insertion order.
///
/// Decoded compounds keep the order in which entries appeared on the wire, so
/// a decode/encode cycle reproduces the original bytes. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
    index: HashMap<String, usize>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.index.get(key).map(|&i| &mut self.entries[i].1)
    }

    /// Inserts a standard tag value, returning the value it replaced.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Tag>) -> Option<Tag> {
        let key = key.into();
        let value = value.into();
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        let i = self.index.remove(key)?;
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Tag> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub(crate) fn entries(&self) -> &[(String, Tag)] {
        &self.entries
    }

    // -- Application objects --

    /// Inserts `value` unchanged if it is a standard tag shape, otherwise
    /// serializes it (registered serializer first, then its native
    /// conversion) and inserts the resulting compound.
    pub fn insert_object<V: ToTag + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &V,
    ) -> Result<Option<Tag>> {
        let tag = Registry::global().to_tag(value)?;
        Ok(self.insert(key, tag))
    }

    /// Inserts `value` unchanged if it is already a standard tag shape,
    /// otherwise converts it through its registered serializer.
    pub fn insert_registered<T: 'static>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Option<Tag>> {
        let tag = Registry::global().to_tag_registered(value)?;
        Ok(self.insert(key, tag))
    }

    /// Deserializes the compound stored under `key` into `T`.
    pub fn get_as<T: NbtSerializable>(&self, key: &str) -> Result<T> {
        Registry::global().deserialize(self.require_compound(key)?)
    }

    /// Like [`get_as`](Self::get_as) but only consults registered serializers.
    pub fn get_registered<T: 'static>(&self, key: &str) -> Result<T> {
        Registry::global().deserialize_registered(self.require_compound(key)?)
    }

    // -- Typed access for serializer implementations --

    /// Returns the value under `key`, or `MissingKey`.
    pub fn require(&self, key: &str) -> Result<&Tag> {
        self.get(key).ok_or_else(|| NbtError::MissingKey(key.to_owned()))
    }

    pub fn require_byte(&self, key: &str) -> Result<i8> {
        let tag = self.require(key)?;
        tag.as_byte().ok_or_else(|| mismatch(TagType::Byte, tag))
    }

    pub fn require_short(&self, key: &str) -> Result<i16> {
        let tag = self.require(key)?;
        tag.as_short().ok_or_else(|| mismatch(TagType::Short, tag))
    }

    pub fn require_int(&self, key: &str) -> Result<i32> {
        let tag = self.require(key)?;
        tag.as_int().ok_or_else(|| mismatch(TagType::Int, tag))
    }

    pub fn require_long(&self, key: &str) -> Result<i64> {
        let tag = self.require(key)?;
        tag.as_long().ok_or_else(|| mismatch(TagType::Long, tag))
    }

    pub fn require_float(&self, key: &str) -> Result<f32> {
        let tag = self.require(key)?;
        tag.as_float().ok_or_else(|| mismatch(TagType::Float, tag))
    }

    pub fn require_double(&self, key: &str) -> Result<f64> {
        let tag = self.require(key)?;
        tag.as_double().ok_or_else(|| mismatch(TagType::Double, tag))
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        let tag = self.require(key)?;
        tag.as_str().ok_or_else(|| mismatch(TagType::String, tag))
    }

    pub fn require_list(&self, key: &str) -> Result<&TypedList> {
        let tag = self.require(key)?;
        tag.as_list().ok_or_else(|| mismatch(TagType::List, tag))
    }

    pub fn require_compound(&self, key: &str) -> Result<&Compound> {
        let tag = self.require(key)?;
        tag.as_compound().ok_or_else(|| mismatch(TagType::Compound, tag))
    }
}

fn mismatch(expected: TagType, found: &Tag) -> NbtError {
    NbtError::mismatch(expected, found.tag_type())
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<Tag>> FromIterator<(K, V)> for Compound {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut compound = Compound::new();
        compound.extend(iter);
        compound
    }
}

impl<K: Into<String>, V: Into<Tag>> Extend<(K, V)> for Compound {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Compound {
    type Item = (String, Tag);
    type IntoIter = std::vec::IntoIter<(String, Tag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces_in_place() {
        let mut c = Compound::new();
        assert_eq!(c.insert("b", 1i32), None);
        c.insert("a", "x");
        c.insert("c", 2i64);
        assert_eq!(c.insert("b", 3i32), Some(Tag::Int(1)));
        assert_eq!(c.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(c.get("b"), Some(&Tag::Int(3)));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn remove_reindexes() {
        let mut c: Compound = [("a", 1i32), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(c.remove("a"), Some(Tag::Int(1)));
        assert_eq!(c.remove("a"), None);
        assert_eq!(c.get("c"), Some(&Tag::Int(3)));
        c.insert("d", 4i32);
        assert_eq!(c.keys().collect::<Vec<_>>(), ["b", "c", "d"]);
        assert_eq!(c.get("d"), Some(&Tag::Int(4)));
    }

    #[test]
    fn equality_ignores_order() {
        let a: Compound = [("x", 1i32), ("y", 2)].into_iter().collect();
        let b: Compound = [("y", 2i32), ("x", 1)].into_iter().collect();
        let c: Compound = [("y", 2i32), ("x", 5)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn require_reports_missing_and_mismatched() {
        let mut c = Compound::new();
        c.insert("n", 7i32);
        assert_eq!(c.require_int("n").unwrap(), 7);
        assert!(matches!(c.require_int("m"), Err(NbtError::MissingKey(k)) if k == "m"));
        assert!(matches!(
            c.require_str("n"),
            Err(NbtError::TypeMismatch {
                expected: TagType::String,
                found: TagType::Int
            })
        ));
    }

    #[test]
    fn insert_registered_passes_standard_shapes_through() {
        let mut c = Compound::new();
        c.insert_registered("i", &5i32).unwrap();
        c.insert_registered("s", &String::from("v")).unwrap();
        c.insert_registered("t", &Tag::Long(9)).unwrap();
        assert_eq!(c.get("i"), Some(&Tag::Int(5)));
        assert_eq!(c.get("s"), Some(&Tag::String("v".into())));
        assert_eq!(c.get("t"), Some(&Tag::Long(9)));
    }

    #[test]
    fn insert_registered_rejects_unknown_types() {
        struct Unregistered;
        let mut c = Compound::new();
        assert!(matches!(
            c.insert_registered("u", &Unregistered),
            Err(NbtError::UnsupportedType(_))
        ));
        assert!(c.is_empty());
    }

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl NbtSerializable for Point {
        fn to_compound(&self) -> Result<Compound> {
            Ok([("x", self.x), ("y", self.y)].into_iter().collect())
        }

        fn from_compound(compound: &Compound) -> Result<Self> {
            Ok(Self {
                x: compound.require_int("x")?,
                y: compound.require_int("y")?,
            })
        }
    }

    #[test]
    fn nested_objects() {
        let mut c = Compound::new();
        c.insert_object("p", &Point { x: 1, y: -2 }).unwrap();
        assert_eq!(c.get("p").map(Tag::tag_type), Some(TagType::Compound));
        assert_eq!(c.get_as::<Point>("p").unwrap(), Point { x: 1, y: -2 });

        c.insert("q", 3i32);
        assert!(matches!(
            c.get_as::<Point>("q"),
            Err(NbtError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn insert_object_accepts_any_shape() {
        let mut c = Compound::new();
        c.insert_object("n", &12i16).unwrap();
        c.insert_object("s", "text").unwrap();
        c.insert_object("p", &Point { x: 0, y: 4 }).unwrap();
        assert_eq!(c.get("n"), Some(&Tag::Short(12)));
        assert_eq!(c.get("s"), Some(&Tag::from("text")));
        assert_eq!(c.require_compound("p").unwrap().require_int("y").unwrap(), 4);
    }
}
