//! The homogeneous `TAG_List` container.

use crate::error::{NbtError, Result};
use crate::serialize::{NbtSerializable, Registry};
use crate::types::{Compound, Tag, TagType};

/// An ordered list whose elements all share one declared tag type.
///
/// The element type is checked on construction and on every insertion. An
/// empty list may declare any type; `End` means "empty, type unknown" and
/// such a list never holds elements.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedList {
    element_type: TagType,
    elements: Vec<Tag>,
}

impl TypedList {
    /// Creates an empty list of the given element type.
    pub fn new(element_type: TagType) -> Self {
        Self {
            element_type,
            elements: Vec::new(),
        }
    }

    /// The empty list of unknown element type.
    pub fn empty() -> Self {
        Self::new(TagType::End)
    }

    /// Builds a list, checking every element against `element_type`.
    pub fn from_tags(element_type: TagType, elements: Vec<Tag>) -> Result<Self> {
        for e in &elements {
            check(element_type, e)?;
        }
        Ok(Self {
            element_type,
            elements,
        })
    }

    /// Builds a list from values, taking the element type from the first one.
    pub fn from_values<V: Into<Tag>>(values: impl IntoIterator<Item = V>) -> Result<Self> {
        let elements: Vec<Tag> = values.into_iter().map(Into::into).collect();
        let element_type = elements.first().map_or(TagType::End, Tag::tag_type);
        Self::from_tags(element_type, elements)
    }

    /// Caller guarantees every element matches `element_type`.
    pub(crate) fn from_parts(element_type: TagType, elements: Vec<Tag>) -> Self {
        debug_assert!(elements.iter().all(|e| e.tag_type() == element_type));
        Self {
            element_type,
            elements,
        }
    }

    pub fn element_type(&self) -> TagType {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.elements.iter()
    }

    /// Appends a value; fails with `TypeMismatch` if its type differs.
    pub fn push(&mut self, value: impl Into<Tag>) -> Result<()> {
        let value = value.into();
        check(self.element_type, &value)?;
        self.elements.push(value);
        Ok(())
    }

    /// Inserts a value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: impl Into<Tag>) -> Result<()> {
        let value = value.into();
        check(self.element_type, &value)?;
        self.elements.insert(index, value);
        Ok(())
    }

    /// Replaces the element at `index`, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, value: impl Into<Tag>) -> Result<Tag> {
        let value = value.into();
        check(self.element_type, &value)?;
        Ok(std::mem::replace(&mut self.elements[index], value))
    }

    pub fn remove(&mut self, index: usize) -> Option<Tag> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn into_inner(self) -> (TagType, Vec<Tag>) {
        (self.element_type, self.elements)
    }

    // -- Application objects --

    /// Serializes every item into a `Compound`-typed list.
    pub fn from_objects<T: NbtSerializable>(items: &[T]) -> Result<Self> {
        let registry = Registry::global();
        let elements = items
            .iter()
            .map(|item| registry.serialize(item).map(Tag::Compound))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(TagType::Compound, elements))
    }

    /// Like [`from_objects`](Self::from_objects) but only consults registered
    /// serializers.
    pub fn from_objects_registered<T: 'static>(items: &[T]) -> Result<Self> {
        let registry = Registry::global();
        let elements = items
            .iter()
            .map(|item| registry.serialize_registered(item).map(Tag::Compound))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(TagType::Compound, elements))
    }

    /// Deserializes every element. The list must be `Compound`-typed.
    pub fn deserialize_all<T: NbtSerializable>(&self) -> Result<Vec<T>> {
        let registry = Registry::global();
        self.compounds()?
            .map(|c| registry.deserialize(c))
            .collect()
    }

    /// Like [`deserialize_all`](Self::deserialize_all) but only consults
    /// registered serializers.
    pub fn deserialize_all_registered<T: 'static>(&self) -> Result<Vec<T>> {
        let registry = Registry::global();
        self.compounds()?
            .map(|c| registry.deserialize_registered(c))
            .collect()
    }

    /// Iterates the elements as compounds; a `TypeMismatch` unless the list is
    /// `Compound`-typed.
    pub fn compounds(&self) -> Result<impl Iterator<Item = &Compound>> {
        if self.element_type != TagType::Compound {
            return Err(NbtError::mismatch(TagType::Compound, self.element_type));
        }
        Ok(self.elements.iter().filter_map(Tag::as_compound))
    }
}

fn check(element_type: TagType, value: &Tag) -> Result<()> {
    let found = value.tag_type();
    if found != element_type || found == TagType::End {
        return Err(NbtError::mismatch(element_type, found));
    }
    Ok(())
}

impl Default for TypedList {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a TypedList {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for TypedList {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
