//! Named tags: the unit that appears at the top level and inside compounds.

use bytes::{Buf, BytesMut};

use crate::codec::{decode, encode, CodecOptions};
use crate::error::Result;
use crate::serialize::{NbtSerializable, Registry};
use crate::types::Tag;

/// A value paired with its name.
///
/// `T` is [`Tag`] for untyped data, or an application type converted through
/// the serialization dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag<T = Tag> {
    pub name: String,
    pub value: T,
}

impl<T> NamedTag<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn into_parts(self) -> (String, T) {
        (self.name, self.value)
    }
}

impl NamedTag<Tag> {
    /// The terminator of a compound: empty name, `End` value.
    pub fn end() -> Self {
        Self::new(String::new(), Tag::End)
    }

    pub fn is_end(&self) -> bool {
        self.value.is_end()
    }

    /// Reads one named tag using default options.
    pub fn read(buf: &mut impl Buf) -> Result<Self> {
        Self::read_with(buf, &CodecOptions::default())
    }

    pub fn read_with(buf: &mut impl Buf, options: &CodecOptions) -> Result<Self> {
        decode::decode_named(buf, options)
    }

    /// Appends this tag to `buf` using default options.
    ///
    /// Nothing is appended if encoding fails.
    pub fn write(&self, buf: &mut BytesMut) -> Result<()> {
        self.write_with(buf, &CodecOptions::default())
    }

    pub fn write_with(&self, buf: &mut BytesMut, options: &CodecOptions) -> Result<()> {
        let mut staged = BytesMut::new();
        encode::encode_named(&mut staged, &self.name, &self.value, options)?;
        buf.extend_from_slice(&staged);
        Ok(())
    }

    /// Converts the compound value into `T`, keeping the name.
    pub fn deserialize<T: NbtSerializable>(self) -> Result<NamedTag<T>> {
        let compound = self.value.into_compound()?;
        let value = Registry::global().deserialize(&compound)?;
        Ok(NamedTag::new(self.name, value))
    }

    /// Like [`deserialize`](Self::deserialize) but only consults registered
    /// serializers.
    pub fn deserialize_registered<T: 'static>(self) -> Result<NamedTag<T>> {
        let compound = self.value.into_compound()?;
        let value = Registry::global().deserialize_registered(&compound)?;
        Ok(NamedTag::new(self.name, value))
    }
}

impl<T: NbtSerializable> NamedTag<T> {
    /// Reads a named compound and converts it into `T`.
    pub fn read_as(buf: &mut impl Buf) -> Result<Self> {
        NamedTag::<Tag>::read(buf)?.deserialize()
    }

    /// Converts the value into a compound and appends it to `buf`.
    pub fn write_as(&self, buf: &mut BytesMut) -> Result<()> {
        self.serialize()?.write(buf)
    }

    /// Converts the value into a compound tag, keeping the name.
    pub fn serialize(&self) -> Result<NamedTag<Tag>> {
        let compound = Registry::global().serialize(&self.value)?;
        Ok(NamedTag::new(self.name.clone(), Tag::Compound(compound)))
    }
}

impl<T: 'static> NamedTag<T> {
    /// Reads a named compound and converts it with the serializer registered
    /// for `T`.
    pub fn read_registered(buf: &mut impl Buf) -> Result<Self> {
        NamedTag::<Tag>::read(buf)?.deserialize_registered()
    }

    pub fn write_registered(&self, buf: &mut BytesMut) -> Result<()> {
        self.serialize_registered()?.write(buf)
    }

    pub fn serialize_registered(&self) -> Result<NamedTag<Tag>> {
        let compound = Registry::global().serialize_registered(&self.value)?;
        Ok(NamedTag::new(self.name.clone(), Tag::Compound(compound)))
    }
}

impl From<(String, Tag)> for NamedTag<Tag> {
    fn from((name, value): (String, Tag)) -> Self {
        Self::new(name, value)
    }
}
