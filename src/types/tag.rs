//! Tag types and tag values.

use std::fmt;

use crate::codec::tag_id;
use crate::error::NbtError;
use crate::types::{Compound, TypedList};

/// The 12 NBT wire types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    End = tag_id::END,
    Byte = tag_id::BYTE,
    Short = tag_id::SHORT,
    Int = tag_id::INT,
    Long = tag_id::LONG,
    Float = tag_id::FLOAT,
    Double = tag_id::DOUBLE,
    ByteArray = tag_id::BYTE_ARRAY,
    String = tag_id::STRING,
    List = tag_id::LIST,
    Compound = tag_id::COMPOUND,
    IntArray = tag_id::INT_ARRAY,
}

impl TagType {
    /// All tag types in wire id order.
    pub const ALL: [TagType; 12] = [
        Self::End,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::ByteArray,
        Self::String,
        Self::List,
        Self::Compound,
        Self::IntArray,
    ];

    /// Resolves a wire id byte to its tag type.
    pub fn from_id(id: u8) -> Result<Self, NbtError> {
        Self::ALL
            .get(usize::from(id))
            .copied()
            .ok_or(NbtError::UnsupportedFormat(id))
    }

    /// The wire id of this tag type.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Infers the tag type of a value; an absent value is `End`.
    pub fn of(value: Option<&Tag>) -> Self {
        value.map_or(Self::End, Tag::tag_type)
    }

    /// Conventional `TAG_*` name.
    pub fn name(self) -> &'static str {
        match self {
            Self::End => "TAG_End",
            Self::Byte => "TAG_Byte",
            Self::Short => "TAG_Short",
            Self::Int => "TAG_Int",
            Self::Long => "TAG_Long",
            Self::Float => "TAG_Float",
            Self::Double => "TAG_Double",
            Self::ByteArray => "TAG_Byte_Array",
            Self::String => "TAG_String",
            Self::List => "TAG_List",
            Self::Compound => "TAG_Compound",
            Self::IntArray => "TAG_Int_Array",
        }
    }
}

impl TryFrom<u8> for TagType {
    type Error = NbtError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<TagType> for u8 {
    fn from(t: TagType) -> Self {
        t.id()
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Terminator. Never stored as data.
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(TypedList),
    Compound(Compound),
    IntArray(Vec<i32>),
}

impl Tag {
    /// The wire type of this value.
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::End => TagType::End,
            Self::Byte(_) => TagType::Byte,
            Self::Short(_) => TagType::Short,
            Self::Int(_) => TagType::Int,
            Self::Long(_) => TagType::Long,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
            Self::ByteArray(_) => TagType::ByteArray,
            Self::String(_) => TagType::String,
            Self::List(_) => TagType::List,
            Self::Compound(_) => TagType::Compound,
            Self::IntArray(_) => TagType::IntArray,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            Self::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            Self::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        match self {
            Self::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&TypedList> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Self::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// Unwraps a compound value, or reports what was found instead.
    pub fn into_compound(self) -> Result<Compound, NbtError> {
        match self {
            Self::Compound(c) => Ok(c),
            other => Err(NbtError::mismatch(TagType::Compound, other.tag_type())),
        }
    }
}

// -- Convenience conversions --

impl From<i8> for Tag {
    fn from(v: i8) -> Self {
        Self::Byte(v)
    }
}

impl From<bool> for Tag {
    fn from(b: bool) -> Self {
        Self::Byte(i8::from(b))
    }
}

impl From<i16> for Tag {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}

impl From<i32> for Tag {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Tag {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Tag {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Tag {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Vec<i8>> for Tag {
    fn from(v: Vec<i8>) -> Self {
        Self::ByteArray(v)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<TypedList> for Tag {
    fn from(l: TypedList) -> Self {
        Self::List(l)
    }
}

impl From<Compound> for Tag {
    fn from(c: Compound) -> Self {
        Self::Compound(c)
    }
}

impl From<Vec<i32>> for Tag {
    fn from(v: Vec<i32>) -> Self {
        Self::IntArray(v)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => write!(f, "end"),
            Self::Byte(v) => write!(f, "{v}b"),
            Self::Short(v) => write!(f, "{v}s"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Float(v) => write!(f, "{v}f"),
            Self::Double(v) => write!(f, "{v}d"),
            Self::ByteArray(v) => write!(f, "<{} bytes>", v.len()),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(l) => write!(f, "<{} x {}>", l.len(), l.element_type()),
            Self::Compound(c) => write!(f, "<compound with {} entries>", c.len()),
            Self::IntArray(v) => write!(f, "<{} ints>", v.len()),
        }
    }
}
