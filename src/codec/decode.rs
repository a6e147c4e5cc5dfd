//! NBT decoding: bytes → `Tag`.
//!
//! Lists and compounds are decoded with an explicit stack of open containers
//! instead of recursion, so stack use stays flat however deep the input nests.
//! The depth guard still bounds how many containers may be open at once.

use bytes::Buf;

use super::depth::Depth;
use super::mutf8;
use super::options::{CodecOptions, StringEncoding};
use crate::error::{NbtError, Result};
use crate::types::{Compound, NamedTag, Tag, TagType, TypedList};

/// Decodes one named tag.
///
/// A leading `End` id yields the terminator (empty name, `Tag::End`) and
/// consumes a single byte.
pub fn decode_named(buf: &mut impl Buf, options: &CodecOptions) -> Result<NamedTag> {
    let mut depth = Depth::new(options.depth_limit());
    let tag = decode_named_tag(buf, options.encoding(), &mut depth)?;
    tracing::trace!(name = %tag.name, tag_type = %tag.value.tag_type(), "decoded NBT tag");
    Ok(tag)
}

/// Decodes a bare payload of the given type with default options.
pub fn decode_value(buf: &mut impl Buf, tag_type: TagType) -> Result<Tag> {
    let options = CodecOptions::default();
    let mut depth = Depth::new(options.depth_limit());
    decode_payload(buf, tag_type, options.encoding(), &mut depth)
}

fn decode_named_tag(
    buf: &mut impl Buf,
    encoding: StringEncoding,
    depth: &mut Depth,
) -> Result<NamedTag> {
    let tag_type = decode_tag_type(buf)?;
    if tag_type == TagType::End {
        return Ok(NamedTag::end());
    }
    let name = decode_string(buf, encoding)?;
    let value = decode_payload(buf, tag_type, encoding, depth)?;
    Ok(NamedTag::new(name, value))
}

/// A container still waiting for children.
enum Open {
    List {
        element_type: TagType,
        remaining: usize,
        elements: Vec<Tag>,
    },
    Compound {
        compound: Compound,
        key: String,
    },
}

impl Open {
    fn finish(self) -> Tag {
        match self {
            Open::List {
                element_type,
                elements,
                ..
            } => Tag::List(TypedList::from_parts(element_type, elements)),
            Open::Compound { compound, .. } => Tag::Compound(compound),
        }
    }
}

/// Decodes the payload of a tag whose type is already known.
///
/// Levels opened on `depth` are released again when this returns.
pub fn decode_payload(
    buf: &mut impl Buf,
    tag_type: TagType,
    encoding: StringEncoding,
    depth: &mut Depth,
) -> Result<Tag> {
    depth.scoped(|depth| decode_tree(buf, tag_type, encoding, depth))
}

fn decode_tree(
    buf: &mut impl Buf,
    root: TagType,
    encoding: StringEncoding,
    depth: &mut Depth,
) -> Result<Tag> {
    let mut open: Vec<Open> = Vec::new();
    let mut next = root;
    loop {
        let mut value = match next {
            TagType::End => Tag::End,
            TagType::Byte => {
                ensure_remaining(buf, 1)?;
                Tag::Byte(buf.get_i8())
            }
            TagType::Short => {
                ensure_remaining(buf, 2)?;
                Tag::Short(buf.get_i16())
            }
            TagType::Int => {
                ensure_remaining(buf, 4)?;
                Tag::Int(buf.get_i32())
            }
            TagType::Long => {
                ensure_remaining(buf, 8)?;
                Tag::Long(buf.get_i64())
            }
            TagType::Float => {
                ensure_remaining(buf, 4)?;
                Tag::Float(buf.get_f32())
            }
            TagType::Double => {
                ensure_remaining(buf, 8)?;
                Tag::Double(buf.get_f64())
            }
            TagType::ByteArray => Tag::ByteArray(decode_byte_array(buf)?),
            TagType::String => Tag::String(decode_string(buf, encoding)?),
            TagType::IntArray => Tag::IntArray(decode_int_array(buf)?),
            TagType::List => {
                depth.enter()?;
                let (element_type, len) = decode_list_header(buf)?;
                if len == 0 {
                    depth.leave();
                    Tag::List(TypedList::new(element_type))
                } else {
                    // Every element takes at least one byte.
                    let elements = Vec::with_capacity(len.min(buf.remaining()));
                    open.push(Open::List {
                        element_type,
                        remaining: len,
                        elements,
                    });
                    next = element_type;
                    continue;
                }
            }
            TagType::Compound => {
                depth.enter()?;
                match decode_entry_header(buf, encoding)? {
                    Some((tag_type, key)) => {
                        open.push(Open::Compound {
                            compound: Compound::new(),
                            key,
                        });
                        next = tag_type;
                        continue;
                    }
                    None => {
                        depth.leave();
                        Tag::Compound(Compound::new())
                    }
                }
            }
        };

        // Hand the value to its parent, closing every container it completes.
        loop {
            let Some(mut parent) = open.pop() else {
                return Ok(value);
            };
            let wanted = match &mut parent {
                Open::List {
                    element_type,
                    remaining,
                    elements,
                } => {
                    elements.push(value);
                    *remaining -= 1;
                    (*remaining > 0).then_some(*element_type)
                }
                Open::Compound { compound, key } => {
                    // Duplicate keys: the last one wins.
                    compound.insert(std::mem::take(key), value);
                    decode_entry_header(buf, encoding)?.map(|(tag_type, name)| {
                        *key = name;
                        tag_type
                    })
                }
            };
            match wanted {
                Some(tag_type) => {
                    open.push(parent);
                    next = tag_type;
                    break;
                }
                None => {
                    depth.leave();
                    value = parent.finish();
                }
            }
        }
    }
}

/// Decodes a u16-length-prefixed string.
pub fn decode_string(buf: &mut impl Buf, encoding: StringEncoding) -> Result<String> {
    ensure_remaining(buf, 2)?;
    let len = usize::from(buf.get_u16());
    ensure_remaining(buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    match encoding {
        StringEncoding::ModifiedUtf8 => mutf8::decode(&data),
        StringEncoding::Utf8 => String::from_utf8(data)
            .map_err(|e| NbtError::malformed(format!("invalid UTF-8 string: {e}"))),
    }
}

fn decode_tag_type(buf: &mut impl Buf) -> Result<TagType> {
    ensure_remaining(buf, 1)?;
    TagType::from_id(buf.get_u8())
}

/// Reads the id and name of the next compound entry, or `None` at the
/// terminator.
fn decode_entry_header(
    buf: &mut impl Buf,
    encoding: StringEncoding,
) -> Result<Option<(TagType, String)>> {
    if !buf.has_remaining() {
        return Err(NbtError::malformed(
            "stream ended before compound terminator",
        ));
    }
    let tag_type = decode_tag_type(buf)?;
    if tag_type == TagType::End {
        return Ok(None);
    }
    let name = decode_string(buf, encoding)?;
    Ok(Some((tag_type, name)))
}

/// Reads a list's element type and count.
pub(super) fn decode_list_header(buf: &mut impl Buf) -> Result<(TagType, usize)> {
    let element_type = decode_tag_type(buf)?;
    let len = decode_len(buf, "list")?;
    if element_type == TagType::End && len > 0 {
        return Err(NbtError::malformed(format!(
            "list of TAG_End declares {len} elements"
        )));
    }
    Ok((element_type, len))
}

fn decode_byte_array(buf: &mut impl Buf) -> Result<Vec<i8>> {
    let len = decode_len(buf, "byte array")?;
    ensure_remaining(buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(data.into_iter().map(|b| b as i8).collect())
}

fn decode_int_array(buf: &mut impl Buf) -> Result<Vec<i32>> {
    let len = decode_len(buf, "int array")?;
    let byte_len = len
        .checked_mul(4)
        .ok_or_else(|| NbtError::malformed(format!("int array length {len} overflows")))?;
    ensure_remaining(buf, byte_len)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(buf.get_i32());
    }
    Ok(values)
}

/// Reads an i32 element count; negative counts are malformed.
pub(super) fn decode_len(buf: &mut impl Buf, what: &str) -> Result<usize> {
    ensure_remaining(buf, 4)?;
    let len = buf.get_i32();
    usize::try_from(len).map_err(|_| NbtError::malformed(format!("negative {what} length {len}")))
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        Err(NbtError::malformed(format!(
            "need {needed} bytes but only {} remaining",
            buf.remaining()
        )))
    } else {
        Ok(())
    }
}
