//! NBT encoding: `Tag` → bytes.
//!
//! Like the decoder, nested containers are walked with an explicit stack so
//! deep trees do not consume call stack.

use bytes::{BufMut, BytesMut};

use super::depth::Depth;
use super::mutf8;
use super::options::{CodecOptions, StringEncoding};
use super::tag_id;
use crate::error::{NbtError, Result};
use crate::types::Tag;

/// Encodes a named tag: id byte, name (unless `End`), payload.
///
/// An `End` tag is the bare terminator byte and cannot carry a name.
pub fn encode_named(
    buf: &mut BytesMut,
    name: &str,
    tag: &Tag,
    options: &CodecOptions,
) -> Result<()> {
    let mut depth = Depth::new(options.depth_limit());
    encode_named_tag(buf, name, tag, options.encoding(), &mut depth)?;
    tracing::trace!(name, tag_type = %tag.tag_type(), bytes = buf.len(), "encoded NBT tag");
    Ok(())
}

/// Encodes a bare payload with default options.
pub fn encode_value(buf: &mut BytesMut, tag: &Tag) -> Result<()> {
    let options = CodecOptions::default();
    let mut depth = Depth::new(options.depth_limit());
    encode_payload(buf, tag, options.encoding(), &mut depth)
}

fn encode_named_tag(
    buf: &mut BytesMut,
    name: &str,
    tag: &Tag,
    encoding: StringEncoding,
    depth: &mut Depth,
) -> Result<()> {
    if tag.is_end() {
        if !name.is_empty() {
            return Err(NbtError::malformed(format!(
                "TAG_End cannot be named ({name:?})"
            )));
        }
        buf.put_u8(tag_id::END);
        return Ok(());
    }
    buf.put_u8(tag.tag_type().id());
    encode_string(buf, name, encoding)?;
    encode_payload(buf, tag, encoding, depth)
}

/// A container whose children are still being written.
enum Open<'a> {
    List(std::slice::Iter<'a, Tag>),
    Compound(std::slice::Iter<'a, (String, Tag)>),
}

/// Encodes the payload of `tag` without id or name.
///
/// Levels opened on `depth` are released again when this returns.
pub fn encode_payload(
    buf: &mut BytesMut,
    tag: &Tag,
    encoding: StringEncoding,
    depth: &mut Depth,
) -> Result<()> {
    depth.scoped(|depth| encode_tree(buf, tag, encoding, depth))
}

fn encode_tree<'a>(
    buf: &mut BytesMut,
    root: &'a Tag,
    encoding: StringEncoding,
    depth: &mut Depth,
) -> Result<()> {
    let mut open: Vec<Open<'a>> = Vec::new();
    let mut next = root;
    loop {
        match next {
            Tag::End => {}
            Tag::Byte(v) => buf.put_i8(*v),
            Tag::Short(v) => buf.put_i16(*v),
            Tag::Int(v) => buf.put_i32(*v),
            Tag::Long(v) => buf.put_i64(*v),
            Tag::Float(v) => buf.put_f32(*v),
            Tag::Double(v) => buf.put_f64(*v),
            Tag::ByteArray(values) => {
                encode_len(buf, values.len(), "byte array")?;
                buf.reserve(values.len());
                for &b in values {
                    buf.put_i8(b);
                }
            }
            Tag::String(s) => encode_string(buf, s, encoding)?,
            Tag::IntArray(values) => {
                encode_len(buf, values.len(), "int array")?;
                buf.reserve(values.len() * 4);
                for &v in values {
                    buf.put_i32(v);
                }
            }
            Tag::List(list) => {
                depth.enter()?;
                buf.put_u8(list.element_type().id());
                encode_len(buf, list.len(), "list")?;
                open.push(Open::List(list.iter()));
            }
            Tag::Compound(compound) => {
                depth.enter()?;
                open.push(Open::Compound(compound.entries().iter()));
            }
        }

        // Find the next child, closing every container that has none left.
        next = loop {
            let Some(parent) = open.last_mut() else {
                return Ok(());
            };
            match parent {
                Open::List(elements) => {
                    if let Some(element) = elements.next() {
                        break element;
                    }
                }
                Open::Compound(entries) => {
                    if let Some((key, value)) = entries.next() {
                        encode_entry_header(buf, key, value, encoding)?;
                        break value;
                    }
                    buf.put_u8(tag_id::END);
                }
            }
            open.pop();
            depth.leave();
        };
    }
}

/// Writes the id and name of a compound entry.
fn encode_entry_header(
    buf: &mut BytesMut,
    key: &str,
    value: &Tag,
    encoding: StringEncoding,
) -> Result<()> {
    if value.is_end() {
        return Err(NbtError::malformed(format!(
            "compound entry {key:?} holds TAG_End"
        )));
    }
    buf.put_u8(value.tag_type().id());
    encode_string(buf, key, encoding)
}

/// Encodes a string with its u16 byte-length prefix.
pub fn encode_string(buf: &mut BytesMut, value: &str, encoding: StringEncoding) -> Result<()> {
    let len = match encoding {
        StringEncoding::ModifiedUtf8 => mutf8::encoded_len(value),
        StringEncoding::Utf8 => value.len(),
    };
    if len > tag_id::MAX_STRING_LEN {
        return Err(NbtError::ValueTooLarge(format!(
            "string of {len} encoded bytes exceeds {}",
            tag_id::MAX_STRING_LEN
        )));
    }
    buf.put_u16(len as u16);
    match encoding {
        StringEncoding::ModifiedUtf8 => buf.put_slice(&mutf8::encode(value)),
        StringEncoding::Utf8 => buf.put_slice(value.as_bytes()),
    }
    Ok(())
}

fn encode_len(buf: &mut BytesMut, len: usize, what: &str) -> Result<()> {
    if len > tag_id::MAX_SEQUENCE_LEN {
        return Err(NbtError::ValueTooLarge(format!(
            "{what} of {len} elements exceeds {}",
            tag_id::MAX_SEQUENCE_LEN
        )));
    }
    buf.put_i32(len as i32);
    Ok(())
}
