//! Locating one document in a byte stream.
//!
//! A stream reader cannot know how long a document is without parsing it.
//! [`Framer`] follows the document's structure and reports how many bytes it
//! needs next, so a reader can pull exactly one document and leave whatever
//! follows untouched. The collected bytes are then decoded as usual.

use bytes::{Buf, BytesMut};

use super::decode::{decode_len, decode_list_header};
use super::depth::Depth;
use super::options::CodecOptions;
use crate::error::{NbtError, Result};
use crate::types::TagType;

/// A container whose end has not been reached yet.
enum Open {
    Compound,
    List { element_type: TagType, remaining: usize },
}

/// The field the framer expects next.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Id byte of a named tag.
    Id,
    /// Name length, followed by a payload of the given type.
    NameLen(TagType),
    /// Name bytes still to come.
    Name(TagType, usize),
    /// Length of a string payload.
    StrLen,
    /// Element count of an array whose elements have the given size.
    ArrayLen(usize),
    /// Element type and count of a list.
    ListHeader,
    /// Payload bytes that need no inspection.
    Skip(usize),
    Done,
}

pub(crate) struct Framer {
    depth: Depth,
    open: Vec<Open>,
    step: Step,
    data: BytesMut,
}

impl Framer {
    pub(crate) fn new(options: &CodecOptions) -> Self {
        Self {
            depth: Depth::new(options.depth_limit()),
            open: Vec::new(),
            step: Step::Id,
            data: BytesMut::new(),
        }
    }

    /// How many bytes to feed next; zero once the document is complete.
    pub(crate) fn wanted(&self) -> usize {
        match self.step {
            Step::Id => 1,
            Step::NameLen(_) | Step::StrLen => 2,
            Step::ArrayLen(_) => 4,
            Step::ListHeader => 5,
            Step::Name(_, n) | Step::Skip(n) => n,
            Step::Done => 0,
        }
    }

    /// Accepts the next bytes, never more than [`wanted`](Self::wanted).
    ///
    /// Length and id fields must arrive whole; names and payload bodies may
    /// be split across calls.
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        let wanted = self.wanted();
        let partial = match self.step {
            Step::Name(tag_type, n) if bytes.len() < n => {
                Some(Step::Name(tag_type, n - bytes.len()))
            }
            Step::Skip(n) if bytes.len() < n => Some(Step::Skip(n - bytes.len())),
            _ if bytes.len() != wanted => {
                return Err(NbtError::malformed(format!(
                    "framer expected {wanted} bytes, got {}",
                    bytes.len()
                )));
            }
            _ => None,
        };
        self.data.extend_from_slice(bytes);
        if let Some(step) = partial {
            self.step = step;
            return Ok(());
        }

        let mut field = bytes;
        match self.step {
            Step::Id => match TagType::from_id(field.get_u8())? {
                TagType::End => self.end_tag(),
                tag_type => {
                    self.step = Step::NameLen(tag_type);
                    Ok(())
                }
            },
            Step::NameLen(tag_type) => match usize::from(field.get_u16()) {
                0 => self.payload(tag_type),
                n => {
                    self.step = Step::Name(tag_type, n);
                    Ok(())
                }
            },
            Step::Name(tag_type, _) => self.payload(tag_type),
            Step::StrLen => self.skip(usize::from(field.get_u16())),
            Step::ArrayLen(size) => {
                let len = decode_len(&mut field, "array")?;
                let bytes = len
                    .checked_mul(size)
                    .ok_or_else(|| NbtError::malformed(format!("array length {len} overflows")))?;
                self.skip(bytes)
            }
            Step::ListHeader => {
                let (element_type, len) = decode_list_header(&mut field)?;
                self.depth.enter()?;
                if len == 0 {
                    self.depth.leave();
                    self.value_done()
                } else {
                    self.open.push(Open::List {
                        element_type,
                        remaining: len,
                    });
                    self.payload(element_type)
                }
            }
            Step::Skip(_) => self.value_done(),
            Step::Done => Ok(()),
        }
    }

    /// The bytes of the complete document.
    pub(crate) fn into_bytes(self) -> BytesMut {
        self.data
    }

    /// An `End` id closes the current compound, or is the whole document at
    /// top level.
    fn end_tag(&mut self) -> Result<()> {
        if let Some(Open::Compound) = self.open.last() {
            self.open.pop();
            self.depth.leave();
            self.value_done()
        } else {
            self.step = Step::Done;
            Ok(())
        }
    }

    fn payload(&mut self, tag_type: TagType) -> Result<()> {
        self.step = match tag_type {
            TagType::End => return Err(NbtError::malformed("TAG_End has no payload")),
            TagType::Byte => Step::Skip(1),
            TagType::Short => Step::Skip(2),
            TagType::Int | TagType::Float => Step::Skip(4),
            TagType::Long | TagType::Double => Step::Skip(8),
            TagType::ByteArray => Step::ArrayLen(1),
            TagType::IntArray => Step::ArrayLen(4),
            TagType::String => Step::StrLen,
            TagType::List => Step::ListHeader,
            TagType::Compound => {
                self.depth.enter()?;
                self.open.push(Open::Compound);
                Step::Id
            }
        };
        Ok(())
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        if len == 0 {
            return self.value_done();
        }
        self.step = Step::Skip(len);
        Ok(())
    }

    /// A value just ended; work out what its parent needs next.
    fn value_done(&mut self) -> Result<()> {
        loop {
            match self.open.last_mut() {
                None => {
                    self.step = Step::Done;
                    return Ok(());
                }
                Some(Open::Compound) => {
                    self.step = Step::Id;
                    return Ok(());
                }
                Some(Open::List {
                    element_type,
                    remaining,
                }) => {
                    *remaining -= 1;
                    if *remaining > 0 {
                        let element_type = *element_type;
                        return self.payload(element_type);
                    }
                }
            }
            self.open.pop();
            self.depth.leave();
        }
    }
}
