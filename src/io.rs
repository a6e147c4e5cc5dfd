//! Reading and writing whole NBT documents over byte streams.
//!
//! A document is one named tag, usually a compound. Streams are raw: callers
//! that store NBT compressed wrap the reader or writer in a decompressor or
//! compressor themselves.
//!
//! Reads consume exactly one document, so several documents written back to
//! back can be read one after another. The reader is asked for one field at a
//! time; wrap unbuffered sources in a `BufReader`.

use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;

use crate::codec::frame::Framer;
use crate::codec::{decode, encode, CodecOptions};
use crate::error::{NbtError, Result};
use crate::serialize::NbtSerializable;
use crate::types::{NamedTag, Tag};

/// Largest single read issued while collecting a document.
const CHUNK_SIZE: usize = 8 * 1024;

/// Reads one named tag, leaving the rest of the stream unread.
pub fn read(reader: impl Read) -> Result<NamedTag> {
    read_with(reader, &CodecOptions::default())
}

pub fn read_with(mut reader: impl Read, options: &CodecOptions) -> Result<NamedTag> {
    let mut framer = Framer::new(options);
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let wanted = framer.wanted().min(CHUNK_SIZE);
        if wanted == 0 {
            break;
        }
        reader.read_exact(&mut chunk[..wanted]).map_err(stream_error)?;
        framer.feed(&chunk[..wanted])?;
    }
    decode_document(&framer.into_bytes(), options)
}

/// Reads a named compound and converts it into `T`.
pub fn read_as<T: NbtSerializable>(reader: impl Read) -> Result<NamedTag<T>> {
    read(reader)?.deserialize()
}

/// Reads a named compound and converts it with the serializer registered for
/// `T`.
pub fn read_registered<T: 'static>(reader: impl Read) -> Result<NamedTag<T>> {
    read(reader)?.deserialize_registered()
}

/// Encodes `tag` and writes it in one piece.
///
/// Nothing is written if encoding fails. On an I/O error the writer may hold
/// a partial document and should be discarded.
pub fn write(writer: impl Write, tag: &NamedTag) -> Result<()> {
    write_with(writer, tag, &CodecOptions::default())
}

pub fn write_with(mut writer: impl Write, tag: &NamedTag, options: &CodecOptions) -> Result<()> {
    let buf = encode_document(tag, options)?;
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Converts the value into a compound and writes it.
pub fn write_as<T: NbtSerializable>(writer: impl Write, tag: &NamedTag<T>) -> Result<()> {
    write(writer, &tag.serialize()?)
}

pub fn write_registered<T: 'static>(writer: impl Write, tag: &NamedTag<T>) -> Result<()> {
    write(writer, &tag.serialize_registered()?)
}

fn decode_document(data: &[u8], options: &CodecOptions) -> Result<NamedTag> {
    let mut buf = data;
    let tag = decode::decode_named(&mut buf, options)?;
    tracing::trace!(bytes = data.len(), "read NBT document");
    Ok(tag)
}

/// A stream that ends inside a document is malformed input, not an I/O
/// failure.
fn stream_error(err: std::io::Error) -> NbtError {
    if err.kind() == ErrorKind::UnexpectedEof {
        NbtError::malformed("stream ended inside an NBT document")
    } else {
        NbtError::Io(err)
    }
}

fn encode_document(tag: &NamedTag<Tag>, options: &CodecOptions) -> Result<BytesMut> {
    let mut buf = BytesMut::new();
    encode::encode_named(&mut buf, &tag.name, &tag.value, options)?;
    Ok(buf)
}

#[cfg(feature = "tokio")]
mod nonblocking {
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    use super::{decode_document, encode_document, stream_error, CHUNK_SIZE};
    use crate::codec::frame::Framer;
    use crate::codec::CodecOptions;
    use crate::error::Result;
    use crate::types::NamedTag;

    /// Reads one named tag from an async stream, leaving the rest unread.
    pub async fn read_async<R: AsyncRead + Unpin>(
        reader: &mut R,
        options: &CodecOptions,
    ) -> Result<NamedTag> {
        let mut framer = Framer::new(options);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let wanted = framer.wanted().min(CHUNK_SIZE);
            if wanted == 0 {
                break;
            }
            reader
                .read_exact(&mut chunk[..wanted])
                .await
                .map_err(stream_error)?;
            framer.feed(&chunk[..wanted])?;
        }
        decode_document(&framer.into_bytes(), options)
    }

    /// Encodes `tag` and writes it to an async stream in one piece.
    pub async fn write_async<W: AsyncWrite + Unpin>(
        writer: &mut W,
        tag: &NamedTag,
        options: &CodecOptions,
    ) -> Result<()> {
        let buf = encode_document(tag, options)?;
        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::types::{Compound, Tag};

        #[tokio::test]
        async fn async_round_trip() {
            let mut c = Compound::new();
            c.insert("hello", "world");
            let tag = NamedTag::new("root", Tag::Compound(c));

            let mut output = Vec::new();
            write_async(&mut output, &tag, &CodecOptions::default())
                .await
                .unwrap();

            let mut input = std::io::Cursor::new(output);
            let back = read_async(&mut input, &CodecOptions::default())
                .await
                .unwrap();
            assert_eq!(back, tag);
        }

        #[tokio::test]
        async fn async_reads_back_to_back_documents() {
            let first = NamedTag::new("a", Tag::Int(1));
            let second = NamedTag::new("b", Tag::from("two"));
            let options = CodecOptions::default();

            let (mut client, mut server) = tokio::io::duplex(64);
            write_async(&mut client, &first, &options).await.unwrap();
            write_async(&mut client, &second, &options).await.unwrap();

            // The stream stays open; each read returns once its document is in.
            assert_eq!(read_async(&mut server, &options).await.unwrap(), first);
            assert_eq!(read_async(&mut server, &options).await.unwrap(), second);
        }
    }
}

#[cfg(feature = "tokio")]
pub use nonblocking::{read_async, write_async};

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::types::{Compound, TagType, TypedList};

    /// A writer that fails every call.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("broken pipe"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn level() -> NamedTag {
        let mut data = Compound::new();
        data.insert("LevelName", "world");
        data.insert("SpawnX", 0i32);
        data.insert("RandomSeed", -4_166_342_018_532_891_127i64);
        data.insert("raining", true);
        data.insert(
            "Pos",
            TypedList::from_values([0.5f64, 64.0, -12.5]).unwrap(),
        );
        let mut root = Compound::new();
        root.insert("Data", data);
        NamedTag::new("", Tag::Compound(root))
    }

    #[test]
    fn stream_round_trip() {
        let mut out = Vec::new();
        write(&mut out, &level()).unwrap();
        let back = read(&out[..]).unwrap();
        assert_eq!(back, level());
    }

    #[test]
    fn read_leaves_following_bytes_in_the_stream() {
        let mut out = Vec::new();
        write(&mut out, &level()).unwrap();
        let doc_len = out.len() as u64;
        out.extend_from_slice(&[0xDE, 0xAD]);

        let mut cursor = Cursor::new(out);
        assert_eq!(read(&mut cursor).unwrap(), level());
        assert_eq!(cursor.position(), doc_len);
    }

    #[test]
    fn back_to_back_documents() {
        let mut out = Vec::new();
        write(&mut out, &NamedTag::new("a", Tag::Int(1))).unwrap();
        write(&mut out, &level()).unwrap();
        write(&mut out, &NamedTag::end()).unwrap();

        let mut cursor = Cursor::new(out);
        assert_eq!(read(&mut cursor).unwrap(), NamedTag::new("a", Tag::Int(1)));
        assert_eq!(read(&mut cursor).unwrap(), level());
        assert!(read(&mut cursor).unwrap().is_end());
        assert!(matches!(
            read(&mut cursor),
            Err(NbtError::MalformedStream(_))
        ));
    }

    #[test]
    fn truncated_stream_is_malformed() {
        let mut out = Vec::new();
        write(&mut out, &level()).unwrap();
        out.truncate(out.len() - 3);
        assert!(matches!(
            read(&out[..]),
            Err(NbtError::MalformedStream(_))
        ));
    }

    #[test]
    fn deep_stream_on_default_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let mut bytes = vec![0x0A, 0x00, 0x00];
                for _ in 1..512 {
                    bytes.extend_from_slice(&[0x0A, 0x00, 0x01, b'c']);
                }
                bytes.extend(std::iter::repeat_n(0x00, 512));
                read(&bytes[..]).map(|tag| tag.value.tag_type())
            })
            .unwrap();
        assert_eq!(handle.join().unwrap().unwrap(), TagType::Compound);
    }

    #[test]
    fn empty_stream_is_malformed() {
        assert!(matches!(
            read(std::io::empty()),
            Err(NbtError::MalformedStream(_))
        ));
    }

    #[test]
    fn io_errors_propagate() {
        let err = write(Broken, &level()).unwrap_err();
        assert!(matches!(err, NbtError::Io(_)));
    }

    #[test]
    fn encode_failure_writes_nothing() {
        let mut root = Compound::new();
        root.insert("name", "x".repeat(70_000));
        let mut out = Vec::new();
        let err = write(&mut out, &NamedTag::new("", Tag::Compound(root))).unwrap_err();
        assert!(matches!(err, NbtError::ValueTooLarge(_)));
        assert!(out.is_empty());
    }

    #[derive(Debug, PartialEq)]
    struct Level {
        name: String,
        spawn: (i32, i32, i32),
        items: Vec<Item>,
    }

    #[derive(Debug, PartialEq)]
    struct Item {
        id: String,
        count: i8,
    }

    impl NbtSerializable for Item {
        fn to_compound(&self) -> Result<Compound> {
            let mut c = Compound::new();
            c.insert("id", self.id.as_str());
            c.insert("Count", self.count);
            Ok(c)
        }

        fn from_compound(c: &Compound) -> Result<Self> {
            Ok(Item {
                id: c.require_str("id")?.to_owned(),
                count: c.require_byte("Count")?,
            })
        }
    }

    impl NbtSerializable for Level {
        fn to_compound(&self) -> Result<Compound> {
            let mut c = Compound::new();
            c.insert("LevelName", self.name.as_str());
            c.insert("SpawnX", self.spawn.0);
            c.insert("SpawnY", self.spawn.1);
            c.insert("SpawnZ", self.spawn.2);
            c.insert("Inventory", TypedList::from_objects(&self.items)?);
            Ok(c)
        }

        fn from_compound(c: &Compound) -> Result<Self> {
            Ok(Level {
                name: c.require_str("LevelName")?.to_owned(),
                spawn: (
                    c.require_int("SpawnX")?,
                    c.require_int("SpawnY")?,
                    c.require_int("SpawnZ")?,
                ),
                items: c.require_list("Inventory")?.deserialize_all()?,
            })
        }
    }

    #[test]
    fn typed_stream_round_trip() {
        let level = NamedTag::new(
            "Data",
            Level {
                name: "test".into(),
                spawn: (10, 64, -3),
                items: vec![
                    Item {
                        id: "minecraft:stone".into(),
                        count: 64,
                    },
                    Item {
                        id: "minecraft:torch".into(),
                        count: 3,
                    },
                ],
            },
        );

        let mut out = Vec::new();
        write_as(&mut out, &level).unwrap();

        let raw = read(&out[..]).unwrap();
        let inventory = raw
            .value
            .as_compound()
            .and_then(|c| c.get("Inventory"))
            .and_then(Tag::as_list)
            .unwrap();
        assert_eq!(inventory.element_type(), TagType::Compound);

        let back = read_as::<Level>(&out[..]).unwrap();
        assert_eq!(back, level);
    }

    #[test]
    fn registered_stream_round_trip() {
        #[derive(Debug, PartialEq)]
        struct Color(u8, u8, u8);

        crate::serialize::register_fn::<Color, _, _>(
            |c: &Color| {
                let rgb = i32::from(c.0) << 16 | i32::from(c.1) << 8 | i32::from(c.2);
                Ok([("rgb", rgb)].into_iter().collect())
            },
            |c: &Compound| {
                let rgb = c.require_int("rgb")?;
                Ok(Color((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
            },
        );

        let tag = NamedTag::new("color", Color(0x12, 0x34, 0x56));
        let mut out = Vec::new();
        write_registered(&mut out, &tag).unwrap();
        assert_eq!(read_registered::<Color>(&out[..]).unwrap(), tag);
    }
}
