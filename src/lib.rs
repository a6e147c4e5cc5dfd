//! nbtr — A pure-Rust Named Binary Tag (NBT) codec.
//!
//! NBT is a self-describing binary tree of named, typed values: 12 tag types,
//! big-endian numbers, length-prefixed strings and arrays, typed lists, and
//! compounds terminated by an end marker. This crate reads and writes that
//! format and converts compounds to and from application types.
//!
//! # Architecture
//!
//! - **`types`** — `Tag`, `TagType`, `Compound`, `TypedList`, `NamedTag`
//! - **`codec`** — Binary encoding/decoding with a per-call depth guard
//! - **`serialize`** — Registry and dispatch for application types
//! - **`io`** — Whole-document reads and writes over byte streams
//!
//! Compression is left to the caller: wrap the stream before handing it over.

pub mod codec;
pub mod error;
pub mod io;
pub mod serialize;
pub mod types;

pub use codec::{CodecOptions, StringEncoding};
pub use error::{NbtError, Result};
pub use serialize::{NbtSerializable, Registry, Serializer, ToTag};
pub use types::{Compound, NamedTag, Tag, TagType, TypedList};
