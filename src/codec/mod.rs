//! NBT binary encoding format.
//!
//! Every node is a tag id byte, a length-prefixed name (absent for `End`) and
//! a payload. All multi-byte numbers are big-endian.

pub mod decode;
pub mod depth;
pub mod encode;
pub(crate) mod frame;
pub mod mutf8;
pub mod options;
pub mod tag_id;

pub use decode::{decode_named, decode_value};
pub use depth::Depth;
pub use encode::{encode_named, encode_value};
pub use options::{CodecOptions, StringEncoding, DEFAULT_MAX_DEPTH};
