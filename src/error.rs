//! Error types for NBT encoding, decoding and serialization dispatch.

use crate::types::TagType;

/// Convenience alias used throughout the crate.
pub type Result<T, E = NbtError> = std::result::Result<T, E>;

/// Errors that can occur while reading, writing or converting NBT data.
#[derive(Debug, thiserror::Error)]
pub enum NbtError {
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    #[error("unsupported tag id: {0}")]
    UnsupportedFormat(u8),

    #[error("nesting depth exceeds the limit of {max}")]
    DepthExceeded { max: usize },

    #[error("no serializer registered and no native conversion for type `{0}`")]
    UnsupportedType(&'static str),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TagType, found: TagType },

    #[error("value too large: {0}")]
    ValueTooLarge(String),

    #[error("missing key: {0:?}")]
    MissingKey(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NbtError {
    /// Wraps any displayable error raised by an application serializer.
    pub fn conversion(e: impl std::fmt::Display) -> Self {
        Self::Conversion(e.to_string())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedStream(msg.into())
    }

    pub(crate) fn mismatch(expected: TagType, found: TagType) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Returns `true` for errors caused by the input bytes themselves.
    ///
    /// A stream that produced one of these is left at an unspecified position
    /// and cannot be resumed.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedStream(_) | Self::UnsupportedFormat(_) | Self::DepthExceeded { .. }
        )
    }
}
