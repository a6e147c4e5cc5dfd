//! Java "modified UTF-8" string transcoding.
//!
//! Differs from standard UTF-8 in two ways: NUL is written as the two bytes
//! `C0 80`, and characters outside the BMP are written as two 3-byte encoded
//! UTF-16 surrogates instead of one 4-byte sequence. Strings without NUL or
//! supplementary characters are byte-identical in both encodings.

use std::borrow::Cow;

use crate::error::{NbtError, Result};

/// Encodes `s` as modified UTF-8.
pub fn encode(s: &str) -> Cow<'_, [u8]> {
    // NUL and 4-byte lead bytes are the only places the encodings diverge.
    if !s.bytes().any(|b| b == 0 || b >= 0xF0) {
        return Cow::Borrowed(s.as_bytes());
    }

    let mut out = Vec::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\0' => out.extend_from_slice(&[0xC0, 0x80]),
            c if u32::from(c) >= 0x1_0000 => {
                let mut units = [0u16; 2];
                for &unit in c.encode_utf16(&mut units).iter() {
                    push_three_byte(&mut out, unit);
                }
            }
            c => {
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    Cow::Owned(out)
}

/// Byte length of `s` once encoded as modified UTF-8.
pub fn encoded_len(s: &str) -> usize {
    s.chars()
        .map(|c| match u32::from(c) {
            0 => 2,
            cp if cp >= 0x1_0000 => 6,
            _ => c.len_utf8(),
        })
        .sum()
}

/// Decodes modified UTF-8.
///
/// Standard 4-byte UTF-8 sequences are accepted as well. Unpaired surrogates
/// cannot be represented in a Rust string and are rejected.
pub fn decode(bytes: &[u8]) -> Result<String> {
    // Valid UTF-8 never contains `C0 80` or encoded surrogates, so it decodes
    // to the same text under both encodings.
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_owned());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        match b0 {
            0x00..=0x7F => {
                units.push(u16::from(b0));
                i += 1;
            }
            0xC0..=0xDF => {
                let b1 = continuation(bytes, i + 1)?;
                units.push(u16::from(b0 & 0x1F) << 6 | u16::from(b1));
                i += 2;
            }
            0xE0..=0xEF => {
                let b1 = continuation(bytes, i + 1)?;
                let b2 = continuation(bytes, i + 2)?;
                units.push(u16::from(b0 & 0x0F) << 12 | u16::from(b1) << 6 | u16::from(b2));
                i += 3;
            }
            0xF0..=0xF7 => {
                let b1 = continuation(bytes, i + 1)?;
                let b2 = continuation(bytes, i + 2)?;
                let b3 = continuation(bytes, i + 3)?;
                let cp = u32::from(b0 & 0x07) << 18
                    | u32::from(b1) << 12
                    | u32::from(b2) << 6
                    | u32::from(b3);
                let c = char::from_u32(cp).ok_or_else(|| {
                    NbtError::malformed(format!("invalid code point U+{cp:X} in string"))
                })?;
                let mut pair = [0u16; 2];
                units.extend_from_slice(c.encode_utf16(&mut pair));
                i += 4;
            }
            _ => {
                return Err(NbtError::malformed(format!(
                    "invalid byte 0x{b0:02X} at offset {i} in string"
                )));
            }
        }
    }

    String::from_utf16(&units).map_err(|_| NbtError::malformed("unpaired surrogate in string"))
}

fn push_three_byte(out: &mut Vec<u8>, unit: u16) {
    out.push(0xE0 | (unit >> 12) as u8);
    out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
    out.push(0x80 | (unit & 0x3F) as u8);
}

/// Returns the low six bits of the continuation byte at `index`.
fn continuation(bytes: &[u8], index: usize) -> Result<u8> {
    match bytes.get(index) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(b & 0x3F),
        Some(&b) => Err(NbtError::malformed(format!(
            "expected continuation byte at offset {index}, got 0x{b:02X}"
        ))),
        None => Err(NbtError::malformed("truncated multi-byte sequence in string")),
    }
}
