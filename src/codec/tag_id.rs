//! NBT tag id byte constants.

pub const END: u8 = 0;
pub const BYTE: u8 = 1;
pub const SHORT: u8 = 2;
pub const INT: u8 = 3;
pub const LONG: u8 = 4;
pub const FLOAT: u8 = 5;
pub const DOUBLE: u8 = 6;
pub const BYTE_ARRAY: u8 = 7;
pub const STRING: u8 = 8;
pub const LIST: u8 = 9;
pub const COMPOUND: u8 = 10;
pub const INT_ARRAY: u8 = 11;

// Names and strings carry a u16 byte-length prefix.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

// Arrays and lists carry an i32 element-count prefix.
pub const MAX_SEQUENCE_LEN: usize = i32::MAX as usize;
