/// Size of an encoded `i32` in bytes
pub const SIZEOF_INT: usize = 4;

/// Size of an encoded `i16` in bytes
pub const SIZEOF_SHORT: usize = 2;

/// Size of an encoded `i64` in bytes
pub const SIZEOF_LONG: usize = 8;

/// Size of a single byte field
pub const SIZEOF_BYTE: usize = 1;

/// Largest number of decimal digits a fixed-point value may carry
pub const MAX_PRECISION: u32 = 38;

/// Timestamp that sorts before every real cell timestamp
pub const LATEST_TIMESTAMP: i64 = i64::MAX;

/// Cell timestamp type
pub type Timestamp = i64;
