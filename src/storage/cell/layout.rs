use crate::common::types::{SIZEOF_BYTE, SIZEOF_INT, SIZEOF_LONG, SIZEOF_SHORT};

// Cell layout (all integers big-endian):
// - key_length: u32
// - value_length: u32
// - key:
//   - row_length: i16
//   - row
//   - family_length: u8
//   - family
//   - qualifier (length implied by key_length)
//   - timestamp: i64
//   - type: u8
// - value

/// Offset of the key inside a cell
pub const ROW_OFFSET: usize = SIZEOF_INT * 2;

/// Bytes of a key that are not row, family or qualifier
pub const KEY_INFRASTRUCTURE_SIZE: usize = SIZEOF_SHORT + SIZEOF_BYTE + SIZEOF_LONG + SIZEOF_BYTE;

/// Bytes between the end of the qualifier and the end of the key
pub const TIMESTAMP_TYPE_SIZE: usize = SIZEOF_LONG + SIZEOF_BYTE;

/// Kind of mutation a cell records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellType {
    Minimum = 0,
    Put = 4,
    Delete = 8,
    DeleteColumn = 12,
    DeleteFamily = 14,
    Maximum = 255,
}

impl CellType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellType::Minimum),
            4 => Some(CellType::Put),
            8 => Some(CellType::Delete),
            12 => Some(CellType::DeleteColumn),
            14 => Some(CellType::DeleteFamily),
            255 => Some(CellType::Maximum),
            _ => None,
        }
    }
}
