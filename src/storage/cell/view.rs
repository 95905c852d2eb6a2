use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::common::types::{SIZEOF_BYTE, SIZEOF_INT, SIZEOF_SHORT, Timestamp};
use crate::storage::cell::layout::{CellType, KEY_INFRASTRUCTURE_SIZE, ROW_OFFSET, TIMESTAMP_TYPE_SIZE};
use crate::storage::row::error::RecordError;

/// A borrowed view of one serialized cell.
///
/// The view never copies: every accessor returns a sub-slice of the buffer the
/// cell was parsed from. Construction validates the layout once, so the
/// accessors themselves cannot go out of bounds.
#[derive(Clone, Copy)]
pub struct Cell<'a> {
    buffer: &'a [u8],
    offset: usize,
    length: usize,
    row_length: usize,
    family_length: usize,
}

impl<'a> Cell<'a> {
    /// Parse the cell occupying `buffer[offset..offset + length]`
    pub fn parse(buffer: &'a [u8], offset: usize, length: usize) -> Result<Self, RecordError> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= buffer.len())
            .ok_or_else(|| RecordError::malformed(format!(
                "cell span {}+{} exceeds buffer of {} bytes", offset, length, buffer.len()
            )))?;
        if length < ROW_OFFSET {
            return Err(RecordError::malformed(format!("cell of {} bytes has no room for its header", length)));
        }

        let key_length = BigEndian::read_u32(&buffer[offset..offset + SIZEOF_INT]) as usize;
        let value_length = BigEndian::read_u32(&buffer[offset + SIZEOF_INT..offset + ROW_OFFSET]) as usize;
        if ROW_OFFSET + key_length + value_length != length {
            return Err(RecordError::malformed(format!(
                "cell declares key {} and value {} bytes but spans {}", key_length, value_length, length
            )));
        }
        if key_length < KEY_INFRASTRUCTURE_SIZE {
            return Err(RecordError::malformed(format!("cell key of {} bytes is too short", key_length)));
        }

        let key_offset = offset + ROW_OFFSET;
        let row_length = BigEndian::read_i16(&buffer[key_offset..key_offset + SIZEOF_SHORT]);
        if row_length < 0 {
            return Err(RecordError::malformed(format!("negative row length {}", row_length)));
        }
        let row_length = row_length as usize;
        let family_length_offset = key_offset + SIZEOF_SHORT + row_length;
        if family_length_offset + SIZEOF_BYTE > key_offset + key_length - TIMESTAMP_TYPE_SIZE {
            return Err(RecordError::malformed(format!("row length {} overruns the cell key", row_length)));
        }
        let family_length = buffer[family_length_offset] as usize;
        if KEY_INFRASTRUCTURE_SIZE + row_length + family_length > key_length {
            return Err(RecordError::malformed(format!("family length {} overruns the cell key", family_length)));
        }
        debug_assert!(end == key_offset + key_length + value_length);

        Ok(Cell {
            buffer,
            offset,
            length,
            row_length,
            family_length,
        })
    }

    /// The buffer this cell is a view into
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn key_length(&self) -> usize {
        BigEndian::read_u32(&self.buffer[self.offset..self.offset + SIZEOF_INT]) as usize
    }

    pub fn value_length(&self) -> usize {
        self.length - ROW_OFFSET - self.key_length()
    }

    pub fn key_offset(&self) -> usize {
        self.offset + ROW_OFFSET
    }

    pub fn row_offset(&self) -> usize {
        self.key_offset() + SIZEOF_SHORT
    }

    pub fn row_length(&self) -> usize {
        self.row_length
    }

    pub fn family_offset(&self) -> usize {
        self.row_offset() + self.row_length + SIZEOF_BYTE
    }

    pub fn family_length(&self) -> usize {
        self.family_length
    }

    pub fn qualifier_offset(&self) -> usize {
        self.family_offset() + self.family_length
    }

    pub fn qualifier_length(&self) -> usize {
        self.key_length() - KEY_INFRASTRUCTURE_SIZE - self.row_length - self.family_length
    }

    fn timestamp_offset(&self) -> usize {
        self.key_offset() + self.key_length() - TIMESTAMP_TYPE_SIZE
    }

    pub fn value_offset(&self) -> usize {
        self.key_offset() + self.key_length()
    }

    pub fn row(&self) -> &'a [u8] {
        &self.buffer[self.row_offset()..self.row_offset() + self.row_length]
    }

    pub fn family(&self) -> &'a [u8] {
        &self.buffer[self.family_offset()..self.family_offset() + self.family_length]
    }

    pub fn qualifier(&self) -> &'a [u8] {
        let start = self.qualifier_offset();
        &self.buffer[start..start + self.qualifier_length()]
    }

    pub fn timestamp(&self) -> Timestamp {
        let start = self.timestamp_offset();
        BigEndian::read_i64(&self.buffer[start..start + 8])
    }

    /// Raw type byte, compared unsigned by the cell comparator
    pub fn type_code(&self) -> u8 {
        self.buffer[self.timestamp_offset() + 8]
    }

    pub fn cell_type(&self) -> Option<CellType> {
        CellType::from_code(self.type_code())
    }

    pub fn value(&self) -> &'a [u8] {
        &self.buffer[self.value_offset()..self.offset + self.length]
    }

    /// Whether this cell belongs to the given column
    pub fn matches_column(&self, family: &[u8], qualifier: &[u8]) -> bool {
        self.family() == family && self.qualifier() == qualifier
    }
}

impl fmt::Debug for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("row", &hex::encode(self.row()))
            .field("family", &String::from_utf8_lossy(self.family()))
            .field("qualifier", &String::from_utf8_lossy(self.qualifier()))
            .field("timestamp", &self.timestamp())
            .field("type", &self.type_code())
            .field("value_length", &self.value_length())
            .finish()
    }
}
