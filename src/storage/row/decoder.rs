// Zero-Copy Row Decoder
//
// Locates the key of a record and finds the latest cell of a column by binary
// search over the record's cells. Nothing here copies record bytes.

use byteorder::{BigEndian, ByteOrder};
use log::trace;

use crate::common::types::{SIZEOF_INT, SIZEOF_SHORT};
use crate::storage::cell::layout::ROW_OFFSET;
use crate::storage::cell::Cell;
use crate::storage::row::buffer::{KeyRegion, RecordShape, RowBuffer};
use crate::storage::row::comparator::CellComparator;
use crate::storage::row::error::RecordError;

/// Synthetic key used only to drive the binary search for a column.
///
/// It has the row, family and qualifier of the wanted column and implicitly
/// the latest timestamp and the maximum type, so it sorts before every real
/// cell of that column.
#[derive(Debug, Clone, Copy)]
pub struct SearchTerm<'a> {
    pub row: &'a [u8],
    pub family: &'a [u8],
    pub qualifier: &'a [u8],
}

/// Compute the key span of a record.
///
/// A scan-backed record starts with the 4-byte length of its first cell; the
/// key then follows the cell header and its 2-byte length prefix. A cell-array
/// record takes the key from its first cell directly.
pub fn key_region<'a>(shape: &RecordShape<'a>) -> Result<KeyRegion<'a>, RecordError> {
    let (buffer, key_offset, limit) = match shape {
        RecordShape::ScanBacked { bytes, offset, length, .. } => {
            (*bytes, offset + SIZEOF_INT + ROW_OFFSET + SIZEOF_SHORT, offset + length)
        }
        RecordShape::CellArrayBacked { cells } => match cells.first() {
            Some(first) => (
                first.buffer(),
                first.offset() + ROW_OFFSET + SIZEOF_SHORT,
                first.offset() + first.length(),
            ),
            None => return Ok(KeyRegion::new(&[], 0, 0)),
        },
    };

    if key_offset > limit {
        return Err(RecordError::malformed(format!(
            "record ending at byte {} is too short to hold a key length prefix ending at {}",
            limit, key_offset
        )));
    }
    let key_length = BigEndian::read_i16(&buffer[key_offset - SIZEOF_SHORT..key_offset]);
    if key_length < 0 {
        return Err(RecordError::malformed(format!("negative key length {}", key_length)));
    }
    let key_length = key_length as usize;
    if key_offset + key_length > limit {
        return Err(RecordError::malformed(format!(
            "key of {} bytes at offset {} exceeds the record end at {}", key_length, key_offset, limit
        )));
    }

    Ok(KeyRegion::new(buffer, key_offset, key_length))
}

/// Build the search term for a column of `row`
pub fn search_term<'a>(row: &RowBuffer<'a>, family: &'a [u8], qualifier: &'a [u8]) -> SearchTerm<'a> {
    SearchTerm {
        row: row.key(),
        family,
        qualifier,
    }
}

/// Find the latest cell of the column `family:qualifier`.
///
/// `Ok(None)` means the column is absent from this row, which is not an error.
pub fn lookup_column<'a>(row: &RowBuffer<'a>, family: &[u8], qualifier: &[u8]) -> Result<Option<Cell<'a>>, RecordError> {
    let term = SearchTerm {
        row: row.key(),
        family,
        qualifier,
    };
    lookup_column_by_term(row, &term)
}

/// Binary search for the first cell at or after `term`
pub fn lookup_column_by_term<'a>(row: &RowBuffer<'a>, term: &SearchTerm<'_>) -> Result<Option<Cell<'a>>, RecordError> {
    let cells = row.cells()?;
    if cells.is_empty() {
        return Ok(None);
    }

    // The term carries no real timestamp, so this is almost always the
    // insertion point rather than a hit
    let pos = match cells.binary_search_by(|cell| CellComparator.compare_to_term(cell, term)) {
        Ok(pos) | Err(pos) => pos,
    };
    let Some(cell) = cells.get(pos) else {
        return Ok(None);
    };

    if !cell.matches_column(term.family, term.qualifier) {
        trace!(
            "column {}:{} absent from row {}",
            String::from_utf8_lossy(term.family),
            String::from_utf8_lossy(term.qualifier),
            hex::encode(term.row)
        );
        return Ok(None);
    }
    Ok(Some(*cell))
}
