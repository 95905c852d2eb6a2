use byteorder::{BigEndian, ByteOrder};

use crate::common::types::{SIZEOF_INT, SIZEOF_LONG, SIZEOF_SHORT, Timestamp};
use crate::storage::cell::view::Cell;
use crate::storage::cell::layout::{CellType, KEY_INFRASTRUCTURE_SIZE, ROW_OFFSET};
use crate::storage::row::comparator::CellComparator;
use crate::storage::row::error::RecordError;

/// The fields of a cell that has not been serialized yet
#[derive(Debug, Clone, Copy)]
pub struct NewCell<'a> {
    pub row: &'a [u8],
    pub family: &'a [u8],
    pub qualifier: &'a [u8],
    pub timestamp: Timestamp,
    pub cell_type: CellType,
    pub value: &'a [u8],
}

impl<'a> NewCell<'a> {
    pub fn put(row: &'a [u8], family: &'a [u8], qualifier: &'a [u8], timestamp: Timestamp, value: &'a [u8]) -> Self {
        NewCell {
            row,
            family,
            qualifier,
            timestamp,
            cell_type: CellType::Put,
            value,
        }
    }

    fn key_length(&self) -> usize {
        KEY_INFRASTRUCTURE_SIZE + self.row.len() + self.family.len() + self.qualifier.len()
    }

    /// Total serialized size, header included
    pub fn encoded_len(&self) -> usize {
        ROW_OFFSET + self.key_length() + self.value.len()
    }
}

/// Append one serialized cell to `out`, returning the number of bytes written
pub fn write_cell(out: &mut Vec<u8>, cell: &NewCell<'_>) -> Result<usize, RecordError> {
    if cell.row.len() > i16::MAX as usize {
        return Err(RecordError::malformed(format!("row of {} bytes exceeds the row length prefix", cell.row.len())));
    }
    if cell.family.len() > u8::MAX as usize {
        return Err(RecordError::malformed(format!("family of {} bytes exceeds the family length prefix", cell.family.len())));
    }
    let key_length = cell.key_length();
    if key_length > u32::MAX as usize || cell.value.len() > u32::MAX as usize {
        return Err(RecordError::malformed("cell exceeds the 4-byte length prefix"));
    }

    let start = out.len();
    out.reserve(cell.encoded_len());
    let mut lengths = [0u8; SIZEOF_INT * 2 + SIZEOF_SHORT];
    BigEndian::write_u32(&mut lengths[..SIZEOF_INT], key_length as u32);
    BigEndian::write_u32(&mut lengths[SIZEOF_INT..SIZEOF_INT * 2], cell.value.len() as u32);
    BigEndian::write_i16(&mut lengths[SIZEOF_INT * 2..], cell.row.len() as i16);
    out.extend_from_slice(&lengths);
    out.extend_from_slice(cell.row);
    out.push(cell.family.len() as u8);
    out.extend_from_slice(cell.family);
    out.extend_from_slice(cell.qualifier);
    let mut timestamp = [0u8; SIZEOF_LONG];
    BigEndian::write_i64(&mut timestamp, cell.timestamp);
    out.extend_from_slice(&timestamp);
    out.push(cell.cell_type.code());
    out.extend_from_slice(cell.value);

    Ok(out.len() - start)
}

/// Serialize a single cell into its own buffer
pub fn encode_cell(cell: &NewCell<'_>) -> Result<Vec<u8>, RecordError> {
    let mut out = Vec::with_capacity(cell.encoded_len());
    write_cell(&mut out, cell)?;
    Ok(out)
}

/// Serialize cells into the buffer shape a live scan produces: each cell is
/// preceded by its 4-byte length. Cells are written in store order whatever
/// order they are given in.
pub fn encode_scan_record(cells: &[NewCell<'_>]) -> Result<Vec<u8>, RecordError> {
    let encoded = cells.iter().map(encode_cell).collect::<Result<Vec<_>, _>>()?;
    let mut views = encoded
        .iter()
        .map(|bytes| Cell::parse(bytes, 0, bytes.len()))
        .collect::<Result<Vec<_>, _>>()?;
    views.sort_by(|a, b| CellComparator.compare(a, b));

    let total: usize = encoded.iter().map(|bytes| SIZEOF_INT + bytes.len()).sum();
    let mut out = Vec::with_capacity(total);
    for view in views {
        let mut prefix = [0u8; SIZEOF_INT];
        BigEndian::write_u32(&mut prefix, view.length() as u32);
        out.extend_from_slice(&prefix);
        out.extend_from_slice(&view.buffer()[view.offset()..view.offset() + view.length()]);
    }
    Ok(out)
}
