// Row Buffer
//
// A borrowed view over one serialized row record. Records reach the engine in
// two physical shapes which differ only in where the key lives, so the shape
// is an enum and the decoder resolves offsets per variant.

use byteorder::{BigEndian, ByteOrder};
use log::trace;
use once_cell::sync::OnceCell;

use crate::common::types::SIZEOF_INT;
use crate::storage::cell::Cell;
use crate::storage::row::comparator::CellComparator;
use crate::storage::row::decoder;
use crate::storage::row::error::RecordError;

/// Physical layout of a record
#[derive(Debug)]
pub enum RecordShape<'a> {
    /// Bytes produced by a live scan: `[cell_len: u32][cell]` repeated.
    /// The cell index is built on first use.
    ScanBacked {
        bytes: &'a [u8],
        offset: usize,
        length: usize,
        cells: OnceCell<Vec<Cell<'a>>>,
    },
    /// Cells assembled in memory, possibly over different buffers
    CellArrayBacked { cells: Vec<Cell<'a>> },
}

/// Location of a row key inside some buffer
#[derive(Debug, Clone, Copy)]
pub struct KeyRegion<'a> {
    buffer: &'a [u8],
    offset: usize,
    length: usize,
}

impl<'a> KeyRegion<'a> {
    pub(crate) fn new(buffer: &'a [u8], offset: usize, length: usize) -> Self {
        debug_assert!(offset + length <= buffer.len());
        KeyRegion { buffer, offset, length }
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn as_slice(&self) -> &'a [u8] {
        &self.buffer[self.offset..self.offset + self.length]
    }

    /// A sub-span of the key, e.g. to skip a leading tenant id.
    /// Returns `None` when the span does not fit inside the key.
    pub fn subregion(&self, offset: usize, length: usize) -> Option<KeyRegion<'a>> {
        let end = offset.checked_add(length)?;
        if end > self.length {
            return None;
        }
        Some(KeyRegion::new(self.buffer, self.offset + offset, length))
    }
}

/// One decoded row record. Immutable once constructed.
#[derive(Debug)]
pub struct RowBuffer<'a> {
    shape: RecordShape<'a>,
    key: KeyRegion<'a>,
}

impl<'a> RowBuffer<'a> {
    /// Wrap a whole scan-produced buffer
    pub fn from_scan(bytes: &'a [u8]) -> Result<Self, RecordError> {
        Self::from_scan_region(bytes, 0, bytes.len())
    }

    /// Wrap the scan-produced record at `bytes[offset..offset + length]`
    pub fn from_scan_region(bytes: &'a [u8], offset: usize, length: usize) -> Result<Self, RecordError> {
        if offset.checked_add(length).is_none_or(|end| end > bytes.len()) {
            return Err(RecordError::malformed(format!(
                "record span {}+{} exceeds buffer of {} bytes", offset, length, bytes.len()
            )));
        }
        let shape = RecordShape::ScanBacked {
            bytes,
            offset,
            length,
            cells: OnceCell::new(),
        };
        let key = decoder::key_region(&shape)?;
        Ok(RowBuffer { shape, key })
    }

    /// Assemble a row from cell views. The cells are put in store order and
    /// must all belong to the same row.
    pub fn from_cells(mut cells: Vec<Cell<'a>>) -> Result<Self, RecordError> {
        if let Some(first) = cells.first() {
            let row = first.row();
            if let Some(stray) = cells.iter().find(|cell| cell.row() != row) {
                return Err(RecordError::malformed(format!(
                    "cell for row {} mixed into row {}", hex::encode(stray.row()), hex::encode(row)
                )));
            }
        }
        cells.sort_by(|a, b| CellComparator.compare(a, b));
        let shape = RecordShape::CellArrayBacked { cells };
        let key = decoder::key_region(&shape)?;
        Ok(RowBuffer { shape, key })
    }

    /// Rebuild a scan-backed row whose key region was validated earlier
    pub(crate) fn from_validated_scan(bytes: &'a [u8], key_offset: usize, key_length: usize) -> Self {
        RowBuffer {
            shape: RecordShape::ScanBacked {
                bytes,
                offset: 0,
                length: bytes.len(),
                cells: OnceCell::new(),
            },
            key: KeyRegion::new(bytes, key_offset, key_length),
        }
    }

    pub fn shape(&self) -> &RecordShape<'a> {
        &self.shape
    }

    pub fn is_scan_backed(&self) -> bool {
        matches!(self.shape, RecordShape::ScanBacked { .. })
    }

    pub fn key_region(&self) -> KeyRegion<'a> {
        self.key
    }

    pub fn key(&self) -> &'a [u8] {
        self.key.as_slice()
    }

    /// The record's cells in store order. For scan-backed records the first
    /// call parses the cell index; later calls reuse it.
    pub fn cells(&self) -> Result<&[Cell<'a>], RecordError> {
        match &self.shape {
            RecordShape::ScanBacked { bytes, offset, length, cells } => cells
                .get_or_try_init(|| parse_scan_cells(bytes, *offset, *length))
                .map(Vec::as_slice),
            RecordShape::CellArrayBacked { cells } => Ok(cells.as_slice()),
        }
    }
}

fn parse_scan_cells<'a>(bytes: &'a [u8], offset: usize, length: usize) -> Result<Vec<Cell<'a>>, RecordError> {
    let end = offset + length;
    let mut cells = Vec::new();
    let mut pos = offset;

    while pos < end {
        if pos + SIZEOF_INT > end {
            return Err(RecordError::malformed(format!("truncated cell length prefix at byte {}", pos)));
        }
        let cell_length = BigEndian::read_u32(&bytes[pos..pos + SIZEOF_INT]) as usize;
        let cell_offset = pos + SIZEOF_INT;
        if cell_offset + cell_length > end {
            return Err(RecordError::malformed(format!(
                "cell at byte {} of {} bytes runs past the record end", cell_offset, cell_length
            )));
        }
        cells.push(Cell::parse(bytes, cell_offset, cell_length)?);
        pos = cell_offset + cell_length;
    }

    trace!("materialized {} cells from a {} byte scan record", cells.len(), length);
    Ok(cells)
}
