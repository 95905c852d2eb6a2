// Row and Cell Comparators
//
// Keys order by unsigned byte-lexicographic comparison, the same order the
// store keeps rows in. Comparators carry no state, so they are zero-sized
// values rather than shared instances.

use std::cmp::Ordering;

use crate::common::types::LATEST_TIMESTAMP;
use crate::storage::cell::layout::CellType;
use crate::storage::cell::Cell;
use crate::storage::row::buffer::RowBuffer;
use crate::storage::row::decoder::SearchTerm;

/// Compare `left[loff..loff + llen]` with `right[roff..roff + rlen]` as
/// unsigned bytes.
///
/// # Panics
///
/// Panics if either span is out of bounds of its buffer.
pub fn compare_bytes(left: &[u8], loff: usize, llen: usize, right: &[u8], roff: usize, rlen: usize) -> Ordering {
    left[loff..loff + llen].cmp(&right[roff..roff + rlen])
}

/// Compare the keys of two rows in place, whatever their shapes
pub fn compare_keys(a: &RowBuffer<'_>, b: &RowBuffer<'_>) -> Ordering {
    let (ka, kb) = (a.key_region(), b.key_region());
    compare_bytes(ka.buffer(), ka.offset(), ka.length(), kb.buffer(), kb.offset(), kb.length())
}

/// Orders rows by key
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyComparator;

impl KeyComparator {
    pub fn compare(&self, a: &RowBuffer<'_>, b: &RowBuffer<'_>) -> Ordering {
        compare_keys(a, b)
    }
}

/// Orders cells by row, family and qualifier ascending, then timestamp and
/// type descending, so the newest version of a column comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellComparator;

impl CellComparator {
    pub fn compare(&self, a: &Cell<'_>, b: &Cell<'_>) -> Ordering {
        a.row()
            .cmp(b.row())
            .then_with(|| a.family().cmp(b.family()))
            .then_with(|| a.qualifier().cmp(b.qualifier()))
            .then_with(|| b.timestamp().cmp(&a.timestamp()))
            .then_with(|| b.type_code().cmp(&a.type_code()))
    }

    /// Compare a cell with a search term as if the term were a cell with the
    /// latest timestamp and the maximum type
    pub fn compare_to_term(&self, cell: &Cell<'_>, term: &SearchTerm<'_>) -> Ordering {
        cell.row()
            .cmp(term.row)
            .then_with(|| cell.family().cmp(term.family))
            .then_with(|| cell.qualifier().cmp(term.qualifier))
            .then_with(|| LATEST_TIMESTAMP.cmp(&cell.timestamp()))
            .then_with(|| CellType::Maximum.code().cmp(&cell.type_code()))
    }
}
