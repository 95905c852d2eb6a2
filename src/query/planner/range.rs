// Key Range Implementation
//
// Ranges over raw row keys as handed out by the key-range splitter. An
// empty bound is unbounded on that side.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::executor::result::{QueryError, QueryResult};
use crate::storage::row::{compare_bytes, KeyRegion, RowBuffer};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    lower: Vec<u8>,
    lower_inclusive: bool,
    upper: Vec<u8>,
    upper_inclusive: bool,
}

impl KeyRange {
    /// The range containing every key
    pub const EVERYTHING: KeyRange = KeyRange {
        lower: Vec::new(),
        lower_inclusive: true,
        upper: Vec::new(),
        upper_inclusive: true,
    };

    pub fn new(lower: impl Into<Vec<u8>>, lower_inclusive: bool, upper: impl Into<Vec<u8>>, upper_inclusive: bool) -> Self {
        KeyRange {
            lower: lower.into(),
            lower_inclusive,
            upper: upper.into(),
            upper_inclusive,
        }
    }

    /// `[key, key]`. The empty key is rejected since an empty bound means
    /// unbounded.
    pub fn point(key: impl Into<Vec<u8>>) -> QueryResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(QueryError::PlanningError("point range needs a non-empty key".to_string()));
        }
        Ok(KeyRange::new(key.clone(), true, key, true))
    }

    /// `[lower, upper)`, the shape scan segments are split into
    pub fn half_open(lower: impl Into<Vec<u8>>, upper: impl Into<Vec<u8>>) -> Self {
        KeyRange::new(lower, true, upper, false)
    }

    pub fn lower(&self) -> &[u8] {
        &self.lower
    }

    pub fn upper(&self) -> &[u8] {
        &self.upper
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }

    pub fn is_lower_unbound(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn is_upper_unbound(&self) -> bool {
        self.upper.is_empty()
    }

    pub fn is_everything(&self) -> bool {
        self.is_lower_unbound() && self.is_upper_unbound()
    }

    /// Whether `buffer[offset..offset + length]` falls inside the range
    pub fn contains_bytes(&self, buffer: &[u8], offset: usize, length: usize) -> bool {
        if !self.is_lower_unbound() {
            match compare_bytes(buffer, offset, length, &self.lower, 0, self.lower.len()) {
                Ordering::Less => return false,
                Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if !self.is_upper_unbound() {
            match compare_bytes(buffer, offset, length, &self.upper, 0, self.upper.len()) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.contains_bytes(key, 0, key.len())
    }

    pub fn contains_region(&self, key: &KeyRegion<'_>) -> bool {
        self.contains_bytes(key.buffer(), key.offset(), key.length())
    }

    pub fn contains_row(&self, row: &RowBuffer<'_>) -> bool {
        self.contains_region(&row.key_region())
    }

    pub fn to_bytes(&self) -> QueryResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> QueryResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_inclusive { '[' } else { '(' };
        let close = if self.upper_inclusive { ']' } else { ')' };
        let bound = |b: &[u8]| if b.is_empty() { "*".to_string() } else { hex::encode(b) };
        write!(f, "{}{} - {}{}", open, bound(self.lower.as_slice()), bound(self.upper.as_slice()), close)
    }
}
