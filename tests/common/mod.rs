#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use cellscan::query::executor::operators::ScanSource;
use cellscan::query::expression::codec;
use cellscan::query::parser::ast::DataType;
use cellscan::query::planner::{ColumnFilter, KeyRange, ScanSourceFactory, TableRef};
use cellscan::storage::cell::{encode_cell, encode_scan_record, NewCell};
use cellscan::storage::Cell;
use cellscan::{DataValue, RowBuffer};

/// Column value for a test row: (family, qualifier, value bytes)
pub type Column = (&'static str, &'static str, Vec<u8>);

// Encode an INTEGER column value
pub fn int_value(i: i64) -> Vec<u8> {
    codec::encode(&DataValue::Integer(i), &DataType::Integer).unwrap()
}

// Encode a DOUBLE column value
pub fn double_value(f: f64) -> Vec<u8> {
    codec::encode(&DataValue::Float(f), &DataType::Double).unwrap()
}

// Encode a DECIMAL column value at the given declared width
pub fn decimal_value(value: i128, scale: u32, precision: u32) -> Vec<u8> {
    codec::encode(&DataValue::decimal(value, scale), &DataType::decimal(precision, scale)).unwrap()
}

// Build a scan-shaped record for one row
pub fn scan_record(key: &[u8], columns: &[Column]) -> Vec<u8> {
    let cells: Vec<NewCell> = columns
        .iter()
        .map(|(family, qualifier, value)| NewCell::put(key, family.as_bytes(), qualifier.as_bytes(), 1, value))
        .collect();
    encode_scan_record(&cells).unwrap()
}

// Encode each column as a standalone cell buffer, in the order given
pub fn cell_buffers(key: &[u8], columns: &[Column]) -> Vec<Vec<u8>> {
    columns
        .iter()
        .map(|(family, qualifier, value)| {
            encode_cell(&NewCell::put(key, family.as_bytes(), qualifier.as_bytes(), 1, value)).unwrap()
        })
        .collect()
}

// Assemble a cell-array row over separately owned cell buffers
pub fn cell_array_row(buffers: &[Vec<u8>]) -> RowBuffer<'_> {
    let cells = buffers.iter().map(|b| Cell::parse(b, 0, b.len()).unwrap()).collect();
    RowBuffer::from_cells(cells).unwrap()
}

/// In-memory table that serves scans like the store would
#[derive(Default)]
pub struct MemoryStore {
    rows: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Fail the Nth fetch of every scan (1-based)
    pub fail_on_fetch: Option<usize>,
    /// Refuse to open scans
    pub fail_open: bool,
    pub opened: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &[u8], columns: &[Column]) {
        self.rows.insert(key.to_vec(), scan_record(key, columns));
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

pub struct MemorySource {
    records: Vec<Vec<u8>>,
    fail_on_fetch: Option<usize>,
    fetches: usize,
}

impl ScanSource for MemorySource {
    fn fetch(&mut self, max_records: usize) -> Result<Vec<Vec<u8>>> {
        self.fetches += 1;
        if self.fail_on_fetch == Some(self.fetches) {
            return Err(anyhow!("lease expired on fetch {}", self.fetches));
        }
        let n = max_records.min(self.records.len());
        Ok(self.records.drain(..n).collect())
    }
}

impl ScanSourceFactory for MemoryStore {
    fn open(&self, _table: &TableRef, ranges: &[KeyRange], filters: &[ColumnFilter]) -> Result<Box<dyn ScanSource>> {
        if self.fail_open {
            return Err(anyhow!("table is offline"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);

        let mut records = Vec::new();
        for (key, record) in &self.rows {
            if !ranges.iter().any(|r| r.contains(key)) {
                continue;
            }
            let row = RowBuffer::from_scan(record)?;
            let mut keep = true;
            for filter in filters {
                keep &= filter.accepts(&row)?;
            }
            if keep {
                records.push(record.clone());
            }
        }
        Ok(Box::new(MemorySource {
            records,
            fail_on_fetch: self.fail_on_fetch,
            fetches: 0,
        }))
    }
}

pub fn shared(store: MemoryStore) -> Arc<MemoryStore> {
    Arc::new(store)
}
