// Query Result Implementation
//
// This module defines the values expressions produce, the owned row tuples
// that flow through execution operators, and the query error type.

use std::cmp::Ordering;
use std::fmt;

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::executor::type_conversion::{decimal_to_f64, rescale_decimal};
use crate::query::parser::ast::DataType;
use crate::storage::row::decoder;
use crate::storage::row::{RecordError, RowBuffer};

/// Possible scalar values produced by expression evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Integer(i64),
    Float(f64),
    /// Fixed-point number `value * 10^-scale`
    Decimal { value: i128, scale: u32 },
    Text(String),
    Boolean(bool),
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Decimal { value, scale } => {
                if *scale == 0 {
                    return write!(f, "{}", value);
                }
                let Some(divisor) = 10i128.checked_pow(*scale) else {
                    return write!(f, "{}E-{}", value, scale);
                };
                let sign = if *value < 0 { "-" } else { "" };
                let int_part = (value / divisor).abs();
                let frac_part = (value % divisor).abs();
                write!(f, "{}{}.{:0>width$}", sign, int_part, frac_part, width = *scale as usize)
            }
            DataValue::Text(s) => write!(f, "\"{}\"", s),
            DataValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl PartialOrd for DataValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => Some(Ordering::Equal),
            (DataValue::Null, _) => Some(Ordering::Less),
            (_, DataValue::Null) => Some(Ordering::Greater),

            (DataValue::Integer(a), DataValue::Integer(b)) => a.partial_cmp(b),
            (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b),
            (DataValue::Integer(a), DataValue::Float(b)) => (*a as f64).partial_cmp(b),
            (DataValue::Float(a), DataValue::Integer(b)) => a.partial_cmp(&(*b as f64)),

            (DataValue::Decimal { .. } | DataValue::Integer(_), DataValue::Decimal { .. } | DataValue::Integer(_)) => {
                let (lv, ls) = self.as_decimal()?;
                let (rv, rs) = other.as_decimal()?;
                let scale = ls.max(rs);
                match (rescale_decimal(lv, ls, scale), rescale_decimal(rv, rs, scale)) {
                    (Some(l), Some(r)) => Some(l.cmp(&r)),
                    // Aligning scales overflowed; fall back to approximate comparison
                    _ => decimal_to_f64(lv, ls).partial_cmp(&decimal_to_f64(rv, rs)),
                }
            }
            (DataValue::Decimal { value, scale }, DataValue::Float(b)) => decimal_to_f64(*value, *scale).partial_cmp(b),
            (DataValue::Float(a), DataValue::Decimal { value, scale }) => a.partial_cmp(&decimal_to_f64(*value, *scale)),

            (DataValue::Text(a), DataValue::Text(b)) => Some(a.cmp(b)),
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl DataValue {
    /// Build a fixed-point value
    pub fn decimal(value: i128, scale: u32) -> Self {
        DataValue::Decimal { value, scale }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Unscaled value and scale of an exact numeric
    pub fn as_decimal(&self) -> Option<(i128, u32)> {
        match self {
            DataValue::Integer(i) => Some((*i as i128, 0)),
            DataValue::Decimal { value, scale } => Some((*value, *scale)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            DataValue::Decimal { value, scale } => Some(decimal_to_f64(*value, *scale)),
            _ => None,
        }
    }

    /// The narrowest type that describes this value, `None` for NULL
    pub fn natural_type(&self) -> Option<DataType> {
        match self {
            DataValue::Null => None,
            DataValue::Integer(i) if i32::try_from(*i).is_ok() => Some(DataType::Integer),
            DataValue::Integer(_) => Some(DataType::BigInt),
            DataValue::Float(_) => Some(DataType::Double),
            DataValue::Decimal { value, scale } => {
                let digits = crate::query::executor::type_conversion::decimal_digits(*value);
                Some(DataType::decimal(digits.max(*scale).max(1), *scale))
            }
            DataValue::Text(_) => Some(DataType::Varchar),
            DataValue::Boolean(_) => Some(DataType::Boolean),
        }
    }

    /// Compare two values, treating incomparable types as an error
    pub fn compare(&self, other: &Self) -> QueryResult<Ordering> {
        self.partial_cmp(other).ok_or_else(|| {
            QueryError::TypeError(format!("Cannot compare incompatible values {:?} and {:?}", self, other))
        })
    }

    pub fn to_sql_literal(&self) -> String {
        match self {
            DataValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            DataValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            other => other.to_string(),
        }
    }
}

/// An owned row as it comes off a scan.
///
/// The bytes keep the scan-produced shape and the key region is validated once
/// at construction, so handing out a [`RowBuffer`] view is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTuple {
    bytes: Vec<u8>,
    key_offset: usize,
    key_length: usize,
}

impl ResultTuple {
    pub fn new(bytes: Vec<u8>) -> Result<Self, RecordError> {
        let key = RowBuffer::from_scan(&bytes)?.key_region();
        let (key_offset, key_length) = (key.offset(), key.length());
        Ok(ResultTuple { bytes, key_offset, key_length })
    }

    /// Borrow the tuple as a row buffer
    pub fn row(&self) -> RowBuffer<'_> {
        RowBuffer::from_validated_scan(&self.bytes, self.key_offset, self.key_length)
    }

    pub fn key(&self) -> &[u8] {
        &self.bytes[self.key_offset..self.key_offset + self.key_length]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw value bytes of the latest version of a column
    pub fn column_value(&self, family: &[u8], qualifier: &[u8]) -> QueryResult<Option<&[u8]>> {
        let row = self.row();
        let cell = decoder::lookup_column(&row, family, qualifier)?;
        Ok(cell.map(|cell| cell.value()))
    }
}

/// A projected output row with its columns in projection order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectedRow {
    values: LinkedHashMap<String, DataValue>,
}

impl ProjectedRow {
    pub fn new() -> Self {
        ProjectedRow {
            values: LinkedHashMap::new(),
        }
    }

    /// Set a value for a column, keeping the first position of the column
    pub fn set(&mut self, column: String, value: DataValue) {
        if let Some(existing) = self.values.get_mut(&column) {
            *existing = value;
        } else {
            self.values.insert(column, value);
        }
    }

    pub fn get(&self, column: &str) -> Option<&DataValue> {
        self.values.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &DataValue> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Represents query execution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A record's bytes do not match the layout they claim
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    /// Pulling the next row from the scan failed
    #[error("Scan advance failure: {0}")]
    ScanAdvanceFailure(String),
    /// The scan failed earlier and must be re-issued
    #[error("Scan aborted after an earlier failure; re-issue the scan")]
    ScanAborted,
    /// Error in data type conversion
    #[error("Type error: {0}")]
    TypeError(String),
    /// Error while building expressions or plans
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Error during query execution
    #[error("Execution error: {0}")]
    ExecutionError(String),
    /// Error encoding or decoding a filter or range for the store
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Numeric overflow
    #[error("Numeric overflow")]
    NumericOverflow,
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
}

impl From<RecordError> for QueryError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::MalformedRecord(reason) => QueryError::MalformedRecord(reason),
        }
    }
}

impl From<bincode::Error> for QueryError {
    fn from(err: bincode::Error) -> Self {
        QueryError::SerializationError(err.to_string())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
