// Filter Pushdown
//
// Rewrites `column <op> literal` comparisons into single-column filters the
// store applies during the scan, so rejected rows never leave the server.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::query::executor::result::{QueryResult, DataValue};
use crate::query::executor::type_conversion::cast_to_type;
use crate::query::expression::node::LiteralExpression;
use crate::query::expression::{codec, CompareOp, Expression};
use crate::query::parser::ast::{ColumnReference, DataType};
use crate::storage::row::{decoder, RowBuffer};

/// Compares the latest value of one column against encoded bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
    pub op: CompareOp,
    /// Order-preserving encoding of the comparison value
    pub value: Vec<u8>,
    /// Reject rows that lack the column
    pub filter_if_missing: bool,
}

impl ColumnFilter {
    /// Apply the filter to a row the way the store does
    pub fn accepts(&self, row: &RowBuffer<'_>) -> QueryResult<bool> {
        match decoder::lookup_column(row, &self.family, &self.qualifier)? {
            Some(cell) => Ok(self.op.matches(cell.value().cmp(self.value.as_slice()))),
            None => Ok(!self.filter_if_missing),
        }
    }

    pub fn to_bytes(&self) -> QueryResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> QueryResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Splits predicates into store-side filters and a residual
#[derive(Debug, Default, Clone, Copy)]
pub struct PushdownCompiler;

impl PushdownCompiler {
    pub fn new() -> Self {
        PushdownCompiler
    }

    /// Compile a comparison between a column and a literal, in either operand
    /// order. `None` when the expression cannot be applied by the store
    /// exactly.
    pub fn compile(&self, expr: &Expression) -> Option<ColumnFilter> {
        let Expression::Comparison(cmp) = expr else {
            return None;
        };
        match (cmp.lhs(), cmp.rhs()) {
            (Expression::ColumnRef(column), Expression::Literal(lit)) => self.column_filter(column, cmp.op(), lit),
            (Expression::Literal(lit), Expression::ColumnRef(column)) => {
                self.column_filter(column, cmp.op().invert(), lit)
            }
            _ => None,
        }
    }

    /// Push what can be pushed. Returns the filters and the predicate left to
    /// evaluate locally.
    pub fn partition(&self, predicate: Option<Expression>) -> (Vec<ColumnFilter>, Option<Expression>) {
        match predicate {
            Some(expr) => match self.compile(&expr) {
                Some(filter) => {
                    debug!("Pushed down predicate {}", expr);
                    (vec![filter], None)
                }
                None => (Vec::new(), Some(expr)),
            },
            None => (Vec::new(), None),
        }
    }

    fn column_filter(&self, column: &ColumnReference, op: CompareOp, lit: &LiteralExpression) -> Option<ColumnFilter> {
        let value = self.exact_value(lit.value(), &column.data_type)?;
        let encoded = codec::encode(&value, &column.data_type).ok()?;
        Some(ColumnFilter {
            family: column.family.clone(),
            qualifier: column.qualifier.clone(),
            op,
            value: encoded,
            filter_if_missing: true,
        })
    }

    /// The literal as a value of the column type, only when the conversion
    /// loses nothing and byte order matches value order
    fn exact_value(&self, value: &DataValue, data_type: &DataType) -> Option<DataValue> {
        if value.is_null() {
            return None;
        }
        // NaN has a byte order but no value order
        if matches!(value, DataValue::Float(f) if f.is_nan()) {
            return None;
        }
        // Stored decimals are only byte-comparable at one fixed scale
        if let DataType::Decimal { scale: None, .. } = data_type {
            return None;
        }
        let cast = cast_to_type(value.clone(), data_type).ok()?;
        match cast.compare(value) {
            Ok(std::cmp::Ordering::Equal) => Some(cast),
            _ => None,
        }
    }
}
