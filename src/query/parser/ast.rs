// SQL Abstract Syntax Tree (AST) Implementation
//
// This module defines the parse nodes handed to the evaluation core by the
// SQL front end, the declared column types they reference, and the
// statement descriptor a query plan is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::executor::result::DataValue;
use crate::query::expression::compare::CompareOp;
use crate::query::expression::node::ArithmeticOp;
use crate::query::expression::width::NumericWidth;

/// SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// Fixed-point number; absent precision or scale means unconstrained
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Double,
    Varchar,
    Boolean,
}

impl DataType {
    /// A `DECIMAL(precision, scale)` type
    pub fn decimal(precision: u32, scale: u32) -> Self {
        DataType::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        }
    }

    /// A `DECIMAL` with no declared precision or scale
    pub fn unconstrained_decimal() -> Self {
        DataType::Decimal {
            precision: None,
            scale: None,
        }
    }

    /// Width implied by the type when used as an arithmetic operand
    pub fn width(&self) -> NumericWidth {
        match self {
            DataType::Integer => NumericWidth::fixed(10, 0),
            DataType::BigInt => NumericWidth::fixed(19, 0),
            DataType::Decimal { precision, scale } => NumericWidth::new(*precision, *scale),
            DataType::Double | DataType::Varchar | DataType::Boolean => NumericWidth::UNCONSTRAINED,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Integer | DataType::BigInt | DataType::Decimal { .. } | DataType::Double
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Decimal {
                precision: Some(p),
                scale: Some(s),
            } => write!(f, "DECIMAL({},{})", p, s),
            DataType::Decimal {
                precision: Some(p),
                scale: None,
            } => write!(f, "DECIMAL({})", p),
            DataType::Decimal { .. } => write!(f, "DECIMAL"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Varchar => write!(f, "VARCHAR"),
            DataType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Column reference resolved to its physical location in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnReference {
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
    pub data_type: DataType,
}

impl ColumnReference {
    pub fn new(family: impl Into<Vec<u8>>, qualifier: impl Into<Vec<u8>>, data_type: DataType) -> Self {
        ColumnReference {
            family: family.into(),
            qualifier: qualifier.into(),
            data_type,
        }
    }

    /// Display name in `family.qualifier` form
    pub fn name(&self) -> String {
        format!(
            "{}.{}",
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier)
        )
    }
}

/// Parse tree node as produced by the SQL front end
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    Literal(DataValue),
    Column(ColumnReference),
    Arithmetic { op: ArithmeticOp, children: Vec<ParseNode> },
    Comparison(Box<ComparisonParseNode>),
}

impl ParseNode {
    pub fn literal(value: DataValue) -> Self {
        ParseNode::Literal(value)
    }

    pub fn column(column: ColumnReference) -> Self {
        ParseNode::Column(column)
    }

    pub fn arithmetic(op: ArithmeticOp, children: Vec<ParseNode>) -> Self {
        ParseNode::Arithmetic { op, children }
    }
}

impl From<ComparisonParseNode> for ParseNode {
    fn from(node: ComparisonParseNode) -> Self {
        ParseNode::Comparison(Box::new(node))
    }
}

/// A binary comparison in the parse tree.
///
/// `filter_op` is the operator to use when the left-hand side is the column
/// being filtered; `invert_filter_op` is the one to use when the operands
/// are read the other way round.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonParseNode {
    lhs: ParseNode,
    rhs: ParseNode,
    op: CompareOp,
}

impl ComparisonParseNode {
    pub fn new(lhs: ParseNode, op: CompareOp, rhs: ParseNode) -> Self {
        ComparisonParseNode { lhs, rhs, op }
    }

    pub fn less_than(lhs: ParseNode, rhs: ParseNode) -> Self {
        Self::new(lhs, CompareOp::Less, rhs)
    }

    pub fn less_or_equal(lhs: ParseNode, rhs: ParseNode) -> Self {
        Self::new(lhs, CompareOp::LessOrEqual, rhs)
    }

    pub fn equal(lhs: ParseNode, rhs: ParseNode) -> Self {
        Self::new(lhs, CompareOp::Equal, rhs)
    }

    pub fn not_equal(lhs: ParseNode, rhs: ParseNode) -> Self {
        Self::new(lhs, CompareOp::NotEqual, rhs)
    }

    pub fn greater_than(lhs: ParseNode, rhs: ParseNode) -> Self {
        Self::new(lhs, CompareOp::Greater, rhs)
    }

    pub fn greater_or_equal(lhs: ParseNode, rhs: ParseNode) -> Self {
        Self::new(lhs, CompareOp::GreaterOrEqual, rhs)
    }

    pub fn lhs(&self) -> &ParseNode {
        &self.lhs
    }

    pub fn rhs(&self) -> &ParseNode {
        &self.rhs
    }

    pub fn filter_op(&self) -> CompareOp {
        self.op
    }

    pub fn invert_filter_op(&self) -> CompareOp {
        self.op.invert()
    }

    /// Exchange the operands, switching to the operand-swapped operator so
    /// the comparison keeps its meaning
    pub fn swap_operands(self) -> Self {
        ComparisonParseNode {
            lhs: self.rhs,
            rhs: self.lhs,
            op: self.op.invert(),
        }
    }
}

/// Descriptor of a statement that may carry a WHERE clause
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterableStatement {
    /// WHERE clause (optional)
    pub where_clause: Option<ParseNode>,
    /// Whether the statement is `SELECT DISTINCT`
    pub distinct: bool,
    /// Whether the statement aggregates rows
    pub aggregate: bool,
    /// LIMIT clause (optional)
    pub limit: Option<usize>,
}

impl FilterableStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where(mut self, predicate: ParseNode) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_aggregate(mut self, aggregate: bool) -> Self {
        self.aggregate = aggregate;
        self
    }
}
