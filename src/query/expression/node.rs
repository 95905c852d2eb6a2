// Expression Tree Nodes
//
// Typed expression nodes bound from parse nodes. Every node resolves its
// data type and numeric width when it is built; the tree is immutable after
// that and evaluation only reads it.

use serde::{Deserialize, Serialize};

use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::executor::type_conversion::cast_to_type;
use crate::query::expression::compare::CompareOp;
use crate::query::expression::width::NumericWidth;
use crate::query::parser::ast::{ColumnReference, DataType, ParseNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    /// Infix form used when rendering, including the surrounding spaces
    pub fn operator_string(self) -> &'static str {
        match self {
            ArithmeticOp::Add => " + ",
            ArithmeticOp::Subtract => " - ",
            ArithmeticOp::Multiply => " * ",
            ArithmeticOp::Divide => " / ",
        }
    }

    /// Width of `lhs <op> rhs`
    pub fn combine(self, lhs: NumericWidth, rhs: NumericWidth) -> NumericWidth {
        match self {
            ArithmeticOp::Add => lhs.add(rhs),
            ArithmeticOp::Subtract => lhs.subtract(rhs),
            ArithmeticOp::Multiply => lhs.multiply(rhs),
            ArithmeticOp::Divide => lhs.divide(rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpression {
    value: DataValue,
    /// `None` only for an untyped NULL
    data_type: Option<DataType>,
    width: NumericWidth,
}

impl LiteralExpression {
    pub fn value(&self) -> &DataValue {
        &self.value
    }
}

/// `children[0] <op> children[1] <op> ...`, folded left to right
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticExpression {
    op: ArithmeticOp,
    children: Vec<Expression>,
    data_type: DataType,
    /// Accumulated width after folding in `children[i + 1]`
    steps: Vec<NumericWidth>,
}

impl ArithmeticExpression {
    pub fn op(&self) -> ArithmeticOp {
        self.op
    }

    pub fn children(&self) -> &[Expression] {
        &self.children
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn step_widths(&self) -> &[NumericWidth] {
        &self.steps
    }

    pub fn width(&self) -> NumericWidth {
        self.steps.last().copied().unwrap_or(NumericWidth::UNCONSTRAINED)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpression {
    op: CompareOp,
    lhs: Box<Expression>,
    rhs: Box<Expression>,
}

impl ComparisonExpression {
    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn lhs(&self) -> &Expression {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expression {
        &self.rhs
    }
}

/// A typed scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(LiteralExpression),
    ColumnRef(ColumnReference),
    Arithmetic(ArithmeticExpression),
    Comparison(ComparisonExpression),
}

impl Expression {
    /// A literal typed by its value
    pub fn literal(value: DataValue) -> Self {
        let data_type = value.natural_type();
        let width = data_type.map(|t| t.width()).unwrap_or(NumericWidth::UNCONSTRAINED);
        Expression::Literal(LiteralExpression { value, data_type, width })
    }

    /// A literal cast to a declared type
    pub fn typed_literal(value: DataValue, data_type: DataType) -> QueryResult<Self> {
        let value = cast_to_type(value, &data_type)?;
        Ok(Expression::Literal(LiteralExpression {
            value,
            data_type: Some(data_type),
            width: data_type.width(),
        }))
    }

    pub fn column(column: ColumnReference) -> Self {
        Expression::ColumnRef(column)
    }

    /// Build an arithmetic node, resolving its type and folding the operand
    /// widths left to right
    pub fn arithmetic(op: ArithmeticOp, children: Vec<Expression>) -> QueryResult<Self> {
        if children.len() < 2 {
            return Err(QueryError::PlanningError(format!(
                "Arithmetic{}needs at least two operands, got {}",
                op.operator_string(),
                children.len()
            )));
        }

        let mut has_double = false;
        let mut has_decimal = false;
        for child in &children {
            match child.data_type() {
                Some(DataType::Double) => has_double = true,
                Some(DataType::Decimal { .. }) => has_decimal = true,
                Some(DataType::Integer | DataType::BigInt) | None => {}
                Some(other) => {
                    return Err(QueryError::TypeError(format!(
                        "Arithmetic operand {} has non-numeric type {}",
                        child, other
                    )));
                }
            }
        }

        let mut steps = Vec::with_capacity(children.len() - 1);
        let mut acc = children[0].width();
        for child in &children[1..] {
            acc = op.combine(acc, child.width());
            steps.push(acc);
        }

        let data_type = if has_double {
            DataType::Double
        } else if has_decimal {
            DataType::Decimal {
                precision: acc.max_length,
                scale: acc.scale,
            }
        } else {
            DataType::BigInt
        };

        Ok(Expression::Arithmetic(ArithmeticExpression {
            op,
            children,
            data_type,
            steps,
        }))
    }

    /// Build a comparison, rejecting operand types that can never compare
    pub fn comparison(lhs: Expression, op: CompareOp, rhs: Expression) -> QueryResult<Self> {
        if let (Some(l), Some(r)) = (lhs.data_type(), rhs.data_type()) {
            let comparable = (l.is_numeric() && r.is_numeric())
                || std::mem::discriminant(&l) == std::mem::discriminant(&r);
            if !comparable {
                return Err(QueryError::TypeError(format!("Cannot compare {} with {}", l, r)));
            }
        }
        Ok(Expression::Comparison(ComparisonExpression {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }))
    }

    /// Bind a parse tree into a typed expression
    pub fn bind(node: &ParseNode) -> QueryResult<Self> {
        match node {
            ParseNode::Literal(value) => Ok(Expression::literal(value.clone())),
            ParseNode::Column(column) => Ok(Expression::column(column.clone())),
            ParseNode::Arithmetic { op, children } => {
                let children = children.iter().map(Expression::bind).collect::<QueryResult<Vec<_>>>()?;
                Expression::arithmetic(*op, children)
            }
            ParseNode::Comparison(cmp) => Expression::comparison(
                Expression::bind(cmp.lhs())?,
                cmp.filter_op(),
                Expression::bind(cmp.rhs())?,
            ),
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::ColumnRef(_) => Vec::new(),
            Expression::Arithmetic(arith) => arith.children.iter().collect(),
            Expression::Comparison(cmp) => vec![cmp.lhs.as_ref(), cmp.rhs.as_ref()],
        }
    }

    /// Resolved type, `None` for an untyped NULL literal
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Expression::Literal(lit) => lit.data_type,
            Expression::ColumnRef(column) => Some(column.data_type),
            Expression::Arithmetic(arith) => Some(arith.data_type),
            Expression::Comparison(_) => Some(DataType::Boolean),
        }
    }

    pub fn width(&self) -> NumericWidth {
        match self {
            Expression::Literal(lit) => lit.width,
            Expression::ColumnRef(column) => column.data_type.width(),
            Expression::Arithmetic(arith) => arith.width(),
            Expression::Comparison(_) => NumericWidth::UNCONSTRAINED,
        }
    }
}
