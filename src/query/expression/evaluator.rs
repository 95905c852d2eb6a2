// Expression Evaluation
//
// The visitors shipped with the expression tree: row evaluation, column
// collection and rendering.

use std::fmt;

use log::trace;

use crate::common::types::MAX_PRECISION;
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::executor::type_conversion::{check_precision, divide_decimal, rescale_decimal};
use crate::query::expression::codec;
use crate::query::expression::node::{ArithmeticExpression, ArithmeticOp, Expression};
use crate::query::expression::visitor::ExpressionVisitor;
use crate::query::parser::ast::{ColumnReference, DataType};
use crate::storage::row::{decoder, RowBuffer};

/// Scale used for a decimal quotient whose node carries no scale
const UNCONSTRAINED_DIVISION_EXTRA_SCALE: u32 = 4;

/// Evaluates an expression against one decoded row
pub struct RowEvaluator<'r, 'a> {
    row: &'r RowBuffer<'a>,
}

impl<'r, 'a> RowEvaluator<'r, 'a> {
    pub fn new(row: &'r RowBuffer<'a>) -> Self {
        RowEvaluator { row }
    }

    fn column_value(&self, column: &ColumnReference) -> QueryResult<DataValue> {
        match decoder::lookup_column(self.row, &column.family, &column.qualifier)? {
            Some(cell) => codec::decode(cell.value(), &column.data_type),
            None => {
                trace!("Column {} absent from row, evaluating to NULL", column.name());
                Ok(DataValue::Null)
            }
        }
    }
}

impl ExpressionVisitor for RowEvaluator<'_, '_> {
    type Output = QueryResult<DataValue>;

    fn visit_leave(&mut self, node: &Expression, child_results: &mut Vec<Self::Output>) -> Option<Self::Output> {
        // A failed child leaves the result to default_return
        if child_results.iter().any(|r| r.is_err()) {
            return None;
        }
        let mut values = child_results.drain(..).flatten();
        let result = match node {
            Expression::Literal(lit) => Ok(lit.value().clone()),
            Expression::ColumnRef(column) => self.column_value(column),
            Expression::Arithmetic(arith) => {
                let operands: Vec<DataValue> = values.collect();
                evaluate_arithmetic(arith, &operands)
            }
            Expression::Comparison(cmp) => match (values.next(), values.next()) {
                (Some(lhs), Some(rhs)) => cmp.op().evaluate(&lhs, &rhs),
                _ => Err(QueryError::ExecutionError(format!("Comparison {} is missing operands", node))),
            },
        };
        Some(result)
    }

    fn default_return(&mut self, node: &Expression, child_results: Vec<Self::Output>) -> Self::Output {
        match child_results.into_iter().find(|r| r.is_err()) {
            Some(err) => err,
            None => Err(QueryError::ExecutionError(format!("No result produced for {}", node))),
        }
    }
}

/// Collects every column an expression reads, in first-seen order
#[derive(Debug, Default)]
pub struct ColumnCollector {
    columns: Vec<ColumnReference>,
}

impl ColumnCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_columns(self) -> Vec<ColumnReference> {
        self.columns
    }
}

impl ExpressionVisitor for ColumnCollector {
    type Output = ();

    fn visit_leave(&mut self, node: &Expression, _child_results: &mut Vec<()>) -> Option<()> {
        if let Expression::ColumnRef(column) = node {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        None
    }

    fn default_return(&mut self, _node: &Expression, _child_results: Vec<()>) {}
}

/// Renders an expression as SQL-like text
pub struct ExpressionFormatter;

impl ExpressionVisitor for ExpressionFormatter {
    type Output = String;

    fn visit_leave(&mut self, node: &Expression, child_results: &mut Vec<String>) -> Option<String> {
        match node {
            Expression::Literal(lit) => Some(lit.value().to_sql_literal()),
            Expression::ColumnRef(column) => Some(column.name()),
            Expression::Arithmetic(arith) => Some(format!("({})", child_results.join(arith.op().operator_string()))),
            Expression::Comparison(cmp) => Some(format!("{} {} {}", child_results[0], cmp.op(), child_results[1])),
        }
    }

    fn default_return(&mut self, _node: &Expression, child_results: Vec<String>) -> String {
        child_results.concat()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut ExpressionFormatter))
    }
}

impl Expression {
    /// Evaluate against a row
    pub fn evaluate(&self, row: &RowBuffer<'_>) -> QueryResult<DataValue> {
        self.accept(&mut RowEvaluator::new(row))
    }

    /// Evaluate as a filter predicate. NULL counts as false.
    pub fn evaluate_predicate(&self, row: &RowBuffer<'_>) -> QueryResult<bool> {
        match self.evaluate(row)? {
            DataValue::Boolean(b) => Ok(b),
            DataValue::Null => Ok(false),
            other => Err(QueryError::TypeError(format!("Predicate {} produced non-boolean {:?}", self, other))),
        }
    }

    /// Columns read by the expression
    pub fn referenced_columns(&self) -> Vec<ColumnReference> {
        let mut collector = ColumnCollector::new();
        self.accept(&mut collector);
        collector.into_columns()
    }
}

fn evaluate_arithmetic(arith: &ArithmeticExpression, operands: &[DataValue]) -> QueryResult<DataValue> {
    if operands.iter().any(DataValue::is_null) {
        return Ok(DataValue::Null);
    }
    match arith.data_type() {
        DataType::Double => fold_double(arith.op(), operands),
        DataType::Decimal { .. } => fold_decimal(arith, operands),
        _ => fold_integer(arith.op(), operands),
    }
}

fn fold_integer(op: ArithmeticOp, operands: &[DataValue]) -> QueryResult<DataValue> {
    let mut values = operands.iter().map(|v| match v {
        DataValue::Integer(i) => Ok(*i),
        other => Err(QueryError::TypeError(format!("Expected integer operand, found {:?}", other))),
    });
    let mut acc = match values.next() {
        Some(first) => first?,
        None => return Ok(DataValue::Null),
    };
    for value in values {
        let rhs = value?;
        acc = match op {
            ArithmeticOp::Add => acc.checked_add(rhs),
            ArithmeticOp::Subtract => acc.checked_sub(rhs),
            ArithmeticOp::Multiply => acc.checked_mul(rhs),
            ArithmeticOp::Divide if rhs == 0 => return Err(QueryError::DivisionByZero),
            ArithmeticOp::Divide => acc.checked_div(rhs),
        }
        .ok_or(QueryError::NumericOverflow)?;
    }
    Ok(DataValue::Integer(acc))
}

fn fold_double(op: ArithmeticOp, operands: &[DataValue]) -> QueryResult<DataValue> {
    let mut values = operands.iter().map(|v| {
        v.as_f64()
            .ok_or_else(|| QueryError::TypeError(format!("Expected numeric operand, found {:?}", v)))
    });
    let mut acc = match values.next() {
        Some(first) => first?,
        None => return Ok(DataValue::Null),
    };
    for value in values {
        let rhs = value?;
        acc = match op {
            ArithmeticOp::Add => acc + rhs,
            ArithmeticOp::Subtract => acc - rhs,
            ArithmeticOp::Multiply => acc * rhs,
            ArithmeticOp::Divide if rhs == 0.0 => return Err(QueryError::DivisionByZero),
            ArithmeticOp::Divide => acc / rhs,
        };
    }
    Ok(DataValue::Float(acc))
}

fn fold_decimal(arith: &ArithmeticExpression, operands: &[DataValue]) -> QueryResult<DataValue> {
    let exact = |v: &DataValue| {
        v.as_decimal()
            .ok_or_else(|| QueryError::TypeError(format!("Expected exact numeric operand, found {:?}", v)))
    };
    let Some((first, rest)) = operands.split_first() else {
        return Ok(DataValue::Null);
    };

    let (mut acc, mut acc_scale) = exact(first)?;
    for (operand, step) in rest.iter().zip(arith.step_widths()) {
        let (rhs, rhs_scale) = exact(operand)?;
        (acc, acc_scale) = match arith.op() {
            ArithmeticOp::Add | ArithmeticOp::Subtract => {
                let scale = acc_scale.max(rhs_scale);
                let l = rescale_decimal(acc, acc_scale, scale).ok_or(QueryError::NumericOverflow)?;
                let r = rescale_decimal(rhs, rhs_scale, scale).ok_or(QueryError::NumericOverflow)?;
                let sum = if arith.op() == ArithmeticOp::Add { l.checked_add(r) } else { l.checked_sub(r) };
                (sum.ok_or(QueryError::NumericOverflow)?, scale)
            }
            ArithmeticOp::Multiply => {
                let product = acc.checked_mul(rhs).ok_or(QueryError::NumericOverflow)?;
                let scale = acc_scale + rhs_scale;
                if scale > MAX_PRECISION {
                    let reduced = rescale_decimal(product, scale, MAX_PRECISION).ok_or(QueryError::NumericOverflow)?;
                    (reduced, MAX_PRECISION)
                } else {
                    (product, scale)
                }
            }
            ArithmeticOp::Divide => {
                let target = step
                    .scale
                    .unwrap_or_else(|| (acc_scale.max(rhs_scale) + UNCONSTRAINED_DIVISION_EXTRA_SCALE).min(MAX_PRECISION));
                (divide_decimal(acc, acc_scale, rhs, rhs_scale, target)?, target)
            }
        };
    }

    let width = arith.width();
    if let Some(scale) = width.scale {
        acc = rescale_decimal(acc, acc_scale, scale).ok_or(QueryError::NumericOverflow)?;
        acc_scale = scale;
        check_precision(acc, width.max_length)?;
    }
    Ok(DataValue::Decimal {
        value: acc,
        scale: acc_scale,
    })
}
