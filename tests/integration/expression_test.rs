use anyhow::Result;

use cellscan::query::expression::{ArithmeticOp, CompareOp, Expression, NumericWidth};
use cellscan::query::parser::ast::{ColumnReference, ComparisonParseNode, DataType, ParseNode};
use cellscan::{DataValue, QueryError, RowBuffer};

#[path = "../common/mod.rs"]
mod common;
use common::{cell_array_row, cell_buffers, decimal_value, int_value, scan_record};

fn decimal_literal(value: i128, precision: u32, scale: u32) -> Expression {
    Expression::typed_literal(DataValue::decimal(value, scale), DataType::decimal(precision, scale)).unwrap()
}

fn divide(children: Vec<Expression>) -> Expression {
    Expression::arithmetic(ArithmeticOp::Divide, children).unwrap()
}

/// Folding left to right matches the hand-accumulated width
#[test]
fn test_division_width_folds_left_to_right() {
    let a = decimal_literal(12345, 5, 2);
    let b = decimal_literal(123, 3, 0);
    let c = decimal_literal(1234, 4, 1);

    // a / b: scale = 38 - 5 + 2 - 0 = 35, precision = min(38, 35 + 5 - 2 + 3)
    let ab = NumericWidth::fixed(5, 2).divide(NumericWidth::fixed(3, 0));
    assert_eq!(ab, NumericWidth::fixed(38, 35));
    // (a / b) / c: scale = 38 - 38 + 35 - 1 = 34
    let abc = ab.divide(NumericWidth::fixed(4, 1));
    assert_eq!(abc, NumericWidth::fixed(38, 34));

    assert_eq!(divide(vec![a.clone(), b.clone(), c.clone()]).width(), abc);

    // Reversed: (c / b) / a = scale 38 - 38 + 35 - 2 = 33
    assert_eq!(divide(vec![c, b, a]).width(), NumericWidth::fixed(38, 33));
}

#[test]
fn test_division_with_zero_scales() {
    let int = Expression::column(ColumnReference::new("cf", "a", DataType::Integer));
    let two = Expression::literal(DataValue::decimal(2, 0));
    assert_eq!(two.width(), NumericWidth::fixed(1, 0));

    let quotient = divide(vec![int, two]);
    assert_eq!(quotient.width(), NumericWidth::fixed(38, 28));

    let one = decimal_literal(1, 1, 0);
    assert_eq!(divide(vec![one.clone(), one]).width(), NumericWidth::fixed(38, 37));
}

/// `cf:a` holds INTEGER 10; `cf:a / 2` is 5 at the recomputed scale
#[test]
fn test_integer_column_divided_by_decimal_literal() -> Result<()> {
    let columns = vec![("cf", "a", int_value(10))];
    let record = scan_record(b"row1", &columns);
    let buffers = cell_buffers(b"row1", &columns);
    let scanned = RowBuffer::from_scan(&record)?;
    let assembled = cell_array_row(&buffers);

    let expr = divide(vec![
        Expression::column(ColumnReference::new("cf", "a", DataType::Integer)),
        Expression::literal(DataValue::decimal(2, 0)),
    ]);
    assert_eq!(expr.data_type(), Some(DataType::decimal(38, 28)));

    let expected = DataValue::decimal(5 * 10i128.pow(28), 28);
    assert_eq!(expr.evaluate(&scanned)?, expected);
    assert_eq!(expr.evaluate(&assembled)?, expected);
    assert_eq!(expected.to_string(), format!("5.{}", "0".repeat(28)));
    Ok(())
}

#[test]
fn test_decimal_column_arithmetic() -> Result<()> {
    let columns = vec![
        ("cf", "price", decimal_value(1999, 2, 6)),
        ("cf", "qty", int_value(3)),
    ];
    let record = scan_record(b"item", &columns);
    let row = RowBuffer::from_scan(&record)?;
    let price = Expression::column(ColumnReference::new("cf", "price", DataType::decimal(6, 2)));
    let qty = Expression::column(ColumnReference::new("cf", "qty", DataType::Integer));

    let total = Expression::arithmetic(ArithmeticOp::Multiply, vec![price.clone(), qty.clone()])?;
    assert_eq!(total.width(), NumericWidth::fixed(16, 2));
    assert_eq!(total.evaluate(&row)?, DataValue::decimal(5997, 2));

    // 19.99 / 3 = 6.6633... rounded half up at the node's scale
    let unit = Expression::arithmetic(ArithmeticOp::Divide, vec![price.clone(), qty])?;
    let scale = unit.width().scale.unwrap();
    assert_eq!(scale, 38 - 6 + 2);
    let DataValue::Decimal { value, scale: result_scale } = unit.evaluate(&row)? else {
        panic!("expected a decimal quotient");
    };
    assert_eq!(result_scale, scale);
    let truncated = value / 10i128.pow(scale - 4);
    assert_eq!(truncated, 66633);

    let discounted = Expression::arithmetic(ArithmeticOp::Subtract, vec![price, Expression::literal(DataValue::decimal(5, 1))])?;
    assert_eq!(discounted.evaluate(&row)?, DataValue::decimal(1949, 2));
    Ok(())
}

/// A stored value at the edge of i128 overflows instead of panicking
#[test]
fn test_extreme_decimal_division_overflows() -> Result<()> {
    // Sign-flipped encoding of i128::MIN at scale 0
    let record = scan_record(b"r", &[("cf", "d", vec![0u8; 17])]);
    let row = RowBuffer::from_scan(&record)?;
    let column = Expression::column(ColumnReference::new("cf", "d", DataType::decimal(38, 0)));

    let quotient = divide(vec![column.clone(), Expression::literal(DataValue::decimal(-1, 0))]);
    assert_eq!(quotient.evaluate(&row), Err(QueryError::NumericOverflow));

    // The quotient fits in i128 but its 39 digits exceed the node's precision
    let identity = divide(vec![column, Expression::literal(DataValue::decimal(1, 0))]);
    assert_eq!(identity.evaluate(&row), Err(QueryError::NumericOverflow));
    Ok(())
}

#[test]
fn test_unconstrained_operand_saturates_width() -> Result<()> {
    let record = scan_record(b"r", &[("cf", "x", int_value(7))]);
    let row = RowBuffer::from_scan(&record)?;

    let open = Expression::typed_literal(DataValue::decimal(1, 0), DataType::unconstrained_decimal())?;
    let x = Expression::column(ColumnReference::new("cf", "x", DataType::Integer));
    let quotient = Expression::arithmetic(ArithmeticOp::Divide, vec![x, open.clone(), open])?;
    assert_eq!(quotient.width(), NumericWidth::SATURATED);
    // Each quotient without a scale keeps four digits past its operands
    assert_eq!(quotient.evaluate(&row)?, DataValue::decimal(7 * 10i128.pow(8), 8));
    Ok(())
}

#[test]
fn test_double_arithmetic_and_comparisons() -> Result<()> {
    let row = RowBuffer::from_cells(Vec::new())?;
    let sum = Expression::arithmetic(
        ArithmeticOp::Add,
        vec![Expression::literal(DataValue::Float(0.5)), Expression::literal(DataValue::decimal(25, 1))],
    )?;
    assert_eq!(sum.data_type(), Some(DataType::Double));
    assert_eq!(sum.evaluate(&row)?, DataValue::Float(3.0));

    for op in CompareOp::ALL {
        let cmp = Expression::comparison(sum.clone(), op, Expression::literal(DataValue::Integer(3)))?;
        let expected = op.matches(std::cmp::Ordering::Equal);
        assert_eq!(cmp.evaluate(&row)?, DataValue::Boolean(expected), "{}", cmp);
    }

    let zero = Expression::arithmetic(
        ArithmeticOp::Divide,
        vec![Expression::literal(DataValue::Float(1.0)), Expression::literal(DataValue::Integer(0))],
    )?;
    assert_eq!(zero.evaluate(&row), Err(QueryError::DivisionByZero));
    Ok(())
}

/// A swapped `<` comparison pushes down as `>` and swapping back restores `<`
#[test]
fn test_swapped_less_than_for_pushdown() -> Result<()> {
    let column = ColumnReference::new("cf", "a", DataType::Integer);
    let node = ComparisonParseNode::less_than(ParseNode::column(column.clone()), ParseNode::literal(DataValue::Integer(5)));
    assert_eq!(node.invert_filter_op(), CompareOp::Greater);

    let swapped = node.swap_operands();
    assert_eq!(swapped.filter_op(), CompareOp::Greater);
    assert_eq!(swapped.lhs(), &ParseNode::literal(DataValue::Integer(5)));

    // Both forms agree on every row
    let forward = Expression::bind(&swapped.clone().swap_operands().into())?;
    let backward = Expression::bind(&swapped.clone().into())?;
    for v in [4, 5, 6] {
        let record = scan_record(b"r", &[("cf", "a", int_value(v))]);
        let row = RowBuffer::from_scan(&record)?;
        assert_eq!(forward.evaluate(&row)?, backward.evaluate(&row)?);
    }

    let restored = swapped.swap_operands();
    assert_eq!(restored.filter_op(), CompareOp::Less);
    Ok(())
}

#[test]
fn test_operator_inversion_is_involutive() {
    for op in CompareOp::ALL {
        assert_eq!(op.invert().invert(), op);
    }
    assert_eq!(CompareOp::Less.invert(), CompareOp::Greater);
    assert_eq!(CompareOp::Greater.invert(), CompareOp::Less);
    assert_eq!(CompareOp::Equal.invert(), CompareOp::Equal);
    assert_eq!(CompareOp::NotEqual.invert(), CompareOp::NotEqual);
    assert_eq!(CompareOp::LessOrEqual.invert(), CompareOp::GreaterOrEqual);
}

/// One expression tree evaluated from several threads against distinct rows
#[test]
fn test_concurrent_evaluation() -> Result<()> {
    let records: Vec<Vec<u8>> = (0..8)
        .map(|i| scan_record(format!("row{}", i).as_bytes(), &[("cf", "a", int_value(i * 10))]))
        .collect();
    let expr = divide(vec![
        Expression::column(ColumnReference::new("cf", "a", DataType::Integer)),
        Expression::literal(DataValue::decimal(2, 0)),
    ]);

    let results: Vec<DataValue> = crossbeam::scope(|s| {
        let handles: Vec<_> = records
            .iter()
            .map(|record| {
                let expr = &expr;
                s.spawn(move |_| {
                    let row = RowBuffer::from_scan(record).unwrap();
                    expr.evaluate(&row).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    for (i, value) in results.into_iter().enumerate() {
        assert_eq!(value, DataValue::decimal(5 * i as i128 * 10i128.pow(28), 28));
    }
    Ok(())
}
