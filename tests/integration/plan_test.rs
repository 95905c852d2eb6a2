use std::sync::Arc;

use anyhow::Result;

use cellscan::query::expression::{ArithmeticOp, Expression};
use cellscan::query::parser::ast::{ColumnReference, ComparisonParseNode, DataType, FilterableStatement, ParseNode};
use cellscan::query::planner::{ColumnProjector, KeyRange, OrderBy, RowProjector, StatementContext, TableRef};
use cellscan::{DataValue, QueryError, QueryPlan, ScanConfig, ScanPlan};

#[path = "../common/mod.rs"]
mod common;
use common::{decimal_value, int_value, shared, MemoryStore};

fn qty() -> ColumnReference {
    ColumnReference::new("cf", "qty", DataType::Integer)
}

fn price() -> ColumnReference {
    ColumnReference::new("cf", "price", DataType::decimal(8, 2))
}

/// Ten rows `r01`..`r10`, qty = i and price = i * 1.25
fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for i in 1..=10i64 {
        let key = format!("r{:02}", i);
        store.insert(
            key.as_bytes(),
            &[("cf", "qty", int_value(i)), ("cf", "price", decimal_value(125 * i as i128, 2, 8))],
        );
    }
    store
}

fn projector() -> RowProjector {
    RowProjector::new(vec![
        ColumnProjector::column(qty()),
        ColumnProjector::new(
            "total",
            Expression::arithmetic(ArithmeticOp::Multiply, vec![Expression::column(qty()), Expression::column(price())])
                .unwrap(),
        ),
    ])
}

fn context(fetch_size: usize) -> StatementContext {
    StatementContext::new(ScanConfig::default().with_fetch_size(fetch_size))
}

fn plan(store: Arc<MemoryStore>, statement: FilterableStatement) -> Result<ScanPlan> {
    Ok(ScanPlan::new(TableRef::new("orders"), projector(), statement, context(3), store)?)
}

fn keys(plan: &ScanPlan) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    for tuple in plan.scanner() {
        keys.push(String::from_utf8(tuple?.key().to_vec())?);
    }
    Ok(keys)
}

#[test]
fn test_full_scan_with_projection() -> Result<()> {
    let plan = plan(shared(store()), FilterableStatement::new())?;

    let mut rows = Vec::new();
    for tuple in plan.scanner() {
        let tuple = tuple?;
        rows.push(plan.projector().project(&tuple.row())?);
    }
    assert_eq!(rows.len(), 10);

    let fourth = &rows[3];
    assert_eq!(fourth.get("cf.qty"), Some(&DataValue::Integer(4)));
    // 4 * 5.00
    assert_eq!(fourth.get("total"), Some(&DataValue::decimal(2000, 2)));
    assert_eq!(fourth.columns().collect::<Vec<_>>(), vec!["cf.qty", "total"]);
    Ok(())
}

/// `qty > 7` is pushed to the store and nothing is left to evaluate locally
#[test]
fn test_where_clause_is_pushed_down() -> Result<()> {
    let statement = FilterableStatement::new().with_where(
        ComparisonParseNode::greater_than(ParseNode::column(qty()), ParseNode::literal(DataValue::Integer(7))).into(),
    );
    let plan = plan(shared(store()), statement)?;
    assert_eq!(plan.filters().len(), 1);
    assert!(plan.residual().is_none());
    assert_eq!(keys(&plan)?, vec!["r08", "r09", "r10"]);

    // Same predicate, literal first
    let statement = FilterableStatement::new().with_where(
        ComparisonParseNode::less_than(ParseNode::literal(DataValue::Integer(7)), ParseNode::column(qty())).into(),
    );
    let flipped = self::plan(shared(store()), statement)?;
    assert_eq!(flipped.filters(), plan.filters());
    assert_eq!(keys(&flipped)?, vec!["r08", "r09", "r10"]);
    Ok(())
}

#[test]
fn test_residual_predicate_runs_locally() -> Result<()> {
    // price * 2 cannot be pushed, so the filter runs over every scanned row
    let doubled = ParseNode::arithmetic(
        ArithmeticOp::Multiply,
        vec![ParseNode::column(price()), ParseNode::literal(DataValue::Integer(2))],
    );
    let statement = FilterableStatement::new()
        .with_where(ComparisonParseNode::less_or_equal(doubled, ParseNode::literal(DataValue::decimal(75, 1))).into());
    let plan = plan(shared(store()), statement)?;
    assert!(plan.filters().is_empty());
    assert!(plan.residual().is_some());
    assert_eq!(keys(&plan)?, vec!["r01", "r02", "r03"]);
    Ok(())
}

#[test]
fn test_limit_stops_early() -> Result<()> {
    let plan = plan(shared(store()), FilterableStatement::new().with_limit(4))?;
    assert_eq!(plan.limit(), Some(4));
    assert_eq!(keys(&plan)?, vec!["r01", "r02", "r03", "r04"]);

    let none = self::plan(shared(store()), FilterableStatement::new().with_limit(0))?;
    assert!(keys(&none)?.is_empty());
    Ok(())
}

/// Splits given out of order still produce rows in key order
#[test]
fn test_splits_merge_in_key_order() -> Result<()> {
    let store = shared(store());
    let splits = vec![
        KeyRange::new("r07", true, "", false),
        KeyRange::half_open("r01", "r04"),
        KeyRange::half_open("r04", "r07"),
    ];
    let plan = plan(store.clone(), FilterableStatement::new().with_limit(8))?.with_splits(splits.clone());
    assert_eq!(plan.splits(), splits.as_slice());

    let expected: Vec<String> = (1..=8).map(|i| format!("r{:02}", i)).collect();
    assert_eq!(keys(&plan)?, expected);
    assert_eq!(store.opened(), 3);
    Ok(())
}

#[test]
fn test_fetch_failure_then_aborted() -> Result<()> {
    let mut failing = store();
    failing.fail_on_fetch = Some(2);
    let plan = plan(shared(failing), FilterableStatement::new())?;

    let mut rows = plan.scanner();
    // The first fetch of three rows succeeds
    for expected in ["r01", "r02", "r03"] {
        assert_eq!(rows.next().unwrap()?.key(), expected.as_bytes());
    }
    match rows.next() {
        Some(Err(QueryError::ScanAdvanceFailure(reason))) => assert!(reason.contains("lease expired")),
        other => panic!("expected a scan failure, got {:?}", other),
    }
    assert_eq!(rows.next(), Some(Err(QueryError::ScanAborted)));
    assert_eq!(rows.next(), Some(Err(QueryError::ScanAborted)));
    Ok(())
}

#[test]
fn test_open_failure_is_deferred() -> Result<()> {
    let mut offline = store();
    offline.fail_open = true;
    let plan = plan(shared(offline), FilterableStatement::new())?;

    let mut rows = plan.scanner();
    match rows.next() {
        Some(Err(QueryError::ScanAdvanceFailure(reason))) => assert!(reason.contains("offline")),
        other => panic!("expected a scan failure, got {:?}", other),
    }
    assert_eq!(rows.next(), Some(Err(QueryError::ScanAborted)));
    Ok(())
}

/// Every call to `scanner` starts a fresh pass
#[test]
fn test_scanner_restarts() -> Result<()> {
    let store = shared(store());
    let plan = plan(store.clone(), FilterableStatement::new())?;

    let mut first = plan.scanner();
    assert_eq!(first.next().unwrap()?.key(), b"r01");
    assert_eq!(first.next().unwrap()?.key(), b"r02");
    drop(first);

    assert_eq!(keys(&plan)?.len(), 10);
    assert_eq!(store.opened(), 2);
    Ok(())
}

#[test]
fn test_plan_accessors() -> Result<()> {
    let statement = FilterableStatement::new().with_limit(5).with_distinct(true);
    let plan = ScanPlan::new(
        TableRef::new("orders").with_alias("o"),
        projector(),
        statement.clone(),
        context(50),
        shared(store()),
    )?
    .with_order_by(OrderBy::Unordered);

    assert_eq!(plan.table_ref().effective_name(), "o");
    assert_eq!(plan.projector().column_count(), 2);
    assert_eq!(plan.statement(), &statement);
    assert_eq!(plan.context().config().fetch_size, 50);
    assert!(plan.order_by().is_unordered());
    assert!(plan.group_by().is_empty());
    assert_eq!(plan.splits(), &[KeyRange::EVERYTHING]);
    assert_eq!(plan.projector().referenced_columns(), vec![qty(), price()]);
    Ok(())
}

#[test]
fn test_non_boolean_where_is_rejected() {
    let statement = FilterableStatement::new().with_where(ParseNode::arithmetic(
        ArithmeticOp::Add,
        vec![ParseNode::column(qty()), ParseNode::literal(DataValue::Integer(1))],
    ));
    let result = ScanPlan::new(TableRef::new("orders"), projector(), statement, context(3), shared(store()));
    assert!(matches!(result, Err(QueryError::PlanningError(_))));
}
