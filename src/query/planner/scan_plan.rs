// Scan Plan
//
// The concrete query plan: a key-range scan of one table with pushed-down
// column filters, a residual predicate and an optional limit.

use std::slice;
use std::sync::Arc;

use log::debug;

use crate::query::executor::operators::{create_filter, create_limit, create_merge, Operator, ScanOperator, ScanSource};
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::expression::Expression;
use crate::query::parser::ast::{DataType, FilterableStatement};
use crate::query::planner::descriptors::{GroupBy, OrderBy, StatementContext, TableRef};
use crate::query::planner::plan::{QueryPlan, RowSequence};
use crate::query::planner::projector::RowProjector;
use crate::query::planner::pushdown::{ColumnFilter, PushdownCompiler};
use crate::query::planner::range::KeyRange;

/// Opens scans against the store
pub trait ScanSourceFactory: Send + Sync {
    /// Open a scan over `ranges` of `table`, applying `filters` server side
    fn open(&self, table: &TableRef, ranges: &[KeyRange], filters: &[ColumnFilter]) -> anyhow::Result<Box<dyn ScanSource>>;
}

pub struct ScanPlan {
    table: TableRef,
    projector: RowProjector,
    factory: Arc<dyn ScanSourceFactory>,
    statement: FilterableStatement,
    context: StatementContext,
    splits: Vec<KeyRange>,
    order_by: OrderBy,
    group_by: GroupBy,
    filters: Vec<ColumnFilter>,
    residual: Option<Expression>,
}

impl ScanPlan {
    /// Build a plan for `statement`, binding its WHERE clause and pushing
    /// down what the store can evaluate
    pub fn new(
        table: TableRef,
        projector: RowProjector,
        statement: FilterableStatement,
        context: StatementContext,
        factory: Arc<dyn ScanSourceFactory>,
    ) -> QueryResult<Self> {
        let predicate = statement.where_clause.as_ref().map(Expression::bind).transpose()?;
        if let Some(found) = predicate.as_ref().and_then(Expression::data_type) {
            if found != DataType::Boolean {
                return Err(QueryError::PlanningError(format!("WHERE clause must be boolean, found {}", found)));
            }
        }
        let (filters, residual) = PushdownCompiler::new().partition(predicate);

        debug!(
            "Planned scan of {} with {} pushed filters and {} residual predicate",
            table.name,
            filters.len(),
            if residual.is_some() { "a" } else { "no" }
        );

        Ok(ScanPlan {
            table,
            projector,
            factory,
            statement,
            context,
            splits: vec![KeyRange::EVERYTHING],
            order_by: OrderBy::RowKey,
            group_by: GroupBy::default(),
            filters,
            residual,
        })
    }

    /// Replace the key ranges, as supplied by the key-range splitter
    pub fn with_splits(mut self, splits: Vec<KeyRange>) -> Self {
        self.splits = splits;
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    pub fn residual(&self) -> Option<&Expression> {
        self.residual.as_ref()
    }

    fn open_segment(&self, range: &KeyRange) -> QueryResult<Box<dyn Operator>> {
        let source = self
            .factory
            .open(&self.table, slice::from_ref(range), &self.filters)
            .map_err(|e| QueryError::ScanAdvanceFailure(format!("{:#}", e)))?;
        let label = format!("{} {}", self.table.effective_name(), range);
        Ok(Box::new(ScanOperator::new(label, source, self.context.config().clone())))
    }

    fn build(&self) -> QueryResult<Box<dyn Operator>> {
        let mut segments = self
            .splits
            .iter()
            .map(|range| self.open_segment(range))
            .collect::<QueryResult<Vec<_>>>()?;

        // Each segment is key-ordered, so merging keeps the whole scan in key order
        let mut root = if segments.len() == 1 {
            segments.remove(0)
        } else {
            create_merge(segments)
        };

        if let Some(predicate) = &self.residual {
            root = create_filter(root, predicate.clone());
        }
        if let Some(limit) = self.limit() {
            root = create_limit(root, limit);
        }
        Ok(root)
    }
}

impl QueryPlan for ScanPlan {
    fn scanner(&self) -> RowSequence {
        match self.build() {
            Ok(root) => RowSequence::new(root),
            Err(e) => RowSequence::failed(e),
        }
    }

    fn table_ref(&self) -> &TableRef {
        &self.table
    }

    fn projector(&self) -> &RowProjector {
        &self.projector
    }

    fn limit(&self) -> Option<usize> {
        self.statement.limit
    }

    fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    fn group_by(&self) -> &GroupBy {
        &self.group_by
    }

    fn splits(&self) -> &[KeyRange] {
        &self.splits
    }

    fn context(&self) -> &StatementContext {
        &self.context
    }

    fn statement(&self) -> &FilterableStatement {
        &self.statement
    }
}
