// Plan Descriptors
//
// The table, ordering, grouping and context descriptors a query plan carries.

use crate::common::config::ScanConfig;
use crate::query::expression::Expression;

/// Table reference in FROM clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        TableRef {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name columns are qualified with
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpression {
    pub expression: Expression,
    pub ascending: bool,
    pub nulls_last: bool,
}

/// Row order a plan promises
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrderBy {
    /// No order promised
    #[default]
    Unordered,
    /// Rows come back in row key order
    RowKey,
    /// Rows are sorted by the given terms
    Expressions(Vec<OrderByExpression>),
}

impl OrderBy {
    pub fn is_unordered(&self) -> bool {
        matches!(self, OrderBy::Unordered)
    }
}

/// Grouping a plan applies, empty when the query does not group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupBy {
    pub expressions: Vec<Expression>,
}

impl GroupBy {
    pub fn new(expressions: Vec<Expression>) -> Self {
        GroupBy { expressions }
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// Per-statement execution context
#[derive(Debug, Clone, Default)]
pub struct StatementContext {
    config: ScanConfig,
}

impl StatementContext {
    pub fn new(config: ScanConfig) -> Self {
        StatementContext { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }
}
