// Filter Operator Implementation
//
// This module implements the filter operator for filtering rows based on predicates.

use log::trace;

use crate::query::executor::operators::Operator;
use crate::query::executor::result::{QueryError, QueryResult, ResultTuple};
use crate::query::expression::Expression;

/// Filter operator that keeps rows whose predicate evaluates to true
pub struct FilterOperator {
    /// The input operator
    input: Box<dyn Operator>,
    /// The predicate to evaluate
    predicate: Expression,
    /// Whether the operator is initialized
    initialized: bool,
}

impl FilterOperator {
    /// Create a new filter operator
    pub fn new(input: Box<dyn Operator>, predicate: Expression) -> Self {
        FilterOperator {
            input,
            predicate,
            initialized: false,
        }
    }

    pub fn predicate(&self) -> &Expression {
        &self.predicate
    }
}

impl Operator for FilterOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        self.initialized = true;
        Ok(())
    }

    /// Get the next row that satisfies the predicate
    fn next(&mut self) -> QueryResult<Option<ResultTuple>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }

        while let Some(tuple) = self.input.next()? {
            if self.predicate.evaluate_predicate(&tuple.row())? {
                return Ok(Some(tuple));
            }
            trace!("Row {} rejected by {}", hex::encode(tuple.key()), self.predicate);
        }
        Ok(None)
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.input.close()
    }
}
