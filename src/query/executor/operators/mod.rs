// Query Operators Module
//
// This module defines the operators used for query execution in the
// iterator-based execution model. Rows flow between operators as owned
// scan-shaped tuples.

pub mod filter;
pub mod limit;
pub mod merge;
pub mod scan;

use crate::query::executor::result::{QueryResult, ResultTuple};
use crate::query::expression::Expression;

pub use self::filter::FilterOperator;
pub use self::limit::LimitOperator;
pub use self::merge::MergeSortOperator;
pub use self::scan::{ScanOperator, ScanSource};

/// The Operator trait defines the interface for all query execution operators
/// in the iterator-based execution model. Each operator processes tuples and
/// passes them to the next operator in the execution plan.
pub trait Operator: Send {
    /// Initialize the operator before execution
    fn init(&mut self) -> QueryResult<()>;

    /// Get the next row of data from this operator
    fn next(&mut self) -> QueryResult<Option<ResultTuple>>;

    /// Close the operator and release any resources
    fn close(&mut self) -> QueryResult<()>;
}

// Factory functions for creating operators
pub fn create_filter(input: Box<dyn Operator>, predicate: Expression) -> Box<dyn Operator> {
    Box::new(FilterOperator::new(input, predicate))
}

pub fn create_limit(input: Box<dyn Operator>, limit: usize) -> Box<dyn Operator> {
    Box::new(LimitOperator::new(input, limit))
}

pub fn create_merge(inputs: Vec<Box<dyn Operator>>) -> Box<dyn Operator> {
    Box::new(MergeSortOperator::new(inputs))
}
