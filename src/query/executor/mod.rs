// Query Executor Module
//
// This module is responsible for executing query plans and producing results.
// It implements the iterator-based execution model for query processing.

pub mod operators;
pub mod result;
pub mod type_conversion;

// Export key types
pub use self::operators::Operator;
pub use self::result::{DataValue, QueryError, QueryResult, ResultTuple};
