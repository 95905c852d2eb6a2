// Query Processing Module
//
// Expression binding and evaluation, the plan contract and the execution
// operators that run over decoded rows.

pub mod executor;
pub mod expression;
pub mod parser;
pub mod planner;

// Export key public interfaces
pub use executor::result::{QueryError, QueryResult};
pub use expression::Expression;
pub use planner::QueryPlan;
