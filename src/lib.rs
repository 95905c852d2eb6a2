// Cellscan Evaluation Engine

pub mod common;
pub mod query;
pub mod storage;

// Re-export key items for convenient access
pub use common::config::ScanConfig;
pub use query::executor::result::{DataValue, QueryError, QueryResult, ResultTuple};
pub use query::expression::{CompareOp, Expression};
pub use query::planner::{KeyRange, QueryPlan, ScanPlan};
pub use storage::row::{RecordError, RowBuffer};
