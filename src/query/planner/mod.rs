// Query Planner Module
//
// This module is responsible for the plan contract handed to the execution
// layer: key ranges, projection, ordering and grouping descriptors, filter
// pushdown and the concrete scan plan.

pub mod descriptors;
pub mod plan;
pub mod projector;
pub mod pushdown;
pub mod range;
pub mod scan_plan;

// Export key types
pub use self::descriptors::{GroupBy, OrderBy, OrderByExpression, StatementContext, TableRef};
pub use self::plan::{QueryPlan, RowSequence};
pub use self::projector::{ColumnProjector, RowProjector};
pub use self::pushdown::{ColumnFilter, PushdownCompiler};
pub use self::range::KeyRange;
pub use self::scan_plan::{ScanPlan, ScanSourceFactory};
