// SQL Parser Module
//
// The syntax boundary of the evaluation core. Parse nodes arrive here from
// the SQL front end and are bound into typed expressions.

pub mod ast;

// Export key types
pub use self::ast::{ColumnReference, ComparisonParseNode, DataType, FilterableStatement, ParseNode};
