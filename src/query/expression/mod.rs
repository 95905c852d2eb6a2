// Expression Module
//
// Typed scalar expressions over decoded rows: the node tree, numeric width
// inference, comparison operators, the visitor protocol and the column
// value codec.

pub mod codec;
pub mod compare;
pub mod evaluator;
pub mod node;
pub mod visitor;
pub mod width;

pub use self::compare::CompareOp;
pub use self::evaluator::{ColumnCollector, ExpressionFormatter, RowEvaluator};
pub use self::node::{ArithmeticOp, Expression};
pub use self::visitor::ExpressionVisitor;
pub use self::width::NumericWidth;
