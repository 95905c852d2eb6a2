// Expression Visitor
//
// Three-stage traversal over expression trees: enter, visit children in
// order, leave, and fall back to a default result when leave yields none.

use crate::query::expression::node::Expression;

pub trait ExpressionVisitor {
    type Output;

    /// Called before the children of `node`. Returning `false` skips them.
    fn visit_enter(&mut self, _node: &Expression) -> bool {
        true
    }

    /// Called after the children of `node` with their results, in order.
    /// Returning `None` defers to [`ExpressionVisitor::default_return`].
    fn visit_leave(&mut self, _node: &Expression, _child_results: &mut Vec<Self::Output>) -> Option<Self::Output> {
        None
    }

    fn default_return(&mut self, node: &Expression, child_results: Vec<Self::Output>) -> Self::Output;
}

impl Expression {
    /// Walk the tree with `visitor`
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V) -> V::Output {
        let mut results = Vec::new();
        if visitor.visit_enter(self) {
            match self {
                Expression::Literal(_) | Expression::ColumnRef(_) => {}
                Expression::Arithmetic(arith) => {
                    results.reserve(arith.children().len());
                    for child in arith.children() {
                        results.push(child.accept(visitor));
                    }
                }
                Expression::Comparison(cmp) => {
                    results.push(cmp.lhs().accept(visitor));
                    results.push(cmp.rhs().accept(visitor));
                }
            }
        }
        match visitor.visit_leave(self, &mut results) {
            Some(output) => output,
            None => visitor.default_return(self, results),
        }
    }
}
