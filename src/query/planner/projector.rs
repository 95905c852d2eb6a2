// Row Projector
//
// Turns a scanned row into the ordered output columns of a query.

use crate::query::executor::result::{ProjectedRow, QueryResult};
use crate::query::expression::Expression;
use crate::query::parser::ast::ColumnReference;
use crate::storage::row::RowBuffer;

/// One output column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProjector {
    name: String,
    expression: Expression,
}

impl ColumnProjector {
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        ColumnProjector {
            name: name.into(),
            expression,
        }
    }

    /// Project a column reference under its `family.qualifier` name
    pub fn column(column: ColumnReference) -> Self {
        ColumnProjector::new(column.name(), Expression::column(column))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowProjector {
    columns: Vec<ColumnProjector>,
}

impl RowProjector {
    pub fn new(columns: Vec<ColumnProjector>) -> Self {
        RowProjector { columns }
    }

    pub fn columns(&self) -> &[ColumnProjector] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Evaluate every output column against `row`, in projection order
    pub fn project(&self, row: &RowBuffer<'_>) -> QueryResult<ProjectedRow> {
        let mut projected = ProjectedRow::new();
        for column in &self.columns {
            projected.set(column.name.clone(), column.expression.evaluate(row)?);
        }
        Ok(projected)
    }

    /// Distinct store columns read by any output column
    pub fn referenced_columns(&self) -> Vec<ColumnReference> {
        let mut columns: Vec<ColumnReference> = Vec::new();
        for column in self.columns.iter().flat_map(|c| c.expression.referenced_columns()) {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}
