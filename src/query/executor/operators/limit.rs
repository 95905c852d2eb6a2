// Limit Operator
//
// Stops the pipeline after a fixed number of rows.

use crate::query::executor::operators::Operator;
use crate::query::executor::result::{QueryError, QueryResult, ResultTuple};

pub struct LimitOperator {
    input: Box<dyn Operator>,
    limit: usize,
    returned: usize,
    initialized: bool,
}

impl LimitOperator {
    pub fn new(input: Box<dyn Operator>, limit: usize) -> Self {
        LimitOperator {
            input,
            limit,
            returned: 0,
            initialized: false,
        }
    }
}

impl Operator for LimitOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        self.returned = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ResultTuple>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        // Do not pull from the input once the limit is reached
        if self.returned >= self.limit {
            return Ok(None);
        }
        let row = self.input.next()?;
        if row.is_some() {
            self.returned += 1;
        }
        Ok(row)
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.input.close()
    }
}
