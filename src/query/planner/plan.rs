// Query Plan Contract
//
// What every executable plan exposes, and the lazy row sequence it produces.

use log::{debug, warn};

use crate::query::executor::operators::Operator;
use crate::query::executor::result::{QueryError, QueryResult, ResultTuple};
use crate::query::parser::ast::FilterableStatement;
use crate::query::planner::descriptors::{GroupBy, OrderBy, StatementContext, TableRef};
use crate::query::planner::projector::RowProjector;
use crate::query::planner::range::KeyRange;

/// An executable query plan. Plans are read-only once built.
pub trait QueryPlan {
    /// Start a new pass over the plan's rows
    fn scanner(&self) -> RowSequence;

    fn table_ref(&self) -> &TableRef;

    fn projector(&self) -> &RowProjector;

    fn limit(&self) -> Option<usize>;

    fn order_by(&self) -> &OrderBy;

    fn group_by(&self) -> &GroupBy;

    /// Disjoint key ranges the scan is split into
    fn splits(&self) -> &[KeyRange];

    fn context(&self) -> &StatementContext;

    fn statement(&self) -> &FilterableStatement;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    NotStarted,
    Running,
    Done,
    Failed,
}

/// Forward-only, single-pass sequence of rows.
///
/// Nothing runs until the first call to `next`, and every error surfaces
/// there. After an error the sequence yields [`QueryError::ScanAborted`];
/// call [`QueryPlan::scanner`] again to retry.
pub struct RowSequence {
    root: Option<Box<dyn Operator>>,
    pending_error: Option<QueryError>,
    state: SequenceState,
}

impl RowSequence {
    pub fn new(root: Box<dyn Operator>) -> Self {
        RowSequence {
            root: Some(root),
            pending_error: None,
            state: SequenceState::NotStarted,
        }
    }

    /// A sequence whose first `next` reports `err`
    pub fn failed(err: QueryError) -> Self {
        RowSequence {
            root: None,
            pending_error: Some(err),
            state: SequenceState::NotStarted,
        }
    }

    fn fail(&mut self, err: QueryError) -> Option<QueryResult<ResultTuple>> {
        self.state = SequenceState::Failed;
        self.close_root();
        Some(Err(err))
    }

    fn close_root(&mut self) {
        if let Some(mut root) = self.root.take() {
            if let Err(e) = root.close() {
                warn!("Failed to close row sequence: {}", e);
            }
        }
    }
}

impl Iterator for RowSequence {
    type Item = QueryResult<ResultTuple>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            SequenceState::Failed => return Some(Err(QueryError::ScanAborted)),
            SequenceState::Done => return None,
            SequenceState::NotStarted => {
                if let Some(err) = self.pending_error.take() {
                    return self.fail(err);
                }
                let Some(root) = self.root.as_mut() else {
                    return self.fail(QueryError::ExecutionError("Row sequence has no operator".to_string()));
                };
                if let Err(e) = root.init() {
                    return self.fail(e);
                }
                self.state = SequenceState::Running;
            }
            SequenceState::Running => {}
        }

        let root = self.root.as_mut()?;
        match root.next() {
            Ok(Some(tuple)) => Some(Ok(tuple)),
            Ok(None) => {
                debug!("Row sequence exhausted");
                self.state = SequenceState::Done;
                self.close_root();
                None
            }
            Err(e) => self.fail(e),
        }
    }
}

impl Drop for RowSequence {
    fn drop(&mut self) {
        if self.state == SequenceState::Running {
            self.close_root();
        }
    }
}
