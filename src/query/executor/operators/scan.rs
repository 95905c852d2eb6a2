// Scan Operator
//
// This module implements the scan operator that pulls raw records from the
// store in batches and turns them into validated row tuples.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::common::config::ScanConfig;
use crate::query::executor::operators::Operator;
use crate::query::executor::result::{QueryError, QueryResult, ResultTuple};

/// A source of scan-shaped records in store key order
pub trait ScanSource: Send {
    /// Fetch up to `max_records` records. An empty batch means the scan is
    /// exhausted.
    fn fetch(&mut self, max_records: usize) -> anyhow::Result<Vec<Vec<u8>>>;

    /// Release the server-side scanner
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Open,
    Exhausted,
    Failed,
}

/// Scan operator over a [`ScanSource`]
pub struct ScanOperator {
    /// Name used in log lines
    label: String,
    source: Box<dyn ScanSource>,
    config: ScanConfig,
    /// Records fetched but not yet returned
    buffered: VecDeque<Vec<u8>>,
    /// Key of the last returned row, kept when verifying key order
    last_key: Option<Vec<u8>>,
    state: ScanState,
    rows_returned: usize,
    initialized: bool,
}

impl ScanOperator {
    pub fn new(label: impl Into<String>, source: Box<dyn ScanSource>, config: ScanConfig) -> Self {
        ScanOperator {
            label: label.into(),
            source,
            config,
            buffered: VecDeque::new(),
            last_key: None,
            state: ScanState::Open,
            rows_returned: 0,
            initialized: false,
        }
    }

    pub fn rows_returned(&self) -> usize {
        self.rows_returned
    }

    fn fail(&mut self, err: QueryError) -> QueryError {
        warn!("Scan {} failed after {} rows: {}", self.label, self.rows_returned, err);
        self.state = ScanState::Failed;
        self.buffered.clear();
        err
    }

    /// Refill the buffer, marking the scan exhausted on an empty batch
    fn fill_buffer(&mut self) -> QueryResult<()> {
        match self.source.fetch(self.config.fetch_size) {
            Ok(batch) if batch.is_empty() => {
                debug!("Scan {} exhausted after {} rows", self.label, self.rows_returned);
                self.state = ScanState::Exhausted;
                Ok(())
            }
            Ok(batch) => {
                trace!("Scan {} fetched {} records", self.label, batch.len());
                self.buffered.extend(batch);
                Ok(())
            }
            Err(e) => Err(self.fail(QueryError::ScanAdvanceFailure(format!("{:#}", e)))),
        }
    }

    fn check_order(&mut self, tuple: &ResultTuple) -> QueryResult<()> {
        if !self.config.verify_key_order {
            return Ok(());
        }
        if let Some(last) = &self.last_key {
            if last.as_slice() > tuple.key() {
                let reason = format!(
                    "key {} returned after {}",
                    hex::encode(tuple.key()),
                    hex::encode(last)
                );
                return Err(self.fail(QueryError::ScanAdvanceFailure(reason)));
            }
        }
        self.last_key = Some(tuple.key().to_vec());
        Ok(())
    }
}

impl Operator for ScanOperator {
    fn init(&mut self) -> QueryResult<()> {
        if !self.initialized {
            debug!(
                "Opening scan {} with fetch size {}",
                self.label, self.config.fetch_size
            );
            self.initialized = true;
        }
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ResultTuple>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }

        loop {
            match self.state {
                ScanState::Failed => return Err(QueryError::ScanAborted),
                ScanState::Exhausted if self.buffered.is_empty() => return Ok(None),
                _ => {}
            }

            let Some(bytes) = self.buffered.pop_front() else {
                self.fill_buffer()?;
                continue;
            };

            let tuple = match ResultTuple::new(bytes) {
                Ok(tuple) => tuple,
                Err(e) => return Err(self.fail(e.into())),
            };
            self.check_order(&tuple)?;
            self.rows_returned += 1;
            return Ok(Some(tuple));
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        if !self.initialized {
            return Ok(());
        }
        debug!("Closing scan {} after {} rows", self.label, self.rows_returned);
        self.initialized = false;
        self.buffered.clear();
        self.source
            .close()
            .map_err(|e| QueryError::ExecutionError(format!("Failed to close scan {}: {:#}", self.label, e)))
    }
}
