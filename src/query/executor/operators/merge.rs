// Merge Sort Operator
//
// Merges several key-ordered inputs, such as the segments of a split scan,
// into a single key-ordered stream.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;

use crate::query::executor::operators::Operator;
use crate::query::executor::result::{QueryError, QueryResult, ResultTuple};
use crate::storage::row::compare_keys;

/// Head row of one input
struct HeapEntry {
    tuple: ResultTuple,
    input: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for smallest key first, ties by input
        compare_keys(&self.tuple.row(), &other.tuple.row())
            .then(self.input.cmp(&other.input))
            .reverse()
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

pub struct MergeSortOperator {
    inputs: Vec<Box<dyn Operator>>,
    heap: BinaryHeap<HeapEntry>,
    initialized: bool,
}

impl MergeSortOperator {
    pub fn new(inputs: Vec<Box<dyn Operator>>) -> Self {
        MergeSortOperator {
            inputs,
            heap: BinaryHeap::new(),
            initialized: false,
        }
    }

    fn pull(&mut self, input: usize) -> QueryResult<()> {
        if let Some(tuple) = self.inputs[input].next()? {
            self.heap.push(HeapEntry { tuple, input });
        }
        Ok(())
    }
}

impl Operator for MergeSortOperator {
    fn init(&mut self) -> QueryResult<()> {
        debug!("Merging {} ordered inputs", self.inputs.len());
        self.heap.clear();
        for input in &mut self.inputs {
            input.init()?;
        }
        for i in 0..self.inputs.len() {
            self.pull(i)?;
        }
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ResultTuple>> {
        if !self.initialized {
            return Err(QueryError::ExecutionError("Operator not initialized".to_string()));
        }
        let Some(HeapEntry { tuple, input }) = self.heap.pop() else {
            return Ok(None);
        };
        self.pull(input)?;
        Ok(Some(tuple))
    }

    fn close(&mut self) -> QueryResult<()> {
        self.initialized = false;
        self.heap.clear();
        let mut first_error = None;
        for input in &mut self.inputs {
            if let Err(e) = input.close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
