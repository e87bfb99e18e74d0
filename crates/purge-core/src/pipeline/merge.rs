//! K-way merge of sorted path streams.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::StreamError;
use crate::stream::PathStream;
use crate::types::PathRecord;

/// Head record of one input, waiting in the merge heap.
///
/// Ordering is reversed so `BinaryHeap` pops the smallest path first; equal
/// paths pop in input order, which keeps the merge stable.
#[derive(Debug)]
struct Pending {
    record: PathRecord,
    source: usize,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .record
            .cmp_path(&self.record)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Lazy union of several sorted streams, in path order.
///
/// Inputs are borrowed: dropping the merged stream frees its heap but leaves
/// every input open for its owner to release. At most one record per input
/// is held in memory. Duplicates across inputs are kept.
pub struct MergedStream<'a, S: ?Sized> {
    inputs: Vec<&'a mut S>,
    heap: BinaryHeap<Pending>,
}

impl<'a, S: PathStream + ?Sized> MergedStream<'a, S> {
    /// Prime the merge with the first record of every input.
    ///
    /// On error nothing is consumed beyond the failing read, and the inputs
    /// remain the caller's to close.
    pub fn new<I>(inputs: I) -> Result<Self, StreamError>
    where
        I: IntoIterator<Item = &'a mut S>,
    {
        let mut inputs: Vec<&'a mut S> = inputs.into_iter().collect();
        let mut heap = BinaryHeap::with_capacity(inputs.len());
        for (source, input) in inputs.iter_mut().enumerate() {
            if let Some(record) = input.next_record()? {
                heap.push(Pending { record, source });
            }
        }
        Ok(Self { inputs, heap })
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

impl<S: PathStream + ?Sized> PathStream for MergedStream<'_, S> {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        let Some(Pending { record, source }) = self.heap.pop() else {
            return Ok(None);
        };
        if let Some(next) = self.inputs[source].next_record()? {
            self.heap.push(Pending {
                record: next,
                source,
            });
        }
        Ok(Some(record))
    }
}
