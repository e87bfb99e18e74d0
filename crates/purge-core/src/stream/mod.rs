//! Single-pass path streams.
//!
//! A [`PathStream`] hands out [`PathRecord`]s one at a time, in path order,
//! and cannot be rewound. Whoever owns a stream owns the resources behind it:
//! dropping the stream releases them, whichever way the owner exits.
//! Borrowing a stream (`&mut S` is itself a stream) leaves ownership, and the
//! duty to release, with the lender.

pub mod spill;

use std::collections::VecDeque;

use crate::error::StreamError;
use crate::types::PathRecord;

pub use spill::{DEFAULT_SPILL_THRESHOLD, PathSet, PathSetReader, PathSetWriter};

/// A lazily produced, ordered, single-pass sequence of path records.
pub trait PathStream: Send {
    /// Next record, or `None` once the stream is exhausted.
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError>;

    /// Iterate over the remaining records.
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records { stream: self }
    }
}

impl<S: PathStream + ?Sized> PathStream for &mut S {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        (**self).next_record()
    }
}

impl<S: PathStream + ?Sized> PathStream for Box<S> {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        (**self).next_record()
    }
}

/// Iterator adapter returned by [`PathStream::records`].
pub struct Records<'a, S> {
    stream: &'a mut S,
}

impl<S: PathStream> Iterator for Records<'_, S> {
    type Item = Result<PathRecord, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next_record().transpose()
    }
}

/// In-memory stream, mostly for small results and tests.
///
/// Records are handed out in the order given; the caller is responsible for
/// sorting them.
#[derive(Debug, Default)]
pub struct MemoryStream {
    records: VecDeque<PathRecord>,
}

impl MemoryStream {
    pub fn new(records: impl IntoIterator<Item = PathRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Build a stream of file records, sorted by path.
    pub fn sorted_files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut records: Vec<PathRecord> = paths.into_iter().map(PathRecord::file).collect();
        records.sort_by(PathRecord::cmp_path);
        Self::new(records)
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl PathStream for MemoryStream {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        Ok(self.records.pop_front())
    }
}

/// Drain a stream and return its paths. Test and diagnostics helper.
pub fn collect_paths<S: PathStream>(mut stream: S) -> Result<Vec<String>, StreamError> {
    stream
        .records()
        .map(|record| record.map(|r| r.path().to_string()))
        .collect()
}
