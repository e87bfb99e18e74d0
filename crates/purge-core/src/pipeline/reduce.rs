//! Top-chain reduction: drop paths already covered by an emitted ancestor.
//!
//! Deleting `a` removes `a/b` too, and asking the store to delete both at
//! once makes one of the calls fail. Input must be sorted with
//! [`compare_paths`], which puts every subtree directly after its root, so
//! remembering the last emitted path is enough to know whether a record is
//! covered.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::StreamError;
use crate::stream::{PathSet, PathSetWriter, PathStream};
use crate::types::{PathRecord, compare_paths};

/// Lazy reducer over a sorted upstream stream.
///
/// Exact duplicates are dropped along with descendants. Closing the reducer
/// releases the upstream only when it was passed by value; pass `&mut
/// stream` to keep ownership.
pub struct TopChainReducer<S> {
    upstream: S,
    last_emitted: Option<String>,
    last_seen: Option<String>,
    dropped: usize,
}

impl<S: PathStream> TopChainReducer<S> {
    pub fn new(upstream: S) -> Self {
        Self {
            upstream,
            last_emitted: None,
            last_seen: None,
            dropped: 0,
        }
    }

    /// Records skipped so far because an ancestor was already emitted.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_inner(self) -> S {
        self.upstream
    }

    fn check_order(&mut self, record: &PathRecord) -> Result<(), StreamError> {
        match &mut self.last_seen {
            Some(previous) => {
                if compare_paths(record.path(), previous) == Ordering::Less {
                    return Err(StreamError::Unsorted {
                        previous: previous.clone(),
                        current: record.path().to_string(),
                    });
                }
                previous.clear();
                previous.push_str(record.path());
            }
            None => self.last_seen = Some(record.path().to_string()),
        }
        Ok(())
    }
}

impl<S: PathStream> PathStream for TopChainReducer<S> {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        while let Some(record) = self.upstream.next_record()? {
            self.check_order(&record)?;
            if let Some(last) = &self.last_emitted
                && record.is_covered_by(last)
            {
                trace!(path = record.path(), ancestor = %last, "dropping covered path");
                self.dropped += 1;
                continue;
            }
            self.last_emitted = Some(record.path().to_string());
            return Ok(Some(record));
        }
        Ok(None)
    }
}

/// Reduce `upstream` into a reusable [`PathSet`].
///
/// On error the partially written set is discarded together with its spill
/// file.
pub fn reduce_top_chain<S: PathStream>(
    upstream: S,
    mut writer: PathSetWriter,
) -> Result<PathSet, StreamError> {
    let mut reducer = TopChainReducer::new(upstream);
    while let Some(record) = reducer.next_record()? {
        writer.push(record)?;
    }
    debug!(
        kept = writer.len(),
        dropped = reducer.dropped(),
        "reduced top-chain paths"
    );
    writer.finish()
}
