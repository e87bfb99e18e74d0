//! Result accounting for a deletion run.

use serde::Serialize;

use crate::error::FatalExecutionError;

/// Final success/failure counters.
///
/// `success_count + fail_count` is the number of records that were submitted
/// to the store and came back with an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    success_count: usize,
    fail_count: usize,
}

impl DeletionOutcome {
    pub fn new(success_count: usize, fail_count: usize) -> Self {
        Self {
            success_count,
            fail_count,
        }
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn fail_count(&self) -> usize {
        self.fail_count
    }

    pub fn total(&self) -> usize {
        self.success_count + self.fail_count
    }
}

/// What the executor did with a reduced stream.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub outcome: DeletionOutcome,
    /// Records never answered because a fatal error stopped the run.
    pub not_attempted: usize,
    pub fatal: Option<FatalExecutionError>,
}

impl ExecutionReport {
    /// No fatal error and no failed item.
    pub fn is_success(&self) -> bool {
        self.fatal.is_none() && self.outcome.fail_count() == 0
    }
}
