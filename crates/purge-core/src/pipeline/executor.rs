//! Bounded-concurrency deletion of a reduced path stream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::outcome::{DeletionOutcome, ExecutionReport};
use crate::error::{DeleteError, FatalExecutionError};
use crate::remote::RemoteDeleter;
use crate::stream::PathStream;
use crate::types::PathRecord;

/// Worker count used when none is configured.
pub const DEFAULT_THREADS: usize = 3;

/// Deletes every record of a stream with up to `threads` calls in flight.
///
/// The reduced stream guarantees no two records are in an ancestor/child
/// relation, so workers never need to coordinate beyond taking the next
/// record.
pub struct DeleteExecutor {
    deleter: Arc<dyn RemoteDeleter>,
    threads: usize,
    dry_run: bool,
}

impl DeleteExecutor {
    /// `threads` of 0 is treated as 1.
    pub fn new(deleter: Arc<dyn RemoteDeleter>, threads: usize) -> Self {
        Self {
            deleter,
            threads: threads.max(1),
            dry_run: false,
        }
    }

    /// Log and count every record as deleted without calling the store.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Consume `stream` and delete everything in it.
    ///
    /// Per-item failures are counted and the run goes on. A fatal error stops
    /// dispatch: deletions already in flight finish, and whatever is left in
    /// the stream is counted as not attempted. The stream is dropped before
    /// this returns.
    pub async fn run<S>(&self, stream: S) -> ExecutionReport
    where
        S: PathStream + 'static,
    {
        self.execute(stream, None).await
    }

    /// Like [`run`](Self::run) for a stream known to hold `total` records.
    ///
    /// After a fatal error the records left unread are counted from `total`
    /// instead of by reading the rest of the stream.
    pub async fn run_with_total<S>(&self, stream: S, total: usize) -> ExecutionReport
    where
        S: PathStream + 'static,
    {
        self.execute(stream, Some(total)).await
    }

    async fn execute<S>(&self, stream: S, total: Option<usize>) -> ExecutionReport
    where
        S: PathStream + 'static,
    {
        let shared = Arc::new(Shared::new(stream, total));

        let mut workers = JoinSet::new();
        for worker_id in 0..self.threads {
            let shared = Arc::clone(&shared);
            let deleter = Arc::clone(&self.deleter);
            let dry_run = self.dry_run;
            workers.spawn(async move {
                worker_loop(worker_id, shared, deleter, dry_run).await;
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "delete worker terminated abnormally");
                shared.halt(FatalExecutionError::Worker(e.to_string()));
            }
        }

        let report = shared.finish();
        info!(
            succeeded = report.outcome.success_count(),
            failed = report.outcome.fail_count(),
            not_attempted = report.not_attempted,
            "delete run finished"
        );
        report
    }
}

struct Cursor<S> {
    stream: S,
    halted: bool,
    fatal: Option<FatalExecutionError>,
}

/// State shared by all workers of one run.
struct Shared<S> {
    cursor: Mutex<Cursor<S>>,
    total: Option<usize>,
    dispatched: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    not_attempted: AtomicUsize,
}

impl<S: PathStream> Shared<S> {
    fn new(stream: S, total: Option<usize>) -> Self {
        Self {
            cursor: Mutex::new(Cursor {
                stream,
                halted: false,
                fatal: None,
            }),
            total,
            dispatched: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            not_attempted: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cursor<S>> {
        // a panicking worker must not hide the counters from the others
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the next record, unless the stream is exhausted or the run halted.
    fn next(&self) -> Option<PathRecord> {
        let mut cursor = self.lock();
        if cursor.halted {
            return None;
        }
        match cursor.stream.next_record() {
            Ok(Some(record)) => {
                self.dispatched.fetch_add(1, Ordering::Relaxed);
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "failed to read next path to delete");
                cursor.halted = true;
                cursor.fatal.get_or_insert(FatalExecutionError::Stream(e));
                None
            }
        }
    }

    /// Stop dispatching. The first fatal error wins.
    fn halt(&self, fatal: FatalExecutionError) {
        let mut cursor = self.lock();
        cursor.halted = true;
        cursor.fatal.get_or_insert(fatal);
    }

    /// Collect the counters once every worker is done.
    fn finish(&self) -> ExecutionReport {
        let mut cursor = self.lock();
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let mut not_attempted = self.not_attempted.load(Ordering::Relaxed);

        // records handed to a worker that died before answering
        let dispatched = self.dispatched.load(Ordering::Relaxed);
        not_attempted += dispatched.saturating_sub(succeeded + failed + not_attempted);

        let stream_broken = matches!(cursor.fatal, Some(FatalExecutionError::Stream(_)));
        if let Some(total) = self.total
            && cursor.halted
        {
            not_attempted = total.saturating_sub(succeeded + failed);
        } else if cursor.halted && !stream_broken {
            loop {
                match cursor.stream.next_record() {
                    Ok(Some(_)) => not_attempted += 1,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "could not count remaining paths");
                        break;
                    }
                }
            }
        }

        ExecutionReport {
            outcome: DeletionOutcome::new(succeeded, failed),
            not_attempted,
            fatal: cursor.fatal.take(),
        }
    }
}

async fn worker_loop<S: PathStream>(
    worker_id: usize,
    shared: Arc<Shared<S>>,
    deleter: Arc<dyn RemoteDeleter>,
    dry_run: bool,
) {
    while let Some(record) = shared.next() {
        if dry_run {
            info!("[Dry run] Deleting: {record}");
            shared.succeeded.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        debug!(worker = worker_id, path = %record, "deleting");
        match deleter.delete(&record).await {
            Ok(()) => {
                info!("Deleted: {record}");
                shared.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(err @ DeleteError::Item { .. }) => {
                warn!(worker = worker_id, error = %err, "delete failed");
                shared.failed.fetch_add(1, Ordering::Relaxed);
            }
            Err(DeleteError::Fatal(reason)) => {
                error!(
                    worker = worker_id,
                    path = %record,
                    %reason,
                    "store unavailable, stopping"
                );
                shared.not_attempted.fetch_add(1, Ordering::Relaxed);
                shared.halt(FatalExecutionError::Remote(reason));
                break;
            }
        }
    }
}
