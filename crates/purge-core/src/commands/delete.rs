//! Delete command implementation.
//!
//! Resolves every filter, merges and reduces the results, asks for
//! confirmation and then deletes the reduced paths concurrently.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::confirm::DeleteConfirmer;
use crate::error::PipelineError;
use crate::filter::FilterSpec;
use crate::pipeline::{
    DEFAULT_THREADS, DeleteExecutor, ExecutionReport, MergedStream, reduce_top_chain,
};
use crate::remote::{PathResolver, RemoteDeleter};
use crate::stream::{DEFAULT_SPILL_THRESHOLD, PathSet, PathSetWriter, PathStream};

/// Options for the delete command
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// One resolved stream per filter
    pub filters: Vec<FilterSpec>,
    /// Maximum concurrent delete calls
    pub threads: usize,
    /// Skip the confirmation prompt
    pub quiet: bool,
    /// Log what would be deleted without deleting
    pub dry_run: bool,
}

impl DeleteOptions {
    pub fn new(filters: impl IntoIterator<Item = FilterSpec>) -> Self {
        Self {
            filters: filters.into_iter().collect(),
            threads: DEFAULT_THREADS,
            quiet: false,
            dry_run: false,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Report from a delete run
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Paths left after reduction
    pub total: usize,
    /// Whether deletion went ahead
    pub confirmed: bool,
    pub execution: ExecutionReport,
}

impl DeleteReport {
    fn skipped(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}

/// Delete command orchestrator
pub struct DeleteCommand {
    resolver: Arc<dyn PathResolver>,
    deleter: Arc<dyn RemoteDeleter>,
    spill_threshold: usize,
}

impl DeleteCommand {
    pub fn new(resolver: Arc<dyn PathResolver>, deleter: Arc<dyn RemoteDeleter>) -> Self {
        Self {
            resolver,
            deleter,
            spill_threshold: DEFAULT_SPILL_THRESHOLD,
        }
    }

    /// Reduced paths beyond `threshold` are buffered in a temp file.
    pub fn with_spill_threshold(mut self, threshold: usize) -> Self {
        self.spill_threshold = threshold;
        self
    }

    /// Resolve, merge and reduce `filters` into the set of paths to delete.
    ///
    /// Streams opened before a failure are dropped before returning.
    pub async fn paths_to_delete(&self, filters: &[FilterSpec]) -> Result<PathSet, PipelineError> {
        let mut streams: Vec<Box<dyn PathStream>> = Vec::with_capacity(filters.len());
        for filter in filters {
            let stream = self
                .resolver
                .resolve(filter)
                .await
                .map_err(|source| PipelineError::Resolution {
                    pattern: filter.pattern().to_string(),
                    source,
                })?;
            debug!(pattern = filter.pattern(), "opened path stream");
            streams.push(stream);
        }

        let merged = MergedStream::new(streams.iter_mut()).map_err(PipelineError::Merge)?;
        let writer = PathSetWriter::with_threshold(self.spill_threshold);
        let paths = reduce_top_chain(merged, writer).map_err(PipelineError::Reduce)?;
        info!(filters = filters.len(), paths = paths.len(), "collected paths to delete");
        Ok(paths)
    }

    /// Execute the delete command
    ///
    /// Errors mean nothing was deleted. Failures during deletion are reported
    /// through [`DeleteReport::execution`].
    pub async fn execute(
        &self,
        options: &DeleteOptions,
        confirmer: &mut dyn DeleteConfirmer,
    ) -> Result<DeleteReport, PipelineError> {
        let paths = self.paths_to_delete(&options.filters).await?;
        let total = paths.len();

        if paths.is_empty() {
            info!("No paths matched, nothing to delete");
            return Ok(DeleteReport::skipped(0));
        }

        if !options.quiet {
            let confirmed = confirmer.confirm(&paths).map_err(PipelineError::Confirm)?;
            if !confirmed {
                info!(paths = total, "Delete cancelled");
                release(paths);
                return Ok(DeleteReport::skipped(total));
            }
        }

        let reader = paths.reader().map_err(PipelineError::Spill)?;
        let executor = DeleteExecutor::new(Arc::clone(&self.deleter), options.threads)
            .with_dry_run(options.dry_run);
        let execution = executor.run_with_total(reader, total).await;
        release(paths);

        Ok(DeleteReport {
            total,
            confirmed: true,
            execution,
        })
    }
}

fn release(paths: PathSet) {
    if let Err(e) = paths.close() {
        warn!(error = %e, "failed to remove spill file");
    }
}
