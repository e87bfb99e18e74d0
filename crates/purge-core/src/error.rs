//! Error types for the deletion pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing a path stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error on spill file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode path record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("corrupt path record at line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("paths are not sorted: '{current}' arrived after '{previous}'")]
    Unsorted { previous: String, current: String },
}

/// Failure before any deletion was attempted. No partial result exists.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to resolve filter '{pattern}': {source}")]
    Resolution {
        pattern: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to merge path streams: {0}")]
    Merge(#[source] StreamError),

    #[error("failed to reduce merged paths: {0}")]
    Reduce(#[source] StreamError),

    #[error("failed to open paths to delete: {0}")]
    Spill(#[source] StreamError),

    #[error("delete confirmation failed: {0}")]
    Confirm(#[source] anyhow::Error),
}

/// Result of a single delete call against the store.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// This path could not be deleted; the run continues.
    #[error("failed to delete '{path}': {reason}")]
    Item { path: String, reason: String },

    /// The store is unusable; no further deletions should be dispatched.
    #[error("store unavailable: {0}")]
    Fatal(String),
}

impl DeleteError {
    pub fn item(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Item {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn fatal(reason: impl ToString) -> Self {
        Self::Fatal(reason.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Error that stopped a deletion run early.
#[derive(Debug, Error)]
pub enum FatalExecutionError {
    #[error("store unavailable: {0}")]
    Remote(String),

    #[error("failed to read paths to delete: {0}")]
    Stream(#[source] StreamError),

    #[error("delete worker failed: {0}")]
    Worker(String),
}
