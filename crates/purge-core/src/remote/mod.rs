//! Store collaborators used by the deletion pipeline.
//!
//! The pipeline never talks to a store directly. It asks a [`PathResolver`]
//! for the paths matching each filter and a [`RemoteDeleter`] to remove each
//! reduced path. [`FsStore`] implements both against a local directory.

pub mod fs_store;

use async_trait::async_trait;

use crate::error::DeleteError;
use crate::filter::FilterSpec;
use crate::stream::PathStream;
use crate::types::PathRecord;

pub use fs_store::FsStore;

/// Resolves one filter into an open stream of matching paths.
///
/// The returned stream must be sorted with [`crate::types::compare_paths`].
#[async_trait]
pub trait PathResolver: Send + Sync {
    async fn resolve(&self, filter: &FilterSpec) -> anyhow::Result<Box<dyn PathStream>>;
}

/// Deletes one path from the store.
///
/// Called concurrently from several workers. Timeouts and rejections should
/// come back as [`DeleteError::Item`]; [`DeleteError::Fatal`] stops the run.
#[async_trait]
pub trait RemoteDeleter: Send + Sync {
    async fn delete(&self, record: &PathRecord) -> Result<(), DeleteError>;
}
