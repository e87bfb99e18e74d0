//! Purge Core Library
//!
//! Bulk deletion of paths from a repository store: each filter resolves to
//! a sorted path stream, the streams are merged, paths already covered by
//! a selected ancestor folder are dropped, and the remaining paths are
//! deleted with bounded concurrency.

pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod remote;
pub mod stream;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{
        AssumeYes, DeleteCommand, DeleteConfirmer, DeleteOptions, DeleteReport,
    };

    // Configuration
    pub use crate::config::{ConfigLayers, ConfigScope, ConfigStore, PurgeConfig};

    // Errors
    pub use crate::error::{DeleteError, FatalExecutionError, PipelineError, StreamError};

    // Filters and records
    pub use crate::filter::FilterSpec;
    pub use crate::types::{ItemType, PathRecord};

    // Pipeline
    pub use crate::pipeline::{DeleteExecutor, DeletionOutcome, ExecutionReport};

    // Store collaborators
    pub use crate::remote::{FsStore, PathResolver, RemoteDeleter};

    // Streams
    pub use crate::stream::{PathSet, PathStream};
}
