//! Merge, reduce and delete stages of the deletion pipeline.

pub mod executor;
pub mod merge;
pub mod outcome;
pub mod reduce;

pub use executor::{DEFAULT_THREADS, DeleteExecutor};
pub use merge::MergedStream;
pub use outcome::{DeletionOutcome, ExecutionReport};
pub use reduce::{TopChainReducer, reduce_top_chain};
