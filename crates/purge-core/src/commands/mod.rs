//! High-level commands for purge operations.
//!
//! Frontends build options, supply the store collaborators and a confirmer,
//! and render the returned report.

pub mod confirm;
pub mod delete;

pub use confirm::{AssumeYes, DeleteConfirmer, write_path_list};
pub use delete::{DeleteCommand, DeleteOptions, DeleteReport};
