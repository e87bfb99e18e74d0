//! Confirmation step between reduction and deletion.

use std::io::Write;

use crate::stream::{PathSet, PathStream};

/// Decides whether a reduced set of paths may be deleted.
///
/// Only called with a non-empty set. Returning `Ok(false)` cancels the run
/// with nothing deleted.
pub trait DeleteConfirmer {
    fn confirm(&mut self, paths: &PathSet) -> anyhow::Result<bool>;
}

/// Confirms every set without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl DeleteConfirmer for AssumeYes {
    fn confirm(&mut self, _paths: &PathSet) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Write one indented line per path, folders with a trailing `/`.
pub fn write_path_list(paths: &PathSet, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut reader = paths.reader()?;
    while let Some(record) = reader.next_record()? {
        writeln!(out, "  {record}")?;
    }
    Ok(())
}
