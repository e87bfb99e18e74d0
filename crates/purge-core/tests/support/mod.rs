#![allow(dead_code)]

pub mod store;

use purge_core::commands::DeleteConfirmer;
use purge_core::stream::{PathSet, collect_paths};

pub use store::ScriptedStore;

/// Confirmer that records what it was shown and answers `answer`.
pub struct RecordingConfirmer {
    pub answer: bool,
    pub shown: Option<Vec<String>>,
}

impl RecordingConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            shown: None,
        }
    }
}

impl DeleteConfirmer for RecordingConfirmer {
    fn confirm(&mut self, paths: &PathSet) -> anyhow::Result<bool> {
        self.shown = Some(collect_paths(paths.reader()?)?);
        Ok(self.answer)
    }
}

/// Confirmer whose prompt cannot be shown.
pub struct BrokenConfirmer;

impl DeleteConfirmer for BrokenConfirmer {
    fn confirm(&mut self, _paths: &PathSet) -> anyhow::Result<bool> {
        anyhow::bail!("not a terminal")
    }
}
