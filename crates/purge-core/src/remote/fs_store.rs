//! A store backed by a local directory tree.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{PathResolver, RemoteDeleter};
use crate::error::DeleteError;
use crate::filter::{FilterMatcher, FilterSpec};
use crate::stream::{DEFAULT_SPILL_THRESHOLD, PathSet, PathSetWriter, PathStream};
use crate::types::PathRecord;

/// Store paths are the `/`-joined paths of entries relative to `root`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    spill_threshold: usize,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            spill_threshold: DEFAULT_SPILL_THRESHOLD,
        }
    }

    /// Matches beyond `threshold` are buffered on disk while resolving.
    pub fn with_spill_threshold(mut self, threshold: usize) -> Self {
        self.spill_threshold = threshold;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PathResolver for FsStore {
    async fn resolve(&self, filter: &FilterSpec) -> anyhow::Result<Box<dyn PathStream>> {
        if filter.includes_dependencies() {
            warn!(
                pattern = filter.pattern(),
                "include-deps has no effect on a directory store"
            );
        }
        if filter.excludes_artifacts() {
            warn!(
                pattern = filter.pattern(),
                "exclude-artifacts has no effect on a directory store"
            );
        }

        let matcher = filter.matcher()?;
        let root = self.root.clone();
        let threshold = self.spill_threshold;
        let set = tokio::task::spawn_blocking(move || scan(&root, &matcher, threshold))
            .await
            .context("Path resolution task failed")??;
        debug!(pattern = filter.pattern(), matched = set.len(), "resolved filter");

        let reader = set.reader()?;
        Ok(Box::new(reader))
    }
}

#[async_trait]
impl RemoteDeleter for FsStore {
    async fn delete(&self, record: &PathRecord) -> Result<(), DeleteError> {
        let rel = record.path().to_string();
        ensure_relative_path(&rel).map_err(|e| DeleteError::item(&rel, e))?;

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || remove_entry(&root, &rel))
            .await
            .map_err(|e| DeleteError::fatal(format!("Delete task failed: {e}")))?
    }
}

fn scan(root: &Path, matcher: &FilterMatcher, threshold: usize) -> anyhow::Result<PathSet> {
    if !root.is_dir() {
        anyhow::bail!("Store root is not a directory: {}", root.display());
    }
    let mut scan = Scan {
        matcher,
        pending: Vec::new(),
        writer: PathSetWriter::with_threshold(threshold),
    };
    scan.walk(root, "", false)?;
    scan.flush()?;
    Ok(scan.writer.finish()?)
}

/// Depth-first walk state.
///
/// A matching folder is emitted in place of its contents only when every
/// entry below it is selected too. Until that is known, records under it wait
/// in `pending`; everywhere else they go straight to the writer.
struct Scan<'a> {
    matcher: &'a FilterMatcher,
    pending: Vec<PathRecord>,
    writer: PathSetWriter,
}

impl Scan<'_> {
    /// Walks `dir` with entries sorted by name and returns whether every
    /// entry below it was selected.
    ///
    /// Visiting a folder's subtree before its next sibling yields records
    /// already in segment order, so nothing needs sorting afterwards.
    fn walk(&mut self, dir: &Path, base: &str, held: bool) -> anyhow::Result<bool> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let mut sorted_entries: Vec<_> = entries
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read directory entries: {}", dir.display()))?;
        sorted_entries.sort_by_key(|e| e.file_name());

        let mut complete = true;
        for entry in sorted_entries {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(path = %entry.path().display(), "skipping entry with non UTF-8 name");
                complete = false;
                continue;
            };
            let rel_path = if base.is_empty() {
                name.to_string()
            } else {
                format!("{base}/{name}")
            };

            let ty = entry
                .file_type()
                .with_context(|| format!("Failed to stat file: {}", entry.path().display()))?;

            if ty.is_dir() {
                let candidate = self.matcher.matches(&rel_path);
                let mark = self.pending.len();
                let whole = self.walk(&entry.path(), &rel_path, held || candidate)?;
                if candidate && whole {
                    self.pending.truncate(mark);
                    self.pending.push(PathRecord::folder(&rel_path));
                } else {
                    complete = false;
                }
            } else if self.matcher.matches(&rel_path) {
                let mut record = PathRecord::file(&rel_path);
                if ty.is_file()
                    && let Ok(metadata) = entry.metadata()
                {
                    record = record.with_size(metadata.len());
                }
                self.pending.push(record);
            } else {
                complete = false;
            }

            if !held {
                self.flush()?;
            }
        }
        Ok(complete)
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        for record in self.pending.drain(..) {
            self.writer.push(record)?;
        }
        Ok(())
    }
}

fn remove_entry(root: &Path, rel: &str) -> Result<(), DeleteError> {
    if !root.is_dir() {
        return Err(DeleteError::fatal(format!(
            "Store root is not accessible: {}",
            root.display()
        )));
    }
    let target = root.join(rel);
    let metadata = fs::symlink_metadata(&target).map_err(|e| DeleteError::item(rel, e))?;
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(&target)
    } else {
        fs::remove_file(&target)
    };
    removed.map_err(|e| DeleteError::item(rel, e))
}

fn ensure_relative_path(rel: &str) -> anyhow::Result<()> {
    if rel.is_empty() {
        anyhow::bail!("Refusing to delete the store root");
    }
    for component in Path::new(rel).components() {
        match component {
            Component::ParentDir => {
                anyhow::bail!("Path traversal is not allowed in delete paths");
            }
            Component::Prefix(_) | Component::RootDir => {
                anyhow::bail!("Absolute paths are not allowed in delete paths");
            }
            _ => {}
        }
    }
    Ok(())
}
