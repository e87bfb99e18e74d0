use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use purge_core::error::{DeleteError, StreamError};
use purge_core::filter::FilterSpec;
use purge_core::remote::{PathResolver, RemoteDeleter};
use purge_core::stream::{MemoryStream, PathStream};
use purge_core::types::PathRecord;

/// Stream that counts its own drops and can fail on its first read.
pub struct TrackedStream {
    inner: MemoryStream,
    broken: bool,
    dropped: Arc<AtomicUsize>,
}

impl PathStream for TrackedStream {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        if self.broken {
            return Err(StreamError::Io {
                path: PathBuf::from("search-results"),
                source: io::Error::new(io::ErrorKind::ConnectionReset, "stream reset"),
            });
        }
        self.inner.next_record()
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store double: canned resolution per pattern, scripted delete results.
///
/// Every resolved stream is a [`TrackedStream`], so tests can check that
/// `opened() == dropped()` on every exit path.
#[derive(Default)]
pub struct ScriptedStore {
    pub resolved: HashMap<String, Vec<&'static str>>,
    /// Records returned in the given order, without sorting
    pub unsorted: HashMap<String, Vec<&'static str>>,
    /// Patterns whose stream fails on its first read
    pub broken: HashSet<String>,
    pub unresolvable: HashSet<String>,
    pub failing: HashSet<String>,
    pub fatal_after: Option<usize>,
    pub calls: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
    pub opened: AtomicUsize,
    pub dropped: Arc<AtomicUsize>,
}

impl ScriptedStore {
    pub fn with_stream(mut self, pattern: &str, paths: &[&'static str]) -> Self {
        self.resolved.insert(pattern.to_string(), paths.to_vec());
        self
    }

    pub fn with_unsorted_stream(mut self, pattern: &str, paths: &[&'static str]) -> Self {
        self.unsorted.insert(pattern.to_string(), paths.to_vec());
        self
    }

    pub fn with_broken_stream(mut self, pattern: &str) -> Self {
        self.broken.insert(pattern.to_string());
        self
    }

    pub fn unresolvable(mut self, pattern: &str) -> Self {
        self.unresolvable.insert(pattern.to_string());
        self
    }

    pub fn failing_on(mut self, paths: &[&str]) -> Self {
        self.failing.extend(paths.iter().map(|p| p.to_string()));
        self
    }

    pub fn deleted(&self) -> Vec<String> {
        let mut deleted = self.deleted.lock().unwrap().clone();
        deleted.sort();
        deleted
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PathResolver for ScriptedStore {
    async fn resolve(&self, filter: &FilterSpec) -> anyhow::Result<Box<dyn PathStream>> {
        if self.unresolvable.contains(filter.pattern()) {
            anyhow::bail!("search failed for {}", filter.pattern());
        }
        let pattern = filter.pattern();
        let inner = match self.unsorted.get(pattern) {
            Some(paths) => MemoryStream::new(paths.iter().map(|p| PathRecord::file(*p))),
            None => {
                MemoryStream::sorted_files(self.resolved.get(pattern).cloned().unwrap_or_default())
            }
        };
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedStream {
            inner,
            broken: self.broken.contains(pattern),
            dropped: Arc::clone(&self.dropped),
        }))
    }
}

#[async_trait]
impl RemoteDeleter for ScriptedStore {
    async fn delete(&self, record: &PathRecord) -> Result<(), DeleteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fatal_after.is_some_and(|limit| call >= limit) {
            return Err(DeleteError::fatal("connection reset"));
        }
        if self.failing.contains(record.path()) {
            return Err(DeleteError::item(record.path(), "403 Forbidden"));
        }
        self.deleted.lock().unwrap().push(record.path().to_string());
        Ok(())
    }
}
