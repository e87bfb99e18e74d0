//! Reusable, disk-or-memory backed path sets.
//!
//! A [`PathSetWriter`] buffers records in memory until a threshold is hit,
//! then moves everything to an anonymous temp file (one JSON record per
//! line). The finished [`PathSet`] can be read any number of times; each
//! [`PathSetReader`] is a single-pass [`PathStream`].

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{NamedTempFile, TempPath};

use super::PathStream;
use crate::error::StreamError;
use crate::types::PathRecord;

/// Records kept in memory before a writer spills to disk.
pub const DEFAULT_SPILL_THRESHOLD: usize = 50_000;

/// Incrementally builds a [`PathSet`].
pub struct PathSetWriter {
    threshold: usize,
    buffer: Vec<PathRecord>,
    spill: Option<SpillFile>,
    len: usize,
}

struct SpillFile {
    path: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl SpillFile {
    fn create() -> Result<Self, StreamError> {
        let file = NamedTempFile::new().map_err(|source| StreamError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        Ok(Self {
            path: file.path().to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn write(&mut self, record: &PathRecord) -> Result<(), StreamError> {
        serde_json::to_writer(&mut self.writer, record).map_err(StreamError::Encode)?;
        self.writer
            .write_all(b"\n")
            .map_err(|source| StreamError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn finish(self) -> Result<TempPath, StreamError> {
        let path = self.path;
        let file = self.writer.into_inner().map_err(|e| StreamError::Io {
            path: path.clone(),
            source: e.into_error(),
        })?;
        Ok(file.into_temp_path())
    }
}

impl PathSetWriter {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SPILL_THRESHOLD)
    }

    /// A threshold of 0 is treated as 1.
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            buffer: Vec::new(),
            spill: None,
            len: 0,
        }
    }

    pub fn push(&mut self, record: PathRecord) -> Result<(), StreamError> {
        if let Some(spill) = self.spill.as_mut() {
            spill.write(&record)?;
        } else {
            self.buffer.push(record);
            if self.buffer.len() >= self.threshold {
                self.spill_buffer()?;
            }
        }
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn spill_buffer(&mut self) -> Result<(), StreamError> {
        let mut spill = SpillFile::create()?;
        for record in self.buffer.drain(..) {
            spill.write(&record)?;
        }
        tracing::debug!(path = %spill.path.display(), "spilled path records to disk");
        self.spill = Some(spill);
        Ok(())
    }

    pub fn finish(self) -> Result<PathSet, StreamError> {
        let backing = match self.spill {
            Some(spill) => Backing::Disk(Arc::new(spill.finish()?)),
            None => Backing::Memory(Arc::from(self.buffer)),
        };
        Ok(PathSet {
            len: self.len,
            backing,
        })
    }
}

impl Default for PathSetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// A finished set of path records that can be read more than once.
#[derive(Debug)]
pub struct PathSet {
    len: usize,
    backing: Backing,
}

#[derive(Debug)]
enum Backing {
    Memory(Arc<[PathRecord]>),
    Disk(Arc<TempPath>),
}

impl PathSet {
    pub fn empty() -> Self {
        Self {
            len: 0,
            backing: Backing::Memory(Arc::from(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Location of the spill file, if the set lives on disk.
    pub fn spill_path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Memory(_) => None,
            Backing::Disk(temp) => {
                let path: &Path = temp;
                Some(path)
            }
        }
    }

    /// Open a new single-pass reader over the set.
    pub fn reader(&self) -> Result<PathSetReader, StreamError> {
        let source = match &self.backing {
            Backing::Memory(records) => ReaderSource::Memory {
                records: Arc::clone(records),
                position: 0,
            },
            Backing::Disk(temp) => {
                let path = temp.to_path_buf();
                let file = File::open(&path).map_err(|source| StreamError::Io {
                    path: path.clone(),
                    source,
                })?;
                ReaderSource::Disk {
                    _file: Arc::clone(temp),
                    lines: BufReader::new(file).lines(),
                    line: 0,
                    path,
                }
            }
        };
        Ok(PathSetReader { source })
    }

    /// Release the backing storage now.
    ///
    /// The spill file outlives this call while readers are still open; it is
    /// removed when the last one is dropped.
    pub fn close(self) -> Result<(), StreamError> {
        match self.backing {
            Backing::Memory(_) => Ok(()),
            Backing::Disk(temp) => match Arc::try_unwrap(temp) {
                Ok(temp) => {
                    let path = temp.to_path_buf();
                    temp.close()
                        .map_err(|source| StreamError::Io { path, source })
                }
                Err(_) => Ok(()),
            },
        }
    }
}

/// Single-pass reader over a [`PathSet`].
pub struct PathSetReader {
    source: ReaderSource,
}

enum ReaderSource {
    Memory {
        records: Arc<[PathRecord]>,
        position: usize,
    },
    Disk {
        _file: Arc<TempPath>,
        lines: Lines<BufReader<File>>,
        line: usize,
        path: PathBuf,
    },
}

impl PathStream for PathSetReader {
    fn next_record(&mut self) -> Result<Option<PathRecord>, StreamError> {
        match &mut self.source {
            ReaderSource::Memory { records, position } => {
                let record = records.get(*position).cloned();
                if record.is_some() {
                    *position += 1;
                }
                Ok(record)
            }
            ReaderSource::Disk {
                lines, line, path, ..
            } => loop {
                let Some(next) = lines.next() else {
                    return Ok(None);
                };
                let text = next.map_err(|source| StreamError::Io {
                    path: path.clone(),
                    source,
                })?;
                *line += 1;
                if text.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str(&text)
                    .map_err(|source| StreamError::Decode {
                        line: *line,
                        source,
                    })?;
                return Ok(Some(record));
            },
        }
    }
}
