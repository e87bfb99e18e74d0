//! Shared core types used by the streaming and deletion layers.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Path separator used by store paths.
pub const SEPARATOR: char = '/';

/// Kind of item a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A single artifact.
    #[default]
    File,
    /// A folder; deleting it removes everything below it.
    Folder,
}

/// One candidate item in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    path: String,
    #[serde(rename = "type", default)]
    item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

impl PathRecord {
    /// Create a record, trimming leading and trailing separators from `path`.
    pub fn new(path: impl AsRef<str>, item_type: ItemType) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            item_type,
            size: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn file(path: impl AsRef<str>) -> Self {
        Self::new(path, ItemType::File)
    }

    pub fn folder(path: impl AsRef<str>) -> Self {
        Self::new(path, ItemType::Folder)
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Order two records by path; see [`compare_paths`].
    pub fn cmp_path(&self, other: &Self) -> Ordering {
        compare_paths(&self.path, &other.path)
    }

    /// True when deleting `ancestor` also deletes this record.
    pub fn is_covered_by(&self, ancestor: &str) -> bool {
        is_covered_by(&self.path, ancestor)
    }
}

impl fmt::Display for PathRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_folder() {
            write!(f, "{}{}", self.path, SEPARATOR)
        } else {
            f.write_str(&self.path)
        }
    }
}

/// Compare two store paths segment by segment.
///
/// This is lexicographic order over the `/`-delimited segments, which is the
/// same as byte order with the separator sorting before every other byte.
/// Every path sorts directly before its whole subtree, so `a`, `a/b`,
/// `a.txt` is the order, never `a`, `a.txt`, `a/b`.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    a.split(SEPARATOR).cmp(b.split(SEPARATOR))
}

/// True when `path` equals `ancestor` or lies below it at a segment boundary.
///
/// `libs/a` is not covered by `lib`. The empty path is the store root and
/// covers everything.
pub fn is_covered_by(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

fn normalize_path(path: &str) -> String {
    path.trim_matches(SEPARATOR).to_string()
}
