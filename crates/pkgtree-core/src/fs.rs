//! Filesystem capability consumed by the tree builder.

use std::io;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::RootType;

/// The virtual root path.
pub const ROOT: &str = "/";

/// Name and kind of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Entry name (not full path).
    pub name: CompactString,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl FileInfo {
    /// Describe a directory.
    pub fn dir(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    /// Describe a regular file.
    pub fn file(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

/// Read-only view of a slash-separated virtual filesystem.
///
/// Implementations are called from blocking worker threads, so they may
/// perform ordinary synchronous I/O.
pub trait FileSystem: Send + Sync + 'static {
    /// Describe the entry at `path`, following symlinks.
    fn stat(&self, path: &str) -> io::Result<FileInfo>;

    /// List the entries of the directory at `path`.
    fn read_dir(&self, path: &str) -> io::Result<Vec<FileInfo>>;

    /// Read the contents of the file at `path`.
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Classify which source root `path` belongs to.
    fn root_type(&self, path: &str) -> RootType;
}
