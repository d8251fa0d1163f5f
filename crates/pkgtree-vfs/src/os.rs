//! Host filesystem mounted at the virtual root.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use pkgtree_core::{FileInfo, FileSystem, RootType, split_path};

use crate::{RootTypes, base_name};

/// A host directory served under `/`.
#[derive(Debug, Clone)]
pub struct OsFs {
    root: PathBuf,
    root_types: RootTypes,
}

impl OsFs {
    /// Mount `root` at the virtual root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            root_types: RootTypes::default(),
        }
    }

    /// Classify every path of this mount as `root_type`, unless a
    /// prefix set with [`with_root_type_under`](Self::with_root_type_under)
    /// covers it.
    pub fn with_root_type(mut self, root_type: RootType) -> Self {
        self.root_types.set_default(root_type);
        self
    }

    /// Classify virtual path `prefix` and everything below it as
    /// `root_type`. The longest matching prefix wins.
    pub fn with_root_type_under(mut self, prefix: &str, root_type: RootType) -> Self {
        self.root_types.insert(prefix, root_type);
        self
    }

    /// Host directory backing the virtual root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path onto the host filesystem.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in split_path(path) {
            match segment {
                "." => {}
                ".." => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes mount: {path}"),
                    ));
                }
                _ => resolved.push(segment),
            }
        }
        Ok(resolved)
    }
}

impl FileSystem for OsFs {
    fn stat(&self, path: &str) -> io::Result<FileInfo> {
        let metadata = std::fs::metadata(self.resolve(path)?)?;
        Ok(FileInfo {
            name: base_name(path).into(),
            is_dir: metadata.is_dir(),
        })
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<FileInfo>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(self.resolve(path)?)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                debug!(dir = %path, name = ?entry.file_name(), "skipping non-UTF-8 entry");
                continue;
            };
            // Symlinks are listed as non-directories, like lstat.
            let is_dir = entry.file_type()?.is_dir();
            entries.push(FileInfo {
                name: name.into(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path)?)
    }

    fn root_type(&self, path: &str) -> RootType {
        self.root_types.classify(path)
    }
}
