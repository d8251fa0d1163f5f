//! In-memory filesystem built from a map of paths to contents.

use std::collections::BTreeMap;
use std::io;

use compact_str::CompactString;

use pkgtree_core::{FileInfo, FileSystem, RootType};

use crate::{RootTypes, base_name};

/// Files keyed by slash-separated path; directories are implied.
///
/// Keys may be written with or without a leading `/`.
#[derive(Debug, Clone, Default)]
pub struct MapFs {
    files: BTreeMap<String, Vec<u8>>,
    root_types: RootTypes,
}

/// Strip leading and trailing slashes: `/src/a/` becomes `src/a`.
fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path}: not found"))
}

impl MapFs {
    /// Build a filesystem from `(path, contents)` pairs.
    pub fn new<K, V>(files: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let files = files
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()).to_string(), v.as_ref().to_vec()))
            .collect();
        Self {
            files,
            root_types: RootTypes::default(),
        }
    }

    /// Classify `prefix` and everything below it as `root_type`.
    ///
    /// The longest matching prefix wins.
    pub fn with_root_type(mut self, prefix: &str, root_type: RootType) -> Self {
        self.root_types.insert(prefix, root_type);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, contents: impl AsRef<[u8]>) {
        self.files
            .insert(normalize(path).to_string(), contents.as_ref().to_vec());
    }

    /// Files strictly below directory `dir` (already normalized).
    fn files_under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.files.keys().filter_map(move |key| {
            if dir.is_empty() {
                Some(key.as_str())
            } else {
                key.strip_prefix(dir)?.strip_prefix('/')
            }
        })
    }

    fn is_dir(&self, dir: &str) -> bool {
        dir.is_empty() || self.files_under(dir).next().is_some()
    }
}

impl FileSystem for MapFs {
    fn stat(&self, path: &str) -> io::Result<FileInfo> {
        let key = normalize(path);
        let is_dir = if self.files.contains_key(key) {
            false
        } else if self.is_dir(key) {
            true
        } else {
            return Err(not_found(path));
        };
        Ok(FileInfo {
            name: base_name(path).into(),
            is_dir,
        })
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<FileInfo>> {
        let dir = normalize(path);
        if !self.is_dir(dir) {
            return Err(not_found(path));
        }

        let mut entries: BTreeMap<CompactString, bool> = BTreeMap::new();
        for rest in self.files_under(dir) {
            match rest.split_once('/') {
                Some((child, _)) => {
                    entries.insert(child.into(), true);
                }
                None => {
                    entries.entry(rest.into()).or_insert(false);
                }
            }
        }

        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| FileInfo { name, is_dir })
            .collect())
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn root_type(&self, path: &str) -> RootType {
        self.root_types.classify(path)
    }
}
