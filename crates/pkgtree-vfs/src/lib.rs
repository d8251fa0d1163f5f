//! Virtual filesystem implementations for pkgtree.
//!
//! Both filesystems expose slash-separated absolute paths rooted at `/`:
//!
//! - [`OsFs`] mounts a host directory at the virtual root.
//! - [`MapFs`] serves an in-memory map of file paths to contents, with
//!   directories implied by the paths of the files they contain.
//!
//! ```rust
//! use pkgtree_core::FileSystem;
//! use pkgtree_vfs::MapFs;
//!
//! let fs = MapFs::new([("src/fmt/print.go", "package fmt")]);
//! assert!(fs.stat("/src/fmt").unwrap().is_dir);
//! ```

mod map;
mod os;

use pkgtree_core::RootType;

pub use map::MapFs;
pub use os::OsFs;

/// Root types assigned to path prefixes; the longest matching prefix wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct RootTypes {
    default: RootType,
    prefixes: Vec<(String, RootType)>,
}

impl RootTypes {
    /// Type for paths no prefix covers.
    pub fn set_default(&mut self, root_type: RootType) {
        self.default = root_type;
    }

    /// Classify `prefix` and everything below it.
    pub fn insert(&mut self, prefix: &str, root_type: RootType) {
        let prefix = prefix.trim_matches('/').to_string();
        self.prefixes.retain(|(p, _)| *p != prefix);
        self.prefixes.push((prefix, root_type));
    }

    pub fn classify(&self, path: &str) -> RootType {
        let path = path.trim_matches('/');
        self.prefixes
            .iter()
            .filter(|(prefix, _)| within(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(self.default, |(_, root_type)| *root_type)
    }
}

/// Whether normalized `path` equals `prefix` or lies below it.
fn within(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Last segment of a virtual path; `/` for the root.
pub(crate) fn base_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(pkgtree_core::ROOT)
}
