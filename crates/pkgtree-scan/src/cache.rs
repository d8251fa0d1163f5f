//! Snapshot cell holding the most recently built tree.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use pkgtree_core::DirectoryNode;

use crate::progress::BuildProgress;

/// One complete, immutable build result.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: DirectoryNode,
    built_at: SystemTime,
    progress: BuildProgress,
}

impl Snapshot {
    /// Stamp `root` with the current time.
    pub fn new(root: DirectoryNode, progress: BuildProgress) -> Self {
        Self {
            root,
            built_at: SystemTime::now(),
            progress,
        }
    }

    /// Root of the tree.
    pub fn root(&self) -> &DirectoryNode {
        &self.root
    }

    /// When the build finished.
    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    /// Statistics of the build that produced this snapshot.
    pub fn progress(&self) -> &BuildProgress {
        &self.progress
    }

    /// Find a node by absolute path.
    pub fn lookup(&self, path: &str) -> Option<&DirectoryNode> {
        self.root.lookup(path)
    }
}

#[derive(Debug, Default)]
struct Cell {
    snapshot: Option<Arc<Snapshot>>,
    version: u64,
}

/// Versioned cell with single-writer, multi-reader access.
///
/// Readers get an `Arc` to a whole snapshot and keep it as long as they
/// like; installing a new snapshot never disturbs them.
#[derive(Debug, Default)]
pub struct TreeCache {
    cell: RwLock<Cell>,
}

impl TreeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest snapshot, if any build has completed.
    pub fn get(&self) -> Option<Arc<Snapshot>> {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// Replace the current snapshot wholesale and return its version.
    pub fn install(&self, snapshot: Snapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let mut cell = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        cell.snapshot = Some(snapshot);
        cell.version += 1;
        cell.version
    }

    /// Number of snapshots installed so far.
    pub fn version(&self) -> u64 {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Check if no snapshot has been installed.
    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgtree_core::RootType;

    fn tree(synopsis: &str) -> DirectoryNode {
        let mut root = DirectoryNode::new(0, "/", "/", "/", RootType::Unknown);
        let mut fmt = DirectoryNode::new(2, "/src/fmt", "fmt", "fmt", RootType::Standard);
        fmt.has_pkg = true;
        fmt.synopsis = synopsis.to_string();
        let mut src = DirectoryNode::new(1, "/src", "src", "/src", RootType::Standard);
        src.children.push(fmt);
        root.children.push(src);
        root
    }

    #[test]
    fn test_empty_cache() {
        let cache = TreeCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.version(), 0);
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let cache = TreeCache::new();
        assert_eq!(cache.install(Snapshot::new(tree("Old."), BuildProgress::default())), 1);

        let before = cache.get().unwrap();
        assert_eq!(cache.install(Snapshot::new(tree("New."), BuildProgress::default())), 2);

        assert_eq!(before.lookup("/src/fmt").unwrap().synopsis, "Old.");
        let after = cache.get().unwrap();
        assert_eq!(after.lookup("/src/fmt").unwrap().synopsis, "New.");
        assert!(after.built_at() >= before.built_at());
    }

    #[test]
    fn test_concurrent_readers_see_complete_trees() {
        let cache = Arc::new(TreeCache::new());
        cache.install(Snapshot::new(tree("v0"), BuildProgress::default()));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = cache.get().unwrap();
                        assert_eq!(snapshot.root().iter(false).count(), 3);
                    }
                })
            })
            .collect();

        for i in 1..50 {
            cache.install(Snapshot::new(tree(&format!("v{i}")), BuildProgress::default()));
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(cache.version(), 50);
    }
}
