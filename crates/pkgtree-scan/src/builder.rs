//! Concurrent, depth-bounded package tree builder.

use std::io;
use std::sync::Arc;

use compact_str::CompactString;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use pkgtree_core::{
    BuildConfig, BuildError, DirectoryNode, FileInfo, FileSystem, PackageSummarizer, ROOT,
};

use crate::classify::{self, SRC_PREFIX, TESTDATA_DIR, is_pkg_dir, is_pkg_file, join};
use crate::gate::Gates;
use crate::parse::{PackageClause, parse_package_clause};
use crate::progress::{BuildProgress, BuildStats};
use crate::synopsis::{Priority, SynopsisSelector};

/// Builds a pruned tree of package directories.
///
/// Each directory is listed through the I/O gate. Subdirectories are
/// scanned on spawned tasks while worker slots are free and inline
/// otherwise. Failures never propagate past the directory they occur in:
/// the directory or file simply drops out of the result.
pub struct TreeBuilder {
    fs: Arc<dyn FileSystem>,
    summarizer: Option<Arc<dyn PackageSummarizer>>,
    gates: Arc<Gates>,
    max_depth: u32,
    verbose: bool,
    stats: BuildStats,
}

impl TreeBuilder {
    /// Create an unbounded, quiet builder.
    pub fn new(fs: Arc<dyn FileSystem>, gates: Arc<Gates>) -> Self {
        Self {
            fs,
            summarizer: None,
            gates,
            max_depth: u32::MAX,
            verbose: false,
            stats: BuildStats::new(),
        }
    }

    /// Apply depth and verbosity settings from `config`.
    pub fn with_config(mut self, config: &BuildConfig) -> Self {
        self.max_depth = config.depth_limit();
        self.verbose = config.verbose;
        self
    }

    /// Stop recursing at `max_depth` (None = unlimited).
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth.unwrap_or(u32::MAX);
        self
    }

    /// Log per-directory and per-file failures.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consult `summarizer` before reading a directory's files.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn PackageSummarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Counters for the work done so far.
    pub fn progress(&self) -> BuildProgress {
        self.stats.snapshot()
    }

    /// Build the tree anchored at `root`.
    ///
    /// The virtual root only has to be a directory; any other root must
    /// also pass the package directory naming rule. Violations are logged
    /// and yield `None`.
    pub async fn build(self: Arc<Self>, root: &str) -> Option<DirectoryNode> {
        self.stats.start();
        let info = match self.stat(root).await {
            Ok(info) => info,
            Err(err) => {
                warn!(root, error = %err, "cannot build package tree");
                return None;
            }
        };

        let misuse = if root == ROOT {
            (!info.is_dir).then(|| BuildError::NotADirectory {
                path: root.to_string(),
            })
        } else {
            (!is_pkg_dir(&info)).then(|| BuildError::NotAPackageDirectory {
                path: root.to_string(),
            })
        };
        if let Some(err) = misuse {
            warn!(root, error = %err, "cannot build package tree");
            return None;
        }

        debug!(root, max_depth = self.max_depth, "building package tree");
        let tree = Arc::clone(&self)
            .build_dir(root.to_string(), info.name, 0)
            .await;

        let progress = self.progress();
        info!(
            root,
            dirs = progress.dirs_listed,
            files = progress.files_parsed,
            errors = progress.errors_count(),
            elapsed_ms = progress.elapsed.as_millis() as u64,
            "package tree built"
        );
        tree
    }

    /// Build the subtree for directory `path` at `depth`.
    ///
    /// Returns `None` when the directory is excluded or holds no package
    /// content, directly or transitively.
    pub fn build_dir(
        self: Arc<Self>,
        path: String,
        name: CompactString,
        depth: u32,
    ) -> BoxFuture<'static, Option<DirectoryNode>> {
        Box::pin(async move {
            if name.as_str() == TESTDATA_DIR {
                return None;
            }

            let import_path = classify::import_path(&path);
            let root_type = self.fs.root_type(&path);

            if depth >= self.max_depth {
                // Keep the ancestors: assume a package lives here.
                let mut node = DirectoryNode::new(depth, path, name, import_path, root_type);
                node.has_pkg = true;
                return Some(node);
            }

            let mut selector = SynopsisSelector::new();
            let mut show = true;
            let mut has_pkg_files = false;
            let mut have_summary = false;

            if let Some(summarizer) = &self.summarizer {
                let key = path.strip_prefix(SRC_PREFIX).unwrap_or(&path);
                if let Some(summary) = summarizer.summarize(key) {
                    has_pkg_files = true;
                    show = summary.show;
                    selector.set_primary(summary.synopsis);
                    have_summary = true;
                }
            }

            let entries = match self.list_dir(&path).await {
                Ok(entries) => entries,
                Err(err) => {
                    self.stats.record_read_error();
                    if self.verbose {
                        warn!(dir = %path, error = %err, "reading directory failed");
                    }
                    Vec::new()
                }
            };

            let mut pending = Vec::new();
            let mut children = Vec::new();

            for entry in entries {
                if is_pkg_dir(&entry) {
                    let child_path = join(&path, &entry.name);
                    match self.gates.try_acquire_worker() {
                        Some(permit) => {
                            let builder = Arc::clone(&self);
                            pending.push(tokio::spawn(async move {
                                let _permit = permit;
                                builder.build_dir(child_path, entry.name, depth + 1).await
                            }));
                        }
                        None => {
                            // No free worker: recurse on this task.
                            let child = Arc::clone(&self)
                                .build_dir(child_path, entry.name, depth + 1)
                                .await;
                            children.extend(child);
                        }
                    }
                } else if !have_summary && is_pkg_file(&entry) {
                    // A .go name alone does not make a package; the clause must parse.
                    let file_path = join(&path, &entry.name);
                    match self.parse_file(&file_path).await {
                        Ok(clause) => {
                            has_pkg_files = true;
                            if let Some(doc) = &clause.doc {
                                selector.offer(Priority::classify(&clause.name, &name), doc);
                            }
                            have_summary = selector.has_primary();
                        }
                        Err(err) => {
                            self.stats.record_parse_error();
                            if self.verbose {
                                warn!(file = %file_path, error = %err, "skipping source file");
                            }
                        }
                    }
                }
            }

            for handle in pending {
                match handle.await {
                    Ok(child) => children.extend(child),
                    Err(err) => warn!(dir = %path, error = %err, "subdirectory task failed"),
                }
            }

            // Spawned children arrive in completion order.
            children.sort_by(|a, b| a.name.cmp(&b.name));

            if !has_pkg_files && children.is_empty() {
                return None;
            }

            Some(DirectoryNode {
                depth,
                path,
                name,
                import_path,
                has_pkg: has_pkg_files && show,
                synopsis: selector.select(),
                root_type,
                children,
            })
        })
    }

    async fn stat(&self, path: &str) -> Result<FileInfo, BuildError> {
        let owned = path.to_string();
        self.blocking(path, move |fs| fs.stat(&owned)).await
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<FileInfo>, BuildError> {
        let _io = self.gates.acquire_io().await?;
        self.stats.record_dir();
        let owned = path.to_string();
        self.blocking(path, move |fs| fs.read_dir(&owned)).await
    }

    async fn parse_file(&self, path: &str) -> Result<PackageClause, BuildError> {
        let _io = self.gates.acquire_io().await?;
        let owned = path.to_string();
        let src = self.blocking(path, move |fs| fs.read_file(&owned)).await?;
        let clause = parse_package_clause(&src).map_err(|e| e.with_path(path))?;
        self.stats.record_file();
        Ok(clause)
    }

    /// Run a filesystem call on the blocking pool.
    async fn blocking<T, F>(&self, path: &str, op: F) -> Result<T, BuildError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn FileSystem) -> io::Result<T> + Send + 'static,
    {
        let fs = Arc::clone(&self.fs);
        match tokio::task::spawn_blocking(move || op(fs.as_ref())).await {
            Ok(result) => result.map_err(|e| BuildError::io(path, e)),
            Err(err) => Err(BuildError::TaskFailed {
                path: path.to_string(),
                message: err.to_string(),
            }),
        }
    }
}
