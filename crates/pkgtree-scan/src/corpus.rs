//! Corpus: a filesystem plus its cached package tree.

use std::ops::Deref;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use pkgtree_core::{BuildConfig, BuildError, DirectoryNode, FileSystem, PackageSummarizer};

use crate::builder::TreeBuilder;
use crate::cache::{Snapshot, TreeCache};
use crate::gate::Gates;

/// Levels built for a directory missing from the cached tree: the
/// directory itself and its subdirectories' synopses.
pub const ON_DEMAND_DEPTH: u32 = 2;

/// Directory information served by [`Corpus::directory`].
///
/// A cache hit shares the snapshot it was found in; only on-demand builds
/// own their tree. Dereferences to the directory's node.
#[derive(Debug, Clone)]
pub struct Directory {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Cached {
        snapshot: Arc<Snapshot>,
        route: Vec<usize>,
    },
    Built {
        root: DirectoryNode,
        built_at: SystemTime,
    },
}

impl Directory {
    /// The directory's node.
    pub fn node(&self) -> &DirectoryNode {
        match &self.source {
            Source::Cached { snapshot, route } => resolve(snapshot, route),
            Source::Built { root, .. } => root,
        }
    }

    /// When the tree holding this directory was built.
    pub fn built_at(&self) -> SystemTime {
        match &self.source {
            Source::Cached { snapshot, .. } => snapshot.built_at(),
            Source::Built { built_at, .. } => *built_at,
        }
    }

    /// Whether this directory was served from the cached snapshot.
    pub fn is_cached(&self) -> bool {
        matches!(self.source, Source::Cached { .. })
    }

    /// Take the node out, copying it only when it lives in a snapshot.
    pub fn into_node(self) -> DirectoryNode {
        match self.source {
            Source::Built { root, .. } => root,
            Source::Cached { snapshot, route } => resolve(&snapshot, &route).clone(),
        }
    }
}

/// Node at `route` inside `snapshot`.
fn resolve<'a>(snapshot: &'a Snapshot, route: &[usize]) -> &'a DirectoryNode {
    // Routes are only ever resolved against the snapshot they came from.
    route
        .iter()
        .fold(snapshot.root(), |dir, &index| &dir.children[index])
}

impl Deref for Directory {
    type Target = DirectoryNode;

    fn deref(&self) -> &DirectoryNode {
        self.node()
    }
}

/// Holds the filesystem, its collaborators and the latest tree snapshot.
///
/// All builds started through one corpus share the same gates.
pub struct Corpus {
    fs: Arc<dyn FileSystem>,
    summarizer: Option<Arc<dyn PackageSummarizer>>,
    config: BuildConfig,
    gates: Arc<Gates>,
    cache: TreeCache,
}

impl Corpus {
    /// Create a corpus with default configuration and an empty cache.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            summarizer: None,
            config: BuildConfig::default(),
            gates: Arc::new(Gates::new()),
            cache: TreeCache::new(),
        }
    }

    /// Use `config` for full builds.
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Consult `summarizer` before parsing package files.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn PackageSummarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Share `gates` with other corpora.
    pub fn with_gates(mut self, gates: Arc<Gates>) -> Self {
        self.gates = gates;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// The snapshot cell.
    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    /// Latest installed snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cache.get()
    }

    fn builder(&self, max_depth: Option<u32>) -> TreeBuilder {
        let builder = TreeBuilder::new(Arc::clone(&self.fs), Arc::clone(&self.gates))
            .with_config(&self.config)
            .with_max_depth(max_depth);
        match &self.summarizer {
            Some(summarizer) => builder.with_summarizer(Arc::clone(summarizer)),
            None => builder,
        }
    }

    /// Build a tree of at most `max_depth` levels anchored at `root`,
    /// without touching the cache.
    pub async fn new_directory(&self, root: &str, max_depth: Option<u32>) -> Option<DirectoryNode> {
        Arc::new(self.builder(max_depth)).build(root).await
    }

    /// Perform the first full build and install it.
    ///
    /// Returns the installed snapshot version.
    pub async fn init(&self) -> Result<u64, BuildError> {
        self.refresh().await
    }

    /// Rebuild the full tree and replace the cached snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<u64, BuildError> {
        let builder = Arc::new(self.builder(self.config.max_depth));
        let root = Arc::clone(&builder)
            .build(&self.config.root)
            .await
            .ok_or_else(|| BuildError::EmptyTree {
                path: self.config.root.clone(),
            })?;
        let version = self.cache.install(Snapshot::new(root, builder.progress()));
        debug!(version, "installed package tree snapshot");
        Ok(version)
    }

    /// Directory information for `abspath` and the time it was computed.
    ///
    /// Served from the cached snapshot when possible; otherwise a shallow
    /// tree is built on the spot.
    pub async fn directory(&self, abspath: &str) -> Option<Directory> {
        if let Some(snapshot) = self.cache.get() {
            if let Some(route) = snapshot.root().route(abspath) {
                return Some(Directory {
                    source: Source::Cached { snapshot, route },
                });
            }
        }

        debug!(path = abspath, "directory not cached, building on demand");
        let root = self.new_directory(abspath, Some(ON_DEMAND_DEPTH)).await?;
        Some(Directory {
            source: Source::Built {
                root,
                built_at: SystemTime::now(),
            },
        })
    }
}
