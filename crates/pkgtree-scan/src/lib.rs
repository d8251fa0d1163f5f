//! Package tree builder for pkgtree.
//!
//! This crate scans a virtual filesystem and builds a pruned, name-sorted
//! tree of the directories that contain package source.
//!
//! # Overview
//!
//! - **Two gates** bound the work: an I/O gate that callers wait on, and
//!   a worker gate that falls back to inline recursion when full
//! - **Synopses** come from a summarizer hook or from the doc comments of
//!   package clauses, ranked by how well the package name matches
//! - **Pruning** drops every directory without package content below it
//! - **Snapshots** of full builds are cached for lock-light lookups
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pkgtree_scan::Corpus;
//! use pkgtree_vfs::OsFs;
//!
//! # async fn run() -> Result<(), pkgtree_scan::BuildError> {
//! let corpus = Corpus::new(Arc::new(OsFs::new("/usr/local/go")));
//! corpus.init().await?;
//!
//! if let Some(dir) = corpus.directory("/src/net/http").await {
//!     println!("{} ({:?}): {}", dir.import_path, dir.built_at(), dir.synopsis);
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod cache;
pub mod classify;
mod corpus;
mod gate;
pub mod parse;
mod progress;
pub mod synopsis;

pub use builder::TreeBuilder;
pub use cache::{Snapshot, TreeCache};
pub use corpus::{Corpus, Directory, ON_DEMAND_DEPTH};
pub use gate::{Gates, IO_GATE_CAPACITY, WORKERS_PER_CPU, default_worker_capacity};
pub use progress::BuildProgress;

// Re-export core types for convenience
pub use pkgtree_core::{
    BuildConfig, BuildError, DirectoryNode, FileInfo, FileSystem, Listing, ListingEntry,
    PackageSummarizer, RootType, Summary,
};
