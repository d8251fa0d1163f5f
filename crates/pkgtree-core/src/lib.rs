//! Core types and traits for pkgtree.
//!
//! This crate provides the fundamental data structures used throughout
//! the pkgtree ecosystem: the pruned package directory tree, the
//! collaborator traits the scanner consumes, configuration and errors.

mod config;
mod error;
mod fs;
mod node;
mod summary;
mod tree;

pub use config::{BuildConfig, BuildConfigBuilder};
pub use error::BuildError;
pub use fs::{FileInfo, FileSystem, ROOT};
pub use node::{DirectoryNode, RootType};
pub use summary::{PackageSummarizer, Summary};
pub use tree::{Iter, Listing, ListingEntry, split_path};
