//! Directory node types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which logical source root a path belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RootType {
    /// Standard library sources.
    Standard,
    /// Third-party sources.
    External,
    /// Not bound to a known root.
    #[default]
    Unknown,
}

/// A directory that contains package source, or contains such
/// directories transitively.
///
/// Children are owned exclusively by their parent and sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Distance from the scan root.
    pub depth: u32,

    /// Absolute virtual path; includes `name`.
    pub path: String,

    /// Last path segment.
    pub name: CompactString,

    /// Path with the source-root prefix stripped.
    pub import_path: String,

    /// True if the directory itself holds a visible package.
    pub has_pkg: bool,

    /// One-line package summary, possibly empty.
    pub synopsis: String,

    /// Source root classification of `path`.
    pub root_type: RootType,

    /// Subdirectories, sorted by name.
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    /// Create a childless node with no synopsis.
    pub fn new(
        depth: u32,
        path: impl Into<String>,
        name: impl Into<CompactString>,
        import_path: impl Into<String>,
        root_type: RootType,
    ) -> Self {
        Self {
            depth,
            path: path.into(),
            name: name.into(),
            import_path: import_path.into(),
            has_pkg: false,
            synopsis: String::new(),
            root_type,
            children: Vec::new(),
        }
    }

    /// Check if this node has no subdirectories.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&DirectoryNode> {
        self.children.iter().find(|c| c.name.as_str() == name)
    }

    /// Sort children by name, recursively.
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.name.cmp(&b.name));
        for child in &mut self.children {
            child.sort_children();
        }
    }

    /// Deepest `depth` value found in this subtree.
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(DirectoryNode::max_depth)
            .max()
            .unwrap_or(self.depth)
    }
}
