//! In-memory operations over a built tree: lookup, traversal and listing.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::{DirectoryNode, RootType};

/// Split a slash-separated path into its non-empty segments.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Pre-order traversal over a tree, created by [`DirectoryNode::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    stack: Vec<&'a DirectoryNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a DirectoryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// One row of a flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Depth relative to the shallowest listed node.
    pub depth: u32,
    /// `max_height - depth`; useful for right-aligned indentation.
    pub height: u32,
    /// Path relative to the listed tree's root.
    pub path: String,
    /// Directory name.
    pub name: CompactString,
    /// Whether the directory holds a visible package.
    pub has_pkg: bool,
    /// Package synopsis.
    pub synopsis: String,
    /// Source root classification.
    pub root_type: RootType,
}

/// Flattened, pre-ordered view of a tree for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Number of distinct depths in the listing.
    pub max_height: u32,
    /// Entries in pre-order.
    pub entries: Vec<ListingEntry>,
}

impl DirectoryNode {
    /// Iterate over this node and all descendants in pre-order.
    ///
    /// With `skip_root` the node itself is left out.
    pub fn iter(&self, skip_root: bool) -> Iter<'_> {
        let stack = if skip_root {
            self.children.iter().rev().collect()
        } else {
            vec![self]
        };
        Iter { stack }
    }

    /// Find the node for an absolute `path` inside this tree.
    ///
    /// The path must start with this node's own path; the remaining
    /// segments are matched child by child.
    pub fn lookup(&self, path: &str) -> Option<&DirectoryNode> {
        self.follow(&self.route(path)?)
    }

    /// Child indices leading from this node to the node for `path`.
    ///
    /// Same matching rules as [`lookup`](Self::lookup); an empty route
    /// names this node.
    pub fn route(&self, path: &str) -> Option<Vec<usize>> {
        let mut query = split_path(path);
        for segment in split_path(&self.path) {
            if query.next()? != segment {
                return None;
            }
        }
        let mut route = Vec::new();
        let mut dir = self;
        for segment in query {
            let index = dir
                .children
                .iter()
                .position(|c| c.name.as_str() == segment)?;
            route.push(index);
            dir = &dir.children[index];
        }
        Some(route)
    }

    /// Walk a route produced by [`route`](Self::route).
    pub fn follow(&self, route: &[usize]) -> Option<&DirectoryNode> {
        route
            .iter()
            .try_fold(self, |dir, &index| dir.children.get(index))
    }

    /// Flatten the tree into a listing.
    ///
    /// `filter` is applied to absolute paths; rejected nodes are omitted but
    /// still count towards the depth range. Returns `None` for an empty
    /// listing.
    pub fn listing(&self, skip_root: bool, filter: impl Fn(&str) -> bool) -> Option<Listing> {
        let (min_depth, max_depth) = self.iter(skip_root).fold(None, |range, d| match range {
            None => Some((d.depth, d.depth)),
            Some((lo, hi)) => Some((d.depth.min(lo), d.depth.max(hi))),
        })?;
        let max_height = max_depth - min_depth + 1;

        let entries = self
            .iter(skip_root)
            .filter(|d| filter(&d.path))
            .map(|d| {
                let depth = d.depth - min_depth;
                let relative = d.path.strip_prefix(self.path.as_str()).unwrap_or(&d.path);
                ListingEntry {
                    depth,
                    height: max_height - depth,
                    path: relative.strip_prefix('/').unwrap_or(relative).to_string(),
                    name: d.name.clone(),
                    has_pkg: d.has_pkg,
                    synopsis: d.synopsis.clone(),
                    root_type: d.root_type,
                }
            })
            .collect();

        Some(Listing {
            max_height,
            entries,
        })
    }
}
