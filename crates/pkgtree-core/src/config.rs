//! Build configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::fs::ROOT;

/// Configuration for building a package tree.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct BuildConfig {
    /// Virtual path the tree is anchored at.
    #[builder(default = "ROOT.to_string()")]
    #[serde(default = "default_root")]
    pub root: String,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Log per-directory and per-file failures.
    #[builder(default = "false")]
    #[serde(default)]
    pub verbose: bool,
}

fn default_root() -> String {
    ROOT.to_string()
}

impl BuildConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if !root.starts_with('/') {
                return Err(format!("Root path must be absolute: {root:?}"));
            }
        }
        Ok(())
    }
}

impl BuildConfig {
    /// Create a new build config builder.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::default()
    }

    /// Create an unbounded config rooted at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            verbose: false,
        }
    }

    /// Check a config that did not go through the builder, e.g. one
    /// deserialized from a file.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.root.starts_with('/') {
            Ok(())
        } else {
            Err(BuildError::InvalidConfig {
                message: format!("root path must be absolute: {:?}", self.root),
            })
        }
    }

    /// Depth at which recursion stops; `u32::MAX` when unbounded.
    pub fn depth_limit(&self) -> u32 {
        self.max_depth.unwrap_or(u32::MAX)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(ROOT)
    }
}
