//! Search options for path and ancestor queries

use crate::limits::{DEFAULT_ANCESTOR_DEPTH, DEFAULT_MAX_PATHS, DEFAULT_PATH_DEPTH};
use crate::relationship::EdgeKinds;
use serde::{Deserialize, Serialize};

/// Options for connecting-path searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathOptions {
    /// Edge kinds the path may traverse
    #[serde(default)]
    pub kinds: EdgeKinds,

    /// Maximum path length in edges
    #[serde(default = "default_path_depth")]
    pub max_depth: u32,

    /// Maximum equal-length paths to return when enumerating
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
}

fn default_path_depth() -> u32 {
    DEFAULT_PATH_DEPTH
}

fn default_max_paths() -> usize {
    DEFAULT_MAX_PATHS
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            kinds: EdgeKinds::all(),
            max_depth: default_path_depth(),
            max_paths: default_max_paths(),
        }
    }
}

impl PathOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict traversal to these edge kinds
    pub fn with_kinds(mut self, kinds: EdgeKinds) -> Self {
        self.kinds = kinds;
        self
    }

    /// Set maximum path length
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set maximum number of paths for enumeration
    pub fn with_max_paths(mut self, max: usize) -> Self {
        self.max_paths = max;
        self
    }
}

/// Options for ancestor resolution and classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestorOptions {
    /// Parent kinds followed upward (partner edges are always ignored)
    #[serde(default = "default_ancestor_kinds")]
    pub kinds: EdgeKinds,

    /// Maximum generations searched
    #[serde(default = "default_ancestor_depth")]
    pub max_depth: u32,
}

fn default_ancestor_kinds() -> EdgeKinds {
    EdgeKinds::parents()
}

fn default_ancestor_depth() -> u32 {
    DEFAULT_ANCESTOR_DEPTH
}

impl Default for AncestorOptions {
    fn default() -> Self {
        Self {
            kinds: default_ancestor_kinds(),
            max_depth: default_ancestor_depth(),
        }
    }
}

impl AncestorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(mut self, kinds: EdgeKinds) -> Self {
        self.kinds = kinds.parent_kinds();
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Follow biological parent edges only
    pub fn biological_only(self) -> Self {
        self.with_kinds(EdgeKinds::biological())
    }
}
