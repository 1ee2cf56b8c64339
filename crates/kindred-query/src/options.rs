//! Per-query options

use kindred_core::limits::{validate_depth, validate_max_paths, ValidationError};
use kindred_core::{AncestorOptions, CancellationToken, EdgeKinds, PathOptions, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options accepted by every query
///
/// Unset fields fall back to the service configuration, then to the library
/// defaults in [`kindred_core::limits`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Edge kinds the query may traverse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<EdgeKinds>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Maximum shortest paths to return (path queries only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paths: Option<usize>,

    /// Return every equal-length shortest path instead of one
    #[serde(default)]
    pub all_paths: bool,

    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(mut self, kinds: EdgeKinds) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_max_paths(mut self, max: usize) -> Self {
        self.max_paths = Some(max);
        self
    }

    pub fn with_all_paths(mut self, all: bool) -> Self {
        self.all_paths = all;
        self
    }

    /// Abort the query when `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reject out-of-range values before any search starts
    pub fn validate(&self) -> Result<()> {
        if let Some(depth) = self.max_depth {
            validate_depth(depth)?;
        }
        if let Some(max) = self.max_paths {
            validate_max_paths(max)?;
        }
        if self.kinds.is_some_and(EdgeKinds::is_empty) {
            return Err(ValidationError::NoEdgeKinds.into());
        }
        Ok(())
    }

    pub(crate) fn path_options(&self, default_depth: Option<u32>) -> PathOptions {
        let mut options = PathOptions::new();
        if let Some(kinds) = self.kinds {
            options = options.with_kinds(kinds);
        }
        if let Some(depth) = self.max_depth.or(default_depth) {
            options = options.with_depth(depth);
        }
        if let Some(max) = self.max_paths {
            options = options.with_max_paths(max);
        }
        options
    }

    pub(crate) fn ancestor_options(&self, default_depth: Option<u32>) -> Result<AncestorOptions> {
        let mut options = AncestorOptions::new();
        if let Some(kinds) = self.kinds {
            let parents = kinds.parent_kinds();
            if parents.is_empty() {
                return Err(ValidationError::NoEdgeKinds.into());
            }
            options = options.with_kinds(parents);
        }
        if let Some(depth) = self.max_depth.or(default_depth) {
            options = options.with_depth(depth);
        }
        Ok(options)
    }
}
