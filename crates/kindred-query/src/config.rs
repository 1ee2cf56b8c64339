//! Query service configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every query the service runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Maximum queries running at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout applied when a query sets none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Edge cap for path queries that set none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_depth: Option<u32>,

    /// Generation cap for ancestor and classify queries that set none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor_depth: Option<u32>,
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_ms: None,
            path_depth: None,
            ancestor_depth: None,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_path_depth(mut self, depth: u32) -> Self {
        self.path_depth = Some(depth);
        self
    }

    pub fn with_ancestor_depth(mut self, depth: u32) -> Self {
        self.ancestor_depth = Some(depth);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
