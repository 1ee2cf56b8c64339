//! Graph source trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use kindred_core::GraphData;

/// Ingestion boundary: anything that can produce a full graph document
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Short human-readable description used in logs
    fn describe(&self) -> String;

    /// Read individuals and edges
    async fn load_graph(&self) -> StorageResult<GraphData>;
}
