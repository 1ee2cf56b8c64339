//! Snapshot publication
//!
//! The store holds the current graph as an immutable `Arc<Snapshot>`.
//! Readers clone the handle and keep it for the whole query; writers build a
//! replacement off to the side and swap it in under a short write lock.
//! A failed build leaves the published snapshot untouched.

use crate::error::StorageResult;
use crate::traits::GraphSource;
use chrono::{DateTime, Utc};
use kindred_core::{GraphData, IndividualId, RelationshipEdge, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};

/// Metadata about the published snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    /// Monotonic publication counter, 0 for the initial empty snapshot
    pub version: u64,
    pub published_at: DateTime<Utc>,
    pub individuals: usize,
    pub edges: usize,
}

impl SnapshotInfo {
    fn new(version: u64, snapshot: &Snapshot) -> Self {
        Self {
            version,
            published_at: Utc::now(),
            individuals: snapshot.len(),
            edges: snapshot.edge_count(),
        }
    }
}

struct Published {
    snapshot: Arc<Snapshot>,
    info: SnapshotInfo,
}

/// Owner of the canonical graph snapshot
pub struct GraphStore {
    current: RwLock<Published>,
    writer: Mutex<()>,
}

impl GraphStore {
    /// Store holding an empty snapshot
    pub fn new() -> Self {
        let snapshot = Snapshot::empty();
        let info = SnapshotInfo::new(0, &snapshot);
        Self {
            current: RwLock::new(Published {
                snapshot: Arc::new(snapshot),
                info,
            }),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot handle
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current.snapshot)
    }

    /// Metadata of the current snapshot
    pub fn info(&self) -> SnapshotInfo {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current.info.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingestion
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the graph with a new batch
    pub fn load<I, T>(&self, individuals: I, edges: Vec<RelationshipEdge>) -> StorageResult<SnapshotInfo>
    where
        I: IntoIterator<Item = T>,
        T: Into<IndividualId>,
    {
        self.publish(GraphData::new().with_individuals(individuals).with_edges(edges))
    }

    /// Replace the graph with a validated payload
    pub fn publish(&self, data: GraphData) -> StorageResult<SnapshotInfo> {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.swap(Snapshot::build(data)?)
    }

    /// Append edges to the current graph
    ///
    /// Copy-on-write: the current snapshot is rebuilt with the new edges and
    /// republished. Edges that reference unknown individuals fail the whole
    /// batch.
    pub fn add_edges(&self, edges: Vec<RelationshipEdge>) -> StorageResult<SnapshotInfo> {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.snapshot().to_data();
        tracing::debug!("Adding {} edges to {} existing", edges.len(), data.edges.len());
        data.edges.extend(edges);
        self.swap(Snapshot::build(data)?)
    }

    /// Append individuals to the current graph
    pub fn add_individuals<I, T>(&self, individuals: I) -> StorageResult<SnapshotInfo>
    where
        I: IntoIterator<Item = T>,
        T: Into<IndividualId>,
    {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.snapshot().to_data();
        data.individuals
            .extend(individuals.into_iter().map(Into::into));
        self.swap(Snapshot::build(data)?)
    }

    /// Replace the graph with the contents of a source
    pub async fn load_from(&self, source: &dyn GraphSource) -> StorageResult<SnapshotInfo> {
        tracing::debug!("Loading graph from {}", source.describe());
        let data = source.load_graph().await?;
        self.publish(data)
    }

    fn swap(&self, snapshot: Snapshot) -> StorageResult<SnapshotInfo> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let info = SnapshotInfo::new(current.info.version + 1, &snapshot);
        *current = Published {
            snapshot: Arc::new(snapshot),
            info: info.clone(),
        };
        tracing::info!(
            "Published snapshot v{} ({} individuals, {} edges)",
            info.version,
            info.individuals,
            info.edges
        );
        Ok(info)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::memory::MemorySource;

    fn id(s: &str) -> IndividualId {
        IndividualId::from(s)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = GraphStore::new();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.info().version, 0);
    }

    #[test]
    fn test_load_publishes_new_version() {
        let store = GraphStore::new();
        let info = store
            .load(["mum", "kid"], vec![RelationshipEdge::biological("mum", "kid")])
            .unwrap();
        assert_eq!(info.version, 1);
        assert_eq!(info.individuals, 2);
        assert_eq!(info.edges, 1);
        assert!(store.snapshot().contains(&id("kid")));
    }

    #[test]
    fn test_failed_load_keeps_previous_snapshot() {
        let store = GraphStore::new();
        store
            .load(["mum", "kid"], vec![RelationshipEdge::biological("mum", "kid")])
            .unwrap();

        let result = store.load(["a"], vec![RelationshipEdge::biological("a", "ghost")]);
        assert!(matches!(
            result,
            Err(StorageError::Graph(kindred_core::Error::InvalidGraph(_)))
        ));
        assert_eq!(store.info().version, 1);
        assert!(store.snapshot().contains(&id("mum")));
    }

    #[test]
    fn test_readers_keep_their_handle() {
        let store = GraphStore::new();
        store.load(["a"], Vec::new()).unwrap();
        let before = store.snapshot();

        store.add_individuals(["b"]).unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_add_edges_is_incremental() {
        let store = GraphStore::new();
        store.load(["gma", "mum", "kid"], Vec::new()).unwrap();
        store
            .add_edges(vec![RelationshipEdge::biological("gma", "mum")])
            .unwrap();
        let info = store
            .add_edges(vec![RelationshipEdge::biological("mum", "kid")])
            .unwrap();

        assert_eq!(info.version, 3);
        assert_eq!(info.edges, 2);
        let parents = store.snapshot().parents(&id("kid")).unwrap();
        assert_eq!(parents.len(), 1);

        assert!(store
            .add_edges(vec![RelationshipEdge::biological("kid", "kid")])
            .is_err());
        assert_eq!(store.info().version, 3);
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let store = GraphStore::new();
        let source = MemorySource::default()
            .with_individuals(["a", "b"])
            .with_edges(vec![RelationshipEdge::partners("a", "b")]);

        let info = store.load_from(&source).await.unwrap();
        assert_eq!(info.edges, 1);
        assert_eq!(store.snapshot().partners(&id("b")).unwrap().len(), 1);
    }
}
