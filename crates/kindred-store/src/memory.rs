//! In-memory graph source for testing

use crate::error::StorageResult;
use crate::traits::GraphSource;
use async_trait::async_trait;
use kindred_core::{GraphData, IndividualId, RelationshipEdge};

/// In-memory graph source
///
/// Useful for testing and for callers that assemble a graph themselves.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: GraphData,
}

impl MemorySource {
    pub fn new(data: GraphData) -> Self {
        Self { data }
    }

    pub fn with_individuals<I, T>(mut self, individuals: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IndividualId>,
    {
        self.data
            .individuals
            .extend(individuals.into_iter().map(Into::into));
        self
    }

    pub fn with_edges(mut self, edges: Vec<RelationshipEdge>) -> Self {
        self.data.edges.extend(edges);
        self
    }
}

impl From<GraphData> for MemorySource {
    fn from(data: GraphData) -> Self {
        Self::new(data)
    }
}

#[async_trait]
impl GraphSource for MemorySource {
    fn describe(&self) -> String {
        format!(
            "memory ({} individuals, {} edges)",
            self.data.individuals.len(),
            self.data.edges.len()
        )
    }

    async fn load_graph(&self) -> StorageResult<GraphData> {
        Ok(self.data.clone())
    }
}
