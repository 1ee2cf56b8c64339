//! JSON graph document source
//!
//! Document shape:
//!
//! ```json
//! {
//!   "individuals": ["ada", "byron", 42],
//!   "edges": [
//!     { "from": "byron", "to": "ada", "kind": "biological-parent" },
//!     { "from": "ada", "to": 42, "kind": "partner", "legal": false }
//!   ]
//! }
//! ```

use crate::error::{StorageError, StorageResult};
use crate::traits::GraphSource;
use async_trait::async_trait;
use kindred_core::GraphData;
use std::path::{Path, PathBuf};

/// Graph document stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a document from a string
    pub fn parse(content: &str) -> StorageResult<GraphData> {
        Ok(serde_json::from_str(content)?)
    }
}

#[async_trait]
impl GraphSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }

    async fn load_graph(&self) -> StorageResult<GraphData> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StorageError::Source(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let data = Self::parse(&content)?;
        tracing::debug!(
            "Read {} individuals and {} edges from {}",
            data.individuals.len(),
            data.edges.len(),
            self.path.display()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::{EdgeKind, IndividualId};
    use std::io::Write;

    #[test]
    fn test_parse_mixed_ids_and_defaults() {
        let data = JsonFileSource::parse(
            r#"{
                "individuals": ["ada", 7],
                "edges": [
                    {"from": "ada", "to": 7, "kind": "partner", "legal": false},
                    {"from": 7, "to": "ada", "kind": "adoptive-parent", "confidence": 0.5}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(data.individuals[1], IndividualId::from("7"));
        assert_eq!(data.edges[0].kind, EdgeKind::Partner);
        assert!(!data.edges[0].legal);
        assert!(data.edges[1].legal);
        assert_eq!(data.edges[1].confidence, Some(0.5));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let result = JsonFileSource::parse(
            r#"{"individuals": ["a", "b"], "edges": [{"from": "a", "to": "b", "kind": "cousin"}]}"#,
        );
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"individuals": ["mum", "kid"], "edges": [{{"from": "mum", "to": "kid", "kind": "biological-parent"}}]}}"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        let data = source.load_graph().await.unwrap();
        assert_eq!(data.individuals.len(), 2);
        assert_eq!(data.edges.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("missing.json"));
        assert!(matches!(
            source.load_graph().await,
            Err(StorageError::Source(_))
        ));
    }
}
