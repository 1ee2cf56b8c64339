//! Query service
//!
//! Every query validates its input, waits for a permit, takes the current
//! snapshot handle and runs to completion on a blocking worker. Timeouts
//! and cancellation are enforced inside the traversal through a
//! [`SearchBudget`].

use crate::config::ServiceConfig;
use crate::options::QueryOptions;
use kindred_core::limits::validate_id;
use kindred_core::{
    Ancestor, AncestorResolver, AncestorSet, Classification, Error, IndividualId, Path,
    PathFinder, RelationshipClassifier, Result, SearchBudget, Snapshot,
};
use kindred_store::{GraphStore, SnapshotInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// How often a query waiting for a permit looks at its cancellation token
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of a path query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResponse {
    /// Edges on each returned path
    pub length: usize,

    /// The shortest path first; more only when all paths were requested
    pub paths: Vec<Path>,

    /// More shortest paths exist than were returned
    pub truncated: bool,
}

impl PathResponse {
    /// The preferred shortest path
    pub fn path(&self) -> Option<&Path> {
        self.paths.first()
    }
}

/// Entry point for relationship queries
pub struct QueryService {
    store: Arc<GraphStore>,
    permits: Arc<Semaphore>,
    config: ServiceConfig,
}

impl QueryService {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self::with_config(store, ServiceConfig::default())
    }

    pub fn with_config(store: Arc<GraphStore>, config: ServiceConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
        Self {
            store,
            permits,
            config,
        }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn snapshot_info(&self) -> SnapshotInfo {
        self.store.info()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Shortest connecting path, or every shortest path with `all_paths`
    pub async fn find_path(
        &self,
        start: &IndividualId,
        end: &IndividualId,
        options: QueryOptions,
    ) -> Result<PathResponse> {
        let path_options = options.path_options(self.config.path_depth);
        let (s, e) = (start.clone(), end.clone());
        let all = options.all_paths;

        self.run(&[start, end], &options, move |snapshot, budget| {
            if all {
                let set = PathFinder::shortest_paths(snapshot, &s, &e, &path_options, budget)?;
                Ok(PathResponse {
                    length: set.length,
                    paths: set.paths,
                    truncated: set.truncated,
                })
            } else {
                let path = PathFinder::shortest_path(snapshot, &s, &e, &path_options, budget)?;
                Ok(PathResponse {
                    length: path.length,
                    paths: vec![path],
                    truncated: false,
                })
            }
        })
        .await
    }

    /// Nearest common ancestors of two individuals
    pub async fn find_common_ancestors(
        &self,
        a: &IndividualId,
        b: &IndividualId,
        options: QueryOptions,
    ) -> Result<AncestorSet> {
        let ancestor_options = options.ancestor_options(self.config.ancestor_depth)?;
        let (x, y) = (a.clone(), b.clone());

        self.run(&[a, b], &options, move |snapshot, budget| {
            AncestorResolver::common_ancestors(snapshot, &x, &y, &ancestor_options, budget)
        })
        .await
    }

    /// Every relationship label describing how `a` relates to `b`
    pub async fn classify_relationship(
        &self,
        a: &IndividualId,
        b: &IndividualId,
        options: QueryOptions,
    ) -> Result<Classification> {
        let ancestor_options = options.ancestor_options(self.config.ancestor_depth)?;
        let (x, y) = (a.clone(), b.clone());

        self.run(&[a, b], &options, move |snapshot, budget| {
            RelationshipClassifier::classify(snapshot, &x, &y, &ancestor_options, budget)
        })
        .await
    }

    /// All ancestors of one individual, nearest first
    pub async fn ancestors(&self, id: &IndividualId, options: QueryOptions) -> Result<Vec<Ancestor>> {
        let ancestor_options = options.ancestor_options(self.config.ancestor_depth)?;
        let target = id.clone();

        self.run(&[id], &options, move |snapshot, budget| {
            AncestorResolver::ancestors(snapshot, &target, &ancestor_options, budget)
        })
        .await
    }

    async fn run<T, F>(&self, ids: &[&IndividualId], options: &QueryOptions, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Snapshot, &SearchBudget) -> Result<T> + Send + 'static,
    {
        for id in ids {
            validate_id(id.as_str())?;
        }
        options.validate()?;

        // The deadline covers the wait for a permit as well as the search
        let mut budget = SearchBudget::unlimited();
        if let Some(timeout) = options.timeout().or_else(|| self.config.timeout()) {
            budget = budget.with_timeout(timeout);
        }
        if let Some(token) = options.cancel.clone() {
            budget = budget.with_token(token);
        }

        let permit = loop {
            budget.check()?;
            let wait = match (budget.remaining(), budget.is_cancellable()) {
                (Some(left), true) => Some(left.min(CANCEL_POLL_INTERVAL)),
                (Some(left), false) => Some(left),
                (None, true) => Some(CANCEL_POLL_INTERVAL),
                (None, false) => None,
            };
            let acquire = Arc::clone(&self.permits).acquire_owned();
            let acquired = match wait {
                Some(wait) => match tokio::time::timeout(wait, acquire).await {
                    Ok(acquired) => acquired,
                    Err(_) => continue,
                },
                None => acquire.await,
            };
            break acquired.map_err(|e| Error::Internal(format!("Query limiter closed: {}", e)))?;
        };

        let snapshot = self.store.snapshot();
        for id in ids {
            if !snapshot.contains(id) {
                return Err(Error::UnknownIndividual(id.to_string()));
            }
        }

        // The worker owns the permit, so an abandoned query keeps its slot
        // until the search actually stops.
        let result = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let result = op(&snapshot, &budget);
            tracing::debug!("Query finished in {:?}", budget.elapsed());
            result
        })
        .await
        .map_err(|e| Error::Internal(format!("Query worker failed: {}", e)))?;

        if let Err(err) = &result {
            if !err.is_negative_result() {
                tracing::warn!("Query failed: {}", err);
            }
        }
        result
    }
}
