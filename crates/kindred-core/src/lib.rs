//! Kindred Core - Relationship engine for genealogical graphs
//!
//! This crate provides the data model, the immutable graph snapshot and the
//! search algorithms (connecting paths, common ancestors and relationship
//! classification) used by the rest of the Kindred workspace.

pub mod ancestry;
pub mod budget;
pub mod classify;
pub mod error;
pub mod graph;
pub mod individual;
pub mod label;
pub mod limits;
pub mod path;
pub mod query;
pub mod relationship;

pub use ancestry::{Ancestor, AncestorResolver, AncestorSet, CommonAncestor, Lineage};
pub use budget::{CancellationToken, SearchBudget};
pub use classify::{
    Classification, Qualifiers, RelationshipClassifier, RelationshipKind, RelationshipResult,
};
pub use error::{Error, Result};
pub use graph::{GraphData, Neighbor, Snapshot, SnapshotStats};
pub use individual::{Individual, IndividualId};
pub use path::{Hop, Path, PathFinder, PathSet, PathStep, SearchStats};
pub use query::{AncestorOptions, PathOptions};
pub use relationship::{Direction, EdgeKind, EdgeKinds, RelationshipEdge};
