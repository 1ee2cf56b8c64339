//! Kindred Store - Snapshot publication and graph ingestion
//!
//! This crate owns the published graph snapshot and the sources it can be
//! loaded from.

pub mod error;
pub mod json;
pub mod memory;
pub mod store;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use json::JsonFileSource;
pub use memory::MemorySource;
pub use store::{GraphStore, SnapshotInfo};
pub use traits::GraphSource;
