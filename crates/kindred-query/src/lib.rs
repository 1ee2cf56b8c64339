//! Kindred Query - Concurrent query facade
//!
//! Validates requests, bounds concurrency and runs path, ancestor and
//! classification queries against the published snapshot.

pub mod config;
pub mod options;
pub mod request;
pub mod service;

pub use config::ServiceConfig;
pub use options::QueryOptions;
pub use request::{ErrorBody, QueryRequest, QueryResponse};
pub use service::{PathResponse, QueryService};
