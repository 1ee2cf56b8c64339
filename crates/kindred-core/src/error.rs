//! Error types for Kindred Core

use thiserror::Error;

/// Result type alias using Kindred's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kindred error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Individual not found: {0}")]
    UnknownIndividual(String),

    #[error("No path connects {from} and {to}")]
    NotConnected { from: String, to: String },

    #[error("No common ancestor for {a} and {b}")]
    NoCommonAncestor { a: String, b: String },

    #[error("Traversal from {individual} exceeded depth {max_depth} (cycle or overly deep data)")]
    CycleOrDepthExceeded { individual: String, max_depth: u32 },

    #[error("Query timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Query cancelled")]
    Cancelled,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is an expected "no result" answer rather than a failure
    pub fn is_negative_result(&self) -> bool {
        matches!(self, Self::NotConnected { .. } | Self::NoCommonAncestor { .. })
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidGraph(_) => "invalid_graph",
            Self::UnknownIndividual(_) => "unknown_individual",
            Self::NotConnected { .. } => "not_connected",
            Self::NoCommonAncestor { .. } => "no_common_ancestor",
            Self::CycleOrDepthExceeded { .. } => "cycle_or_depth_exceeded",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Validation(_) => "validation",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<crate::limits::ValidationError> for Error {
    fn from(err: crate::limits::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
