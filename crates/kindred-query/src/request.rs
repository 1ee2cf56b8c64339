//! JSON request dispatch
//!
//! Requests are tagged by `op`:
//!
//! ```json
//! { "op": "classify", "a": "ada", "b": "byron", "max_depth": 20 }
//! ```
//!
//! Responses carry either `result` or `error`. Negative answers such as
//! `not_connected` are reported as errors flagged `negative: true`.

use crate::options::QueryOptions;
use crate::service::QueryService;
use futures::future::join_all;
use kindred_core::{Error, IndividualId};
use serde::{Deserialize, Serialize};

/// A single query request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueryRequest {
    FindPath {
        start: IndividualId,
        end: IndividualId,
        #[serde(flatten)]
        options: QueryOptions,
    },
    CommonAncestors {
        a: IndividualId,
        b: IndividualId,
        #[serde(flatten)]
        options: QueryOptions,
    },
    Classify {
        a: IndividualId,
        b: IndividualId,
        #[serde(flatten)]
        options: QueryOptions,
    },
    Ancestors {
        id: IndividualId,
        #[serde(flatten)]
        options: QueryOptions,
    },
}

impl QueryRequest {
    pub fn op(&self) -> &'static str {
        match self {
            QueryRequest::FindPath { .. } => "find_path",
            QueryRequest::CommonAncestors { .. } => "common_ancestors",
            QueryRequest::Classify { .. } => "classify",
            QueryRequest::Ancestors { .. } => "ancestors",
        }
    }
}

/// Error payload of a failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,

    /// An expected "no such relationship" answer rather than a failure
    #[serde(default)]
    pub negative: bool,
}

/// Response to a single request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl QueryResponse {
    pub fn json<T: Serialize>(op: &str, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                op: Some(op.to_string()),
                result: Some(value),
                error: None,
            },
            Err(e) => Self::failure(Some(op), &Error::Serialization(e)),
        }
    }

    pub fn failure(op: Option<&str>, err: &Error) -> Self {
        Self {
            op: op.map(str::to_string),
            result: None,
            error: Some(ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
                negative: err.is_negative_result(),
            }),
        }
    }

    /// Response for input that could not be parsed as a request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            op: None,
            result: None,
            error: Some(ErrorBody {
                code: "invalid_request".to_string(),
                message: message.into(),
                negative: false,
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl QueryService {
    /// Run one request and shape its outcome
    pub async fn handle(&self, request: QueryRequest) -> QueryResponse {
        let op = request.op();
        tracing::debug!("Handling request: {}", op);

        match request {
            QueryRequest::FindPath {
                start,
                end,
                options,
            } => shape(op, self.find_path(&start, &end, options).await),
            QueryRequest::CommonAncestors { a, b, options } => {
                shape(op, self.find_common_ancestors(&a, &b, options).await)
            }
            QueryRequest::Classify { a, b, options } => {
                shape(op, self.classify_relationship(&a, &b, options).await)
            }
            QueryRequest::Ancestors { id, options } => {
                shape(op, self.ancestors(&id, options).await)
            }
        }
    }

    /// Parse and run a raw JSON request
    pub async fn handle_value(&self, value: serde_json::Value) -> QueryResponse {
        match serde_json::from_value::<QueryRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => QueryResponse::invalid_request(format!("Invalid request: {}", e)),
        }
    }

    /// Run several raw requests concurrently, answering in request order
    pub async fn handle_batch(&self, requests: Vec<serde_json::Value>) -> Vec<QueryResponse> {
        join_all(requests.into_iter().map(|value| self.handle_value(value))).await
    }
}

fn shape<T: Serialize>(op: &str, result: kindred_core::Result<T>) -> QueryResponse {
    match result {
        Ok(data) => QueryResponse::json(op, &data),
        Err(err) => QueryResponse::failure(Some(op), &err),
    }
}
