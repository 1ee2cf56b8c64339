//! Individual (node) types

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier for an individual
///
/// Identifiers arrive as strings or integers; integers are kept in their
/// decimal string form. Ordering is lexicographic on that string form and
/// drives the deterministic traversal order of every search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IndividualId(pub String);

impl IndividualId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IndividualId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IndividualId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IndividualId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for IndividualId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<u64> for IndividualId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for IndividualId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Unsigned(n) => Self(n.to_string()),
            Raw::Signed(n) => Self(n.to_string()),
        })
    }
}

/// An individual in the genealogy graph
///
/// Carries identity only; names and other metadata live in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Individual {
    pub id: IndividualId,
}

impl Individual {
    pub fn new(id: impl Into<IndividualId>) -> Self {
        Self { id: id.into() }
    }
}

impl From<IndividualId> for Individual {
    fn from(id: IndividualId) -> Self {
        Self { id }
    }
}
