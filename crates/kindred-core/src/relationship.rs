//! Relationship (edge) types

use crate::error::{Error, Result};
use crate::individual::IndividualId;
use serde::{Deserialize, Serialize};

/// Kind of a relationship edge
///
/// Variant order is the tie-break order used when parallel edges of
/// different kinds connect the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    BiologicalParent,
    AdoptiveParent,
    StepParent,
    Partner,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::BiologicalParent,
        EdgeKind::AdoptiveParent,
        EdgeKind::StepParent,
        EdgeKind::Partner,
    ];

    /// Whether this is one of the directed parent kinds
    pub fn is_parent(self) -> bool {
        !matches!(self, EdgeKind::Partner)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::BiologicalParent => "biological-parent",
            EdgeKind::AdoptiveParent => "adoptive-parent",
            EdgeKind::StepParent => "step-parent",
            EdgeKind::Partner => "partner",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EdgeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "biological-parent" | "biological" | "parent" => Ok(EdgeKind::BiologicalParent),
            "adoptive-parent" | "adoptive" => Ok(EdgeKind::AdoptiveParent),
            "step-parent" | "step" => Ok(EdgeKind::StepParent),
            "partner" | "spouse" => Ok(EdgeKind::Partner),
            other => Err(Error::Validation(format!("Unknown edge kind: {}", other))),
        }
    }
}

/// Set of edge kinds allowed during a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKinds(u8);

impl EdgeKinds {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every kind, including partner edges
    pub const fn all() -> Self {
        Self(0b1111)
    }

    /// The three parent kinds
    pub const fn parents() -> Self {
        Self(0b0111)
    }

    /// Biological parent edges only
    pub const fn biological() -> Self {
        Self(0b0001)
    }

    pub fn with(mut self, kind: EdgeKind) -> Self {
        self.0 |= kind.bit();
        self
    }

    pub fn contains(self, kind: EdgeKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Restrict to parent kinds (ancestry never follows partner edges)
    pub fn parent_kinds(self) -> Self {
        Self(self.0 & Self::parents().0)
    }

    pub fn iter(self) -> impl Iterator<Item = EdgeKind> {
        EdgeKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl Default for EdgeKinds {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<EdgeKind> for EdgeKinds {
    fn from_iter<I: IntoIterator<Item = EdgeKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl std::str::FromStr for EdgeKinds {
    type Err = Error;

    /// Parse a comma-separated list of kinds or one of the presets
    /// `all`, `parents`, `biological-only`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "all" => return Ok(Self::all()),
            "parents" => return Ok(Self::parents()),
            "biological-only" => return Ok(Self::biological()),
            _ => {}
        }
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<EdgeKind>)
            .collect()
    }
}

impl std::fmt::Display for EdgeKinds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(EdgeKind::as_str).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for EdgeKinds {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for EdgeKinds {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let kinds = Vec::<EdgeKind>::deserialize(deserializer)?;
        Ok(kinds.into_iter().collect())
    }
}

/// Direction a path step moves in relative to the stored edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Child to parent
    Up,
    /// Parent to child
    Down,
    /// Between partners
    Across,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Across => "across",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed relationship edge between two individuals
///
/// For parent kinds `from` is the parent and `to` the child. Partner edges
/// are undirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from: IndividualId,
    pub to: IndividualId,
    pub kind: EdgeKind,

    /// Legally recognized (marriage, legal adoption)
    #[serde(default = "default_legal")]
    pub legal: bool,

    /// Optional confidence weight in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

fn default_legal() -> bool {
    true
}

impl RelationshipEdge {
    pub fn new(
        from: impl Into<IndividualId>,
        to: impl Into<IndividualId>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            legal: true,
            confidence: None,
        }
    }

    pub fn biological(parent: impl Into<IndividualId>, child: impl Into<IndividualId>) -> Self {
        Self::new(parent, child, EdgeKind::BiologicalParent)
    }

    pub fn adoptive(parent: impl Into<IndividualId>, child: impl Into<IndividualId>) -> Self {
        Self::new(parent, child, EdgeKind::AdoptiveParent)
    }

    pub fn step(parent: impl Into<IndividualId>, child: impl Into<IndividualId>) -> Self {
        Self::new(parent, child, EdgeKind::StepParent)
    }

    pub fn partners(a: impl Into<IndividualId>, b: impl Into<IndividualId>) -> Self {
        Self::new(a, b, EdgeKind::Partner)
    }

    pub fn with_legal(mut self, legal: bool) -> Self {
        self.legal = legal;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
