//! Immutable, indexed genealogy graph snapshot
//!
//! Individuals are sorted by id and assigned dense `u32` indices, so index
//! order equals id order. Parent, child and partner links are kept in
//! separate compressed sparse row arrays, giving O(1) lookup of each list.

use crate::error::{Error, Result};
use crate::individual::IndividualId;
use crate::limits::validate_confidence;
use crate::relationship::{Direction, EdgeKind, EdgeKinds, RelationshipEdge};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Raw load payload: the stable boundary with the ingestion pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub individuals: Vec<IndividualId>,
    #[serde(default)]
    pub edges: Vec<RelationshipEdge>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_individuals<I, T>(mut self, individuals: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IndividualId>,
    {
        self.individuals = individuals.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_edges(mut self, edges: Vec<RelationshipEdge>) -> Self {
        self.edges = edges;
        self
    }
}

/// Adjacency entry pointing at another individual by dense index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link {
    pub node: u32,
    pub kind: EdgeKind,
    pub legal: bool,
}

/// Compressed sparse row adjacency list
#[derive(Debug, Default)]
struct Adjacency {
    offsets: Vec<usize>,
    links: Vec<Link>,
}

impl Adjacency {
    fn from_rows(rows: Vec<Vec<Link>>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut links = Vec::with_capacity(rows.iter().map(Vec::len).sum());

        offsets.push(0);
        for mut row in rows {
            row.sort_by_key(|link| (link.node, link.kind));
            links.extend(row);
            offsets.push(links.len());
        }

        Self { offsets, links }
    }

    fn row(&self, idx: u32) -> &[Link] {
        let idx = idx as usize;
        &self.links[self.offsets[idx]..self.offsets[idx + 1]]
    }
}

/// A neighboring individual reached over one edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub individual: IndividualId,
    pub kind: EdgeKind,
    pub direction: Direction,
}

/// Summary counts for a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub individuals: usize,
    pub edges: usize,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
    /// Individuals with no recorded parents
    pub founders: usize,
    /// Individuals with more than two parent edges (adoption, step-parents)
    pub multi_parent: usize,
    pub max_parents: usize,
    pub max_children: usize,
}

/// Queryable graph snapshot
///
/// Immutable once built; share it behind `Arc` for concurrent readers.
#[derive(Debug)]
pub struct Snapshot {
    ids: Vec<IndividualId>,
    index: HashMap<IndividualId, u32>,
    parents: Adjacency,
    children: Adjacency,
    partners: Adjacency,
    edges: Vec<RelationshipEdge>,
}

impl Snapshot {
    /// Snapshot with no individuals
    pub fn empty() -> Self {
        Self {
            ids: Vec::new(),
            index: HashMap::new(),
            parents: Adjacency::from_rows(Vec::new()),
            children: Adjacency::from_rows(Vec::new()),
            partners: Adjacency::from_rows(Vec::new()),
            edges: Vec::new(),
        }
    }

    /// Build a snapshot from a set of individuals and typed edges
    pub fn load<I, T>(individuals: I, edges: Vec<RelationshipEdge>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<IndividualId>,
    {
        Self::build(GraphData::new().with_individuals(individuals).with_edges(edges))
    }

    /// Validate and index a load payload
    ///
    /// Fails with [`Error::InvalidGraph`] when an edge references an unknown
    /// individual, links an individual to itself, or carries a confidence
    /// outside [0, 1]. Identical edges are collapsed.
    pub fn build(data: GraphData) -> Result<Self> {
        let GraphData {
            mut individuals,
            edges,
        } = data;

        individuals.sort();
        individuals.dedup();

        if individuals.len() > u32::MAX as usize {
            return Err(Error::InvalidGraph(format!(
                "Too many individuals: {}",
                individuals.len()
            )));
        }

        let index: HashMap<IndividualId, u32> = individuals
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as u32))
            .collect();

        let n = individuals.len();
        let mut parent_rows: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut child_rows: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut partner_rows: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut seen: HashSet<(u32, u32, EdgeKind)> = HashSet::with_capacity(edges.len());
        let mut kept = Vec::with_capacity(edges.len());

        for edge in edges {
            let from = *index.get(&edge.from).ok_or_else(|| {
                Error::InvalidGraph(format!("Edge references unknown individual: {}", edge.from))
            })?;
            let to = *index.get(&edge.to).ok_or_else(|| {
                Error::InvalidGraph(format!("Edge references unknown individual: {}", edge.to))
            })?;

            if from == to {
                return Err(Error::InvalidGraph(format!(
                    "Edge links {} to itself",
                    edge.from
                )));
            }
            if let Some(confidence) = edge.confidence {
                validate_confidence(confidence)
                    .map_err(|e| Error::InvalidGraph(format!("{} -> {}: {}", edge.from, edge.to, e)))?;
            }

            let key = if edge.kind == EdgeKind::Partner {
                (from.min(to), from.max(to), edge.kind)
            } else {
                (from, to, edge.kind)
            };
            if !seen.insert(key) {
                tracing::trace!("Collapsing duplicate edge {} -[{}]-> {}", edge.from, edge.kind, edge.to);
                continue;
            }

            let (kind, legal) = (edge.kind, edge.legal);
            if kind.is_parent() {
                parent_rows[to as usize].push(Link { node: from, kind, legal });
                child_rows[from as usize].push(Link { node: to, kind, legal });
            } else {
                partner_rows[from as usize].push(Link { node: to, kind, legal });
                partner_rows[to as usize].push(Link { node: from, kind, legal });
            }
            kept.push(edge);
        }

        tracing::debug!(
            "Built snapshot with {} individuals and {} edges",
            individuals.len(),
            kept.len()
        );

        Ok(Self {
            ids: individuals,
            index,
            parents: Adjacency::from_rows(parent_rows),
            children: Adjacency::from_rows(child_rows),
            partners: Adjacency::from_rows(partner_rows),
            edges: kept,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &IndividualId) -> bool {
        self.index.contains_key(id)
    }

    /// Individuals in ascending id order
    pub fn individuals(&self) -> impl Iterator<Item = &IndividualId> {
        self.ids.iter()
    }

    /// Copy the snapshot contents back into a load payload
    pub fn to_data(&self) -> GraphData {
        GraphData {
            individuals: self.ids.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Neighbors over the allowed kinds, in ascending (individual, kind) order
    pub fn neighbors(&self, id: &IndividualId, kinds: EdgeKinds) -> Result<Vec<Neighbor>> {
        let idx = self.require(id)?;
        let mut buf = Vec::new();
        self.collect_links(idx, kinds, &mut buf);
        Ok(buf
            .into_iter()
            .map(|(node, kind, direction)| Neighbor {
                individual: self.id_at(node).clone(),
                kind,
                direction,
            })
            .collect())
    }

    pub fn parents(&self, id: &IndividualId) -> Result<Vec<(IndividualId, EdgeKind)>> {
        let idx = self.require(id)?;
        Ok(self.resolve(self.parent_links(idx)))
    }

    pub fn children(&self, id: &IndividualId) -> Result<Vec<(IndividualId, EdgeKind)>> {
        let idx = self.require(id)?;
        Ok(self.resolve(self.child_links(idx)))
    }

    pub fn partners(&self, id: &IndividualId) -> Result<Vec<(IndividualId, EdgeKind)>> {
        let idx = self.require(id)?;
        Ok(self.resolve(self.partner_links(idx)))
    }

    pub fn stats(&self) -> SnapshotStats {
        let mut edges_by_kind = BTreeMap::new();
        for edge in &self.edges {
            *edges_by_kind.entry(edge.kind).or_insert(0) += 1;
        }

        let mut stats = SnapshotStats {
            individuals: self.len(),
            edges: self.edge_count(),
            edges_by_kind,
            ..Default::default()
        };

        for idx in 0..self.len() as u32 {
            let parent_count = self.parent_links(idx).len();
            if parent_count == 0 {
                stats.founders += 1;
            }
            if parent_count > 2 {
                stats.multi_parent += 1;
            }
            stats.max_parents = stats.max_parents.max(parent_count);
            stats.max_children = stats.max_children.max(self.child_links(idx).len());
        }

        stats
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Index-level access for the search algorithms
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn index_of(&self, id: &IndividualId) -> Option<u32> {
        self.index.get(id).copied()
    }

    pub(crate) fn require(&self, id: &IndividualId) -> Result<u32> {
        self.index_of(id)
            .ok_or_else(|| Error::UnknownIndividual(id.to_string()))
    }

    pub(crate) fn id_at(&self, idx: u32) -> &IndividualId {
        &self.ids[idx as usize]
    }

    pub(crate) fn parent_links(&self, idx: u32) -> &[Link] {
        self.parents.row(idx)
    }

    pub(crate) fn child_links(&self, idx: u32) -> &[Link] {
        self.children.row(idx)
    }

    pub(crate) fn partner_links(&self, idx: u32) -> &[Link] {
        self.partners.row(idx)
    }

    /// Fill `buf` with every allowed link of `idx`, sorted by (node, kind)
    pub(crate) fn collect_links(
        &self,
        idx: u32,
        kinds: EdgeKinds,
        buf: &mut Vec<(u32, EdgeKind, Direction)>,
    ) {
        buf.clear();
        let rows = [
            (self.parent_links(idx), Direction::Up),
            (self.child_links(idx), Direction::Down),
            (self.partner_links(idx), Direction::Across),
        ];
        for (links, direction) in rows {
            buf.extend(
                links
                    .iter()
                    .filter(|link| kinds.contains(link.kind))
                    .map(|link| (link.node, link.kind, direction)),
            );
        }
        buf.sort_unstable();
    }

    fn resolve(&self, links: &[Link]) -> Vec<(IndividualId, EdgeKind)> {
        links
            .iter()
            .map(|link| (self.id_at(link.node).clone(), link.kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> IndividualId {
        IndividualId::from(s)
    }

    fn family() -> Snapshot {
        Snapshot::load(
            ["mum", "dad", "kid", "stepdad"],
            vec![
                RelationshipEdge::biological("mum", "kid"),
                RelationshipEdge::biological("dad", "kid"),
                RelationshipEdge::step("stepdad", "kid"),
                RelationshipEdge::partners("mum", "stepdad"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_adjacency_lookup() {
        let snapshot = family();
        let parents = snapshot.parents(&id("kid")).unwrap();
        assert_eq!(
            parents,
            vec![
                (id("dad"), EdgeKind::BiologicalParent),
                (id("mum"), EdgeKind::BiologicalParent),
                (id("stepdad"), EdgeKind::StepParent),
            ]
        );
        assert_eq!(
            snapshot.children(&id("mum")).unwrap(),
            vec![(id("kid"), EdgeKind::BiologicalParent)]
        );
        assert_eq!(
            snapshot.partners(&id("stepdad")).unwrap(),
            vec![(id("mum"), EdgeKind::Partner)]
        );
    }

    #[test]
    fn test_neighbors_filtered_by_kind() {
        let snapshot = family();
        let neighbors = snapshot
            .neighbors(&id("kid"), EdgeKinds::biological())
            .unwrap();
        let ids: Vec<&str> = neighbors.iter().map(|n| n.individual.as_str()).collect();
        assert_eq!(ids, vec!["dad", "mum"]);
        assert!(neighbors.iter().all(|n| n.direction == Direction::Up));

        let mum = snapshot.neighbors(&id("mum"), EdgeKinds::all()).unwrap();
        assert_eq!(mum.len(), 2);
        assert_eq!(mum[0].direction, Direction::Down);
        assert_eq!(mum[1].direction, Direction::Across);
    }

    #[test]
    fn test_unknown_reference_is_invalid() {
        let result = Snapshot::load(["a"], vec![RelationshipEdge::biological("a", "ghost")]);
        assert!(matches!(result, Err(Error::InvalidGraph(_))));
    }

    #[test]
    fn test_self_edge_is_invalid() {
        let result = Snapshot::load(["a"], vec![RelationshipEdge::partners("a", "a")]);
        assert!(matches!(result, Err(Error::InvalidGraph(_))));
    }

    #[test]
    fn test_bad_confidence_is_invalid() {
        let result = Snapshot::load(
            ["a", "b"],
            vec![RelationshipEdge::biological("a", "b").with_confidence(2.0)],
        );
        assert!(matches!(result, Err(Error::InvalidGraph(_))));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let snapshot = Snapshot::load(
            ["a", "b"],
            vec![
                RelationshipEdge::biological("a", "b"),
                RelationshipEdge::biological("a", "b"),
                RelationshipEdge::partners("a", "b"),
                RelationshipEdge::partners("b", "a"),
            ],
        )
        .unwrap();
        assert_eq!(snapshot.edge_count(), 2);
    }

    #[test]
    fn test_unknown_individual_lookup() {
        let snapshot = family();
        assert!(matches!(
            snapshot.parents(&id("nobody")),
            Err(Error::UnknownIndividual(_))
        ));
    }

    #[test]
    fn test_stats() {
        let stats = family().stats();
        assert_eq!(stats.individuals, 4);
        assert_eq!(stats.edges, 4);
        assert_eq!(stats.founders, 3);
        assert_eq!(stats.multi_parent, 1);
        assert_eq!(stats.max_parents, 3);
        assert_eq!(stats.edges_by_kind.get(&EdgeKind::BiologicalParent), Some(&2));
    }
}
