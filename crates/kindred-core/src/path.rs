//! Shortest connecting paths between two individuals
//!
//! Bidirectional breadth-first search over parent, child and partner edges,
//! traversed in both directions regardless of how they are stored.
//!
//! Tie-break: each frontier is expanded in ascending individual order and
//! each individual's links in ascending (individual, kind) order; the first
//! discoverer of an individual becomes its predecessor. When a layer meets
//! the opposite search, the meeting with the smallest total length wins,
//! ties going to the lowest meeting individual. Results are therefore stable
//! for a given snapshot.

use crate::budget::SearchBudget;
use crate::error::{Error, Result};
use crate::graph::Snapshot;
use crate::individual::IndividualId;
use crate::query::PathOptions;
use crate::relationship::{Direction, EdgeKind, EdgeKinds};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// How a path step was reached from the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub kind: EdgeKind,
    pub direction: Direction,
}

/// One individual along a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub individual: IndividualId,

    /// Edge traversed to arrive here (None for the first step)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<Hop>,
}

/// A connecting path between two individuals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub start: IndividualId,
    pub end: IndividualId,
    pub steps: Vec<PathStep>,

    /// Number of edges traversed
    pub length: usize,
}

impl Path {
    /// Path of length zero from an individual to itself
    pub fn zero(id: IndividualId) -> Self {
        Self {
            start: id.clone(),
            end: id.clone(),
            steps: vec![PathStep {
                individual: id,
                via: None,
            }],
            length: 0,
        }
    }

    /// Individuals in path order
    pub fn individuals(&self) -> impl Iterator<Item = &IndividualId> {
        self.steps.iter().map(|step| &step.individual)
    }

    /// Edge kinds traversed, in path order
    pub fn kinds(&self) -> impl Iterator<Item = EdgeKind> + '_ {
        self.steps.iter().filter_map(|step| step.via.map(|hop| hop.kind))
    }

    fn from_nodes(snapshot: &Snapshot, nodes: &[(u32, Option<Hop>)]) -> Self {
        let steps: Vec<PathStep> = nodes
            .iter()
            .map(|(node, via)| PathStep {
                individual: snapshot.id_at(*node).clone(),
                via: *via,
            })
            .collect();
        Self {
            start: steps[0].individual.clone(),
            end: steps[steps.len() - 1].individual.clone(),
            length: steps.len() - 1,
            steps,
        }
    }
}

/// All equal-length shortest paths (up to a limit)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSet {
    pub length: usize,
    pub paths: Vec<Path>,

    /// More shortest paths exist beyond the returned ones
    pub truncated: bool,
}

/// Search statistics, reported through tracing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub individuals_expanded: usize,
    pub edges_scanned: usize,
    pub layers: u32,
}

type Predecessor = Option<(u32, EdgeKind, Direction)>;

/// One half of the bidirectional search
struct Side {
    visited: HashMap<u32, (u32, Predecessor)>,
    frontier: Vec<u32>,
    depth: u32,
}

impl Side {
    fn new(origin: u32) -> Self {
        let mut visited = HashMap::new();
        visited.insert(origin, (0, None));
        Self {
            visited,
            frontier: vec![origin],
            depth: 0,
        }
    }

    fn distance(&self, node: u32) -> Option<u32> {
        self.visited.get(&node).map(|(dist, _)| *dist)
    }

    /// Expand one full layer; returns the best meeting (total length, node)
    fn expand(
        &mut self,
        snapshot: &Snapshot,
        other: &Side,
        kinds: EdgeKinds,
        budget: &SearchBudget,
        stats: &mut SearchStats,
    ) -> Result<Option<(u32, u32)>> {
        let mut next = Vec::new();
        let mut best: Option<(u32, u32)> = None;
        let mut links = Vec::new();
        let next_depth = self.depth + 1;

        for &node in &self.frontier {
            budget.tick()?;
            stats.individuals_expanded += 1;
            snapshot.collect_links(node, kinds, &mut links);

            for &(neighbor, kind, direction) in &links {
                stats.edges_scanned += 1;
                if self.visited.contains_key(&neighbor) {
                    continue;
                }
                self.visited
                    .insert(neighbor, (next_depth, Some((node, kind, direction))));
                next.push(neighbor);

                if let Some(other_dist) = other.distance(neighbor) {
                    let candidate = (next_depth + other_dist, neighbor);
                    if best.map_or(true, |current| candidate < current) {
                        best = Some(candidate);
                    }
                }
            }
        }

        next.sort_unstable();
        self.frontier = next;
        self.depth = next_depth;
        stats.layers += 1;
        Ok(best)
    }

    /// Chain of (node, predecessor entry) from `node` back to the origin
    fn chain(&self, mut node: u32) -> Vec<(u32, Predecessor)> {
        let mut chain = Vec::new();
        while let Some((_, pred)) = self.visited.get(&node) {
            chain.push((node, *pred));
            match pred {
                Some((prev, _, _)) => node = *prev,
                None => break,
            }
        }
        chain
    }
}

fn reverse(direction: Direction) -> Direction {
    match direction {
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
        Direction::Across => Direction::Across,
    }
}

/// Path finding engine
pub struct PathFinder;

impl PathFinder {
    /// Shortest connecting path between `start` and `end`
    ///
    /// Returns a zero-length path when `start == end`, [`Error::NotConnected`]
    /// when the individuals lie in different components and
    /// [`Error::CycleOrDepthExceeded`] when no path of at most
    /// `options.max_depth` edges exists but the search could continue.
    pub fn shortest_path(
        snapshot: &Snapshot,
        start: &IndividualId,
        end: &IndividualId,
        options: &PathOptions,
        budget: &SearchBudget,
    ) -> Result<Path> {
        let s = snapshot.require(start)?;
        let t = snapshot.require(end)?;

        tracing::debug!(
            "Finding path: start={}, end={}, kinds={}, max_depth={}",
            start,
            end,
            options.kinds,
            options.max_depth
        );

        if s == t {
            return Ok(Path::zero(start.clone()));
        }

        let mut forward = Side::new(s);
        let mut backward = Side::new(t);
        let mut stats = SearchStats::default();

        loop {
            budget.check()?;

            if forward.frontier.is_empty() || backward.frontier.is_empty() {
                tracing::debug!(
                    "No path after expanding {} individuals",
                    stats.individuals_expanded
                );
                return Err(Error::NotConnected {
                    from: start.to_string(),
                    to: end.to_string(),
                });
            }

            if forward.depth + backward.depth >= options.max_depth {
                return Err(Error::CycleOrDepthExceeded {
                    individual: start.to_string(),
                    max_depth: options.max_depth,
                });
            }

            let meeting = if forward.frontier.len() <= backward.frontier.len() {
                forward.expand(snapshot, &backward, options.kinds, budget, &mut stats)?
            } else {
                backward.expand(snapshot, &forward, options.kinds, budget, &mut stats)?
            };

            if let Some((length, node)) = meeting {
                tracing::debug!(
                    "Path of length {} found via {} ({} individuals expanded, {} edges scanned)",
                    length,
                    snapshot.id_at(node),
                    stats.individuals_expanded,
                    stats.edges_scanned
                );
                return Ok(Self::join(snapshot, &forward, &backward, node));
            }
        }
    }

    /// Every shortest path between `start` and `end`, up to `options.max_paths`
    ///
    /// Paths are ordered lexicographically by their individual sequence.
    pub fn shortest_paths(
        snapshot: &Snapshot,
        start: &IndividualId,
        end: &IndividualId,
        options: &PathOptions,
        budget: &SearchBudget,
    ) -> Result<PathSet> {
        let first = Self::shortest_path(snapshot, start, end, options, budget)?;
        let length = first.length;
        if length == 0 {
            return Ok(PathSet {
                length,
                paths: vec![first],
                truncated: false,
            });
        }
        let max_paths = options.max_paths.max(1);

        let s = snapshot.require(start)?;
        let t = snapshot.require(end)?;
        let limit = length as u32;
        let from_start = Self::distances(snapshot, s, options.kinds, limit, budget)?;
        let from_end = Self::distances(snapshot, t, options.kinds, limit, budget)?;

        let mut enumeration = Enumeration {
            snapshot,
            kinds: options.kinds,
            from_start: &from_start,
            from_end: &from_end,
            length: limit,
            // one extra to detect truncation
            wanted: max_paths + 1,
            current: vec![(s, None)],
            found: Vec::new(),
            links: Vec::new(),
        };
        enumeration.walk(s, budget)?;

        let truncated = enumeration.found.len() > max_paths;
        let mut paths = enumeration.found;
        paths.truncate(max_paths);

        tracing::debug!("Enumerated {} shortest paths of length {}", paths.len(), length);

        Ok(PathSet {
            length,
            paths,
            truncated,
        })
    }

    /// Breadth-first distances from `origin`, up to `limit` edges
    fn distances(
        snapshot: &Snapshot,
        origin: u32,
        kinds: EdgeKinds,
        limit: u32,
        budget: &SearchBudget,
    ) -> Result<HashMap<u32, u32>> {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::new();
        let mut links = Vec::new();

        dist.insert(origin, 0);
        queue.push_back(origin);

        while let Some(node) = queue.pop_front() {
            budget.tick()?;
            let d = dist[&node];
            if d >= limit {
                continue;
            }
            snapshot.collect_links(node, kinds, &mut links);
            for &(neighbor, _, _) in &links {
                if !dist.contains_key(&neighbor) {
                    dist.insert(neighbor, d + 1);
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(dist)
    }

    fn join(snapshot: &Snapshot, forward: &Side, backward: &Side, meeting: u32) -> Path {
        let mut nodes: Vec<(u32, Option<Hop>)> = forward
            .chain(meeting)
            .into_iter()
            .rev()
            .map(|(node, pred)| {
                (
                    node,
                    pred.map(|(_, kind, direction)| Hop { kind, direction }),
                )
            })
            .collect();

        for (_, pred) in backward.chain(meeting) {
            if let Some((next, kind, direction)) = pred {
                nodes.push((
                    next,
                    Some(Hop {
                        kind,
                        direction: reverse(direction),
                    }),
                ));
            }
        }

        Path::from_nodes(snapshot, &nodes)
    }
}

/// Depth-first enumeration over the shortest-path layer structure
struct Enumeration<'a> {
    snapshot: &'a Snapshot,
    kinds: EdgeKinds,
    from_start: &'a HashMap<u32, u32>,
    from_end: &'a HashMap<u32, u32>,
    length: u32,
    wanted: usize,
    current: Vec<(u32, Option<Hop>)>,
    found: Vec<Path>,
    links: Vec<(u32, EdgeKind, Direction)>,
}

impl Enumeration<'_> {
    fn walk(&mut self, node: u32, budget: &SearchBudget) -> Result<()> {
        budget.tick()?;
        let depth = self.from_start[&node];
        if depth == self.length {
            self.found.push(Path::from_nodes(self.snapshot, &self.current));
            return Ok(());
        }

        self.snapshot.collect_links(node, self.kinds, &mut self.links);
        let mut candidates: Vec<(u32, Hop)> = Vec::new();
        for &(neighbor, kind, direction) in &self.links {
            if candidates.last().is_some_and(|(last, _)| *last == neighbor) {
                continue;
            }
            let on_layer = self.from_start.get(&neighbor) == Some(&(depth + 1))
                && self.from_end.get(&neighbor) == Some(&(self.length - depth - 1));
            if on_layer {
                candidates.push((neighbor, Hop { kind, direction }));
            }
        }

        for (neighbor, hop) in candidates {
            if self.found.len() >= self.wanted {
                break;
            }
            self.current.push((neighbor, Some(hop)));
            self.walk(neighbor, budget)?;
            self.current.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::RelationshipEdge;

    fn id(s: &str) -> IndividualId {
        IndividualId::from(s)
    }

    fn ids(path: &Path) -> Vec<&str> {
        path.individuals().map(IndividualId::as_str).collect()
    }

    fn find(snapshot: &Snapshot, a: &str, b: &str) -> Result<Path> {
        PathFinder::shortest_path(
            snapshot,
            &id(a),
            &id(b),
            &PathOptions::default(),
            &SearchBudget::unlimited(),
        )
    }

    /// Two grandparents, two children (siblings), one grandchild each,
    /// and an unrelated loner.
    fn cousins() -> Snapshot {
        Snapshot::load(
            ["gma", "gpa", "p1", "p2", "c1", "c2", "loner"],
            vec![
                RelationshipEdge::biological("gma", "p1"),
                RelationshipEdge::biological("gpa", "p1"),
                RelationshipEdge::biological("gma", "p2"),
                RelationshipEdge::biological("gpa", "p2"),
                RelationshipEdge::biological("p1", "c1"),
                RelationshipEdge::biological("p2", "c2"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_self_path_has_zero_length() {
        let snapshot = cousins();
        let path = find(&snapshot, "c1", "c1").unwrap();
        assert_eq!(path.length, 0);
        assert_eq!(ids(&path), vec!["c1"]);
        assert!(path.steps[0].via.is_none());
    }

    #[test]
    fn test_cousin_path_goes_through_lowest_grandparent() {
        let snapshot = cousins();
        let path = find(&snapshot, "c1", "c2").unwrap();

        assert_eq!(path.length, 4);
        assert_eq!(ids(&path), vec!["c1", "p1", "gma", "p2", "c2"]);

        let directions: Vec<Direction> = path
            .steps
            .iter()
            .filter_map(|s| s.via.map(|h| h.direction))
            .collect();
        assert_eq!(
            directions,
            vec![Direction::Up, Direction::Up, Direction::Down, Direction::Down]
        );
    }

    #[test]
    fn test_path_length_is_symmetric() {
        let snapshot = cousins();
        for (a, b) in [("c1", "c2"), ("gma", "c2"), ("p1", "c2"), ("gpa", "gma")] {
            let there = find(&snapshot, a, b).unwrap();
            let back = find(&snapshot, b, a).unwrap();
            assert_eq!(there.length, back.length, "{} <-> {}", a, b);
        }
    }

    #[test]
    fn test_disconnected_is_not_connected() {
        let snapshot = cousins();
        let err = find(&snapshot, "c1", "loner").unwrap_err();
        assert!(matches!(err, Error::NotConnected { .. }));
    }

    #[test]
    fn test_unknown_individual() {
        let snapshot = cousins();
        let err = find(&snapshot, "c1", "ghost").unwrap_err();
        assert!(matches!(err, Error::UnknownIndividual(_)));
    }

    #[test]
    fn test_partner_edges_connect_in_laws() {
        let snapshot = Snapshot::load(
            ["a", "b", "a_mum", "b_dad"],
            vec![
                RelationshipEdge::partners("a", "b"),
                RelationshipEdge::biological("a_mum", "a"),
                RelationshipEdge::biological("b_dad", "b"),
            ],
        )
        .unwrap();

        let path = find(&snapshot, "a_mum", "b_dad").unwrap();
        assert_eq!(ids(&path), vec!["a_mum", "a", "b", "b_dad"]);
        assert_eq!(path.steps[2].via.unwrap().direction, Direction::Across);

        let biological_only = PathFinder::shortest_path(
            &snapshot,
            &id("a_mum"),
            &id("b_dad"),
            &PathOptions::new().with_kinds(EdgeKinds::biological()),
            &SearchBudget::unlimited(),
        );
        assert!(matches!(biological_only, Err(Error::NotConnected { .. })));
    }

    #[test]
    fn test_depth_cap() {
        let snapshot = cousins();
        let result = PathFinder::shortest_path(
            &snapshot,
            &id("c1"),
            &id("c2"),
            &PathOptions::new().with_depth(3),
            &SearchBudget::unlimited(),
        );
        assert!(matches!(result, Err(Error::CycleOrDepthExceeded { .. })));
    }

    #[test]
    fn test_cyclic_data_terminates() {
        let snapshot = Snapshot::load(
            ["a", "b", "c"],
            vec![
                RelationshipEdge::biological("a", "b"),
                RelationshipEdge::biological("b", "a"),
            ],
        )
        .unwrap();
        assert!(matches!(
            find(&snapshot, "a", "c"),
            Err(Error::NotConnected { .. })
        ));
        assert_eq!(find(&snapshot, "a", "b").unwrap().length, 1);
    }

    #[test]
    fn test_parallel_edges_prefer_biological() {
        let snapshot = Snapshot::load(
            ["p", "c"],
            vec![
                RelationshipEdge::step("p", "c"),
                RelationshipEdge::biological("p", "c"),
            ],
        )
        .unwrap();
        let path = find(&snapshot, "c", "p").unwrap();
        assert_eq!(path.kinds().collect::<Vec<_>>(), vec![EdgeKind::BiologicalParent]);
    }

    #[test]
    fn test_all_shortest_paths() {
        let snapshot = cousins();
        let set = PathFinder::shortest_paths(
            &snapshot,
            &id("c1"),
            &id("c2"),
            &PathOptions::default(),
            &SearchBudget::unlimited(),
        )
        .unwrap();

        assert_eq!(set.length, 4);
        assert!(!set.truncated);
        let all: Vec<Vec<&str>> = set.paths.iter().map(ids).collect();
        assert_eq!(
            all,
            vec![
                vec!["c1", "p1", "gma", "p2", "c2"],
                vec!["c1", "p1", "gpa", "p2", "c2"],
            ]
        );

        let limited = PathFinder::shortest_paths(
            &snapshot,
            &id("c1"),
            &id("c2"),
            &PathOptions::new().with_max_paths(1),
            &SearchBudget::unlimited(),
        )
        .unwrap();
        assert_eq!(limited.paths.len(), 1);
        assert!(limited.truncated);
    }

    #[test]
    fn test_cancelled_search() {
        let snapshot = cousins();
        let token = crate::budget::CancellationToken::new();
        token.cancel();
        let result = PathFinder::shortest_path(
            &snapshot,
            &id("c1"),
            &id("c2"),
            &PathOptions::default(),
            &SearchBudget::unlimited().with_token(token),
        );
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
