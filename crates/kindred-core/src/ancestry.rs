//! Nearest common ancestor resolution
//!
//! Each individual's ancestors are found generation by generation along
//! parent edges only. Generations are not pruned against earlier ones, so
//! cyclic data keeps producing ancestors until the depth cap trips instead
//! of being silently ignored.
//!
//! Common ancestor resolution expands both sides in step and stops as soon
//! as no deeper generation can beat the nearest meeting found, so bad data
//! far above a close relationship does not affect it.

use crate::budget::SearchBudget;
use crate::error::{Error, Result};
use crate::graph::Snapshot;
use crate::individual::IndividualId;
use crate::query::AncestorOptions;
use crate::relationship::{EdgeKind, EdgeKinds};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Non-biological edge kinds seen along a line of descent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lineage {
    pub adoptive: bool,
    pub step: bool,
}

impl Lineage {
    fn through(self, kind: EdgeKind) -> Self {
        Self {
            adoptive: self.adoptive || kind == EdgeKind::AdoptiveParent,
            step: self.step || kind == EdgeKind::StepParent,
        }
    }

    fn bit(self) -> u8 {
        1 << (self.adoptive as u8 | (self.step as u8) << 1)
    }

    fn from_slot(slot: u8) -> Self {
        Self {
            adoptive: slot & 1 != 0,
            step: slot & 2 != 0,
        }
    }

    pub fn is_biological(self) -> bool {
        !self.adoptive && !self.step
    }
}

/// Set of distinct lineages reaching one ancestor at minimal distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LineageSet(u8);

impl LineageSet {
    fn insert(&mut self, lineage: Lineage) {
        self.0 |= lineage.bit();
    }

    pub fn iter(self) -> impl Iterator<Item = Lineage> {
        (0u8..4)
            .filter(move |slot| self.0 & (1 << slot) != 0)
            .map(Lineage::from_slot)
    }
}

/// Minimal distance and lineages from one individual to an ancestor
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reach {
    pub generations: u32,
    pub lineages: LineageSet,
}

/// Every ancestor of one individual, including itself at distance 0
#[derive(Debug)]
pub(crate) struct AncestorMap {
    pub reach: HashMap<u32, Reach>,
}

impl AncestorMap {
    pub fn generations(&self, node: u32) -> Option<u32> {
        self.reach.get(&node).map(|r| r.generations)
    }
}

/// A common ancestor at minimal combined distance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonAncestor {
    pub ancestor: IndividualId,
    pub generations_a: u32,
    pub generations_b: u32,
    pub lineages_a: Vec<Lineage>,
    pub lineages_b: Vec<Lineage>,
}

/// Nearest common ancestors of two individuals
///
/// Holds more than one member under pedigree collapse or when both parents
/// are shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorSet {
    pub a: IndividualId,
    pub b: IndividualId,
    pub combined_distance: u32,
    pub members: Vec<CommonAncestor>,
}

impl AncestorSet {
    pub fn ancestors(&self) -> impl Iterator<Item = &IndividualId> {
        self.members.iter().map(|m| &m.ancestor)
    }
}

/// One ancestor of a single individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestor {
    pub ancestor: IndividualId,
    pub generations: u32,
    pub lineages: Vec<Lineage>,
}

/// Both ancestor maps and the minimal common members, by index
pub(crate) struct Resolution {
    pub a: u32,
    pub b: u32,
    pub map_a: AncestorMap,
    pub map_b: AncestorMap,
    /// (ancestor, generations from a, generations from b), ascending by ancestor
    pub members: Vec<(u32, u32, u32)>,
}

/// Ancestor resolution engine
pub struct AncestorResolver;

impl AncestorResolver {
    /// All ancestors of `id` ordered by (generations, id)
    pub fn ancestors(
        snapshot: &Snapshot,
        id: &IndividualId,
        options: &AncestorOptions,
        budget: &SearchBudget,
    ) -> Result<Vec<Ancestor>> {
        let origin = snapshot.require(id)?;
        let map = Self::ancestor_map(snapshot, origin, options, budget)?;

        let mut ancestors: Vec<(u32, u32, LineageSet)> = map
            .reach
            .iter()
            .filter(|(node, _)| **node != origin)
            .map(|(node, reach)| (reach.generations, *node, reach.lineages))
            .collect();
        ancestors.sort_unstable_by_key(|(generations, node, _)| (*generations, *node));

        Ok(ancestors
            .into_iter()
            .map(|(generations, node, lineages)| Ancestor {
                ancestor: snapshot.id_at(node).clone(),
                generations,
                lineages: lineages.iter().collect(),
            })
            .collect())
    }

    /// Nearest common ancestors of `a` and `b`
    ///
    /// Every individual present in both ancestor maps whose summed distance
    /// equals the minimum is returned. Fails with [`Error::NoCommonAncestor`]
    /// when the maps do not intersect.
    pub fn common_ancestors(
        snapshot: &Snapshot,
        a: &IndividualId,
        b: &IndividualId,
        options: &AncestorOptions,
        budget: &SearchBudget,
    ) -> Result<AncestorSet> {
        let resolution = Self::resolve(snapshot, a, b, options, budget)?;
        if resolution.members.is_empty() {
            return Err(Error::NoCommonAncestor {
                a: a.to_string(),
                b: b.to_string(),
            });
        }

        let members: Vec<CommonAncestor> = resolution
            .members
            .iter()
            .map(|&(node, ga, gb)| CommonAncestor {
                ancestor: snapshot.id_at(node).clone(),
                generations_a: ga,
                generations_b: gb,
                lineages_a: resolution.map_a.reach[&node].lineages.iter().collect(),
                lineages_b: resolution.map_b.reach[&node].lineages.iter().collect(),
            })
            .collect();

        let combined_distance = members[0].generations_a + members[0].generations_b;

        Ok(AncestorSet {
            a: a.clone(),
            b: b.clone(),
            combined_distance,
            members,
        })
    }

    /// Build both ancestor maps and intersect them
    pub(crate) fn resolve(
        snapshot: &Snapshot,
        a: &IndividualId,
        b: &IndividualId,
        options: &AncestorOptions,
        budget: &SearchBudget,
    ) -> Result<Resolution> {
        let ia = snapshot.require(a)?;
        let ib = snapshot.require(b)?;

        tracing::debug!(
            "Resolving common ancestors: a={}, b={}, kinds={}, max_depth={}",
            a,
            b,
            options.kinds.parent_kinds(),
            options.max_depth
        );

        let mut walk_a = AncestorWalk::new(snapshot, ia, options);
        let mut walk_b = AncestorWalk::new(snapshot, ib, options);
        let mut nearest = if ia == ib { 0 } else { u32::MAX };

        // An intersection not yet seen lies at least one generation past the
        // shallowest open side, so once `nearest` is below that the members
        // are final.
        loop {
            let bound = [&walk_a, &walk_b]
                .into_iter()
                .filter(|walk| !walk.is_exhausted())
                .map(|walk| walk.generation + 1)
                .min();
            match bound {
                Some(bound) if nearest >= bound => {}
                _ => break,
            }

            let expand_a = !walk_a.is_exhausted()
                && (walk_b.is_exhausted() || walk_a.generation <= walk_b.generation);
            nearest = if expand_a {
                let fresh = walk_a.step(budget)?;
                nearest.min(walk_a.nearest_meeting(&fresh, &walk_b))
            } else {
                let fresh = walk_b.step(budget)?;
                nearest.min(walk_b.nearest_meeting(&fresh, &walk_a))
            };
        }

        let map_a = walk_a.finish();
        let map_b = walk_b.finish();

        // iterate the smaller map
        let (small, large, small_is_a) = if map_a.reach.len() <= map_b.reach.len() {
            (&map_a, &map_b, true)
        } else {
            (&map_b, &map_a, false)
        };

        let mut best = u32::MAX;
        let mut members: Vec<(u32, u32, u32)> = Vec::new();
        for (&node, reach) in &small.reach {
            let Some(other) = large.generations(node) else {
                continue;
            };
            let (ga, gb) = if small_is_a {
                (reach.generations, other)
            } else {
                (other, reach.generations)
            };
            let sum = ga + gb;
            if sum < best {
                best = sum;
                members.clear();
            }
            if sum == best {
                members.push((node, ga, gb));
            }
        }
        members.sort_unstable();

        tracing::debug!(
            "Found {} common ancestors at combined distance {} ({} and {} ancestors scanned)",
            members.len(),
            best,
            map_a.reach.len(),
            map_b.reach.len()
        );

        Ok(Resolution {
            a: ia,
            b: ib,
            map_a,
            map_b,
            members,
        })
    }

    /// Minimal generations from `origin` to each of its ancestors
    pub(crate) fn ancestor_map(
        snapshot: &Snapshot,
        origin: u32,
        options: &AncestorOptions,
        budget: &SearchBudget,
    ) -> Result<AncestorMap> {
        let mut walk = AncestorWalk::new(snapshot, origin, options);
        while !walk.is_exhausted() {
            walk.step(budget)?;
        }
        Ok(walk.finish())
    }
}

/// Generation-by-generation expansion of one individual's ancestors
struct AncestorWalk<'a> {
    snapshot: &'a Snapshot,
    origin: u32,
    kinds: EdgeKinds,
    max_depth: u32,
    reach: HashMap<u32, Reach>,
    frontier: BTreeSet<(u32, Lineage)>,
    generation: u32,
}

impl<'a> AncestorWalk<'a> {
    fn new(snapshot: &'a Snapshot, origin: u32, options: &AncestorOptions) -> Self {
        let mut origin_set = LineageSet::default();
        origin_set.insert(Lineage::default());
        let mut reach = HashMap::new();
        reach.insert(
            origin,
            Reach {
                generations: 0,
                lineages: origin_set,
            },
        );

        let mut frontier = BTreeSet::new();
        frontier.insert((origin, Lineage::default()));

        Self {
            snapshot,
            origin,
            kinds: options.kinds.parent_kinds(),
            max_depth: options.max_depth,
            reach,
            frontier,
            generation: 0,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Expand one generation, returning the individuals first reached in it
    fn step(&mut self, budget: &SearchBudget) -> Result<Vec<u32>> {
        budget.check()?;

        let mut next: BTreeSet<(u32, Lineage)> = BTreeSet::new();
        for &(node, lineage) in &self.frontier {
            budget.tick()?;
            for link in self.snapshot.parent_links(node) {
                if self.kinds.contains(link.kind) {
                    next.insert((link.node, lineage.through(link.kind)));
                }
            }
        }

        if next.is_empty() {
            self.frontier.clear();
            return Ok(Vec::new());
        }

        let generation = self.generation + 1;
        let revisits_origin = next.iter().any(|(node, _)| *node == self.origin);
        if generation > self.max_depth || revisits_origin {
            let origin = self.snapshot.id_at(self.origin);
            tracing::warn!(
                "Ancestor search from {} stopped at generation {} (cycle={})",
                origin,
                generation,
                revisits_origin
            );
            return Err(Error::CycleOrDepthExceeded {
                individual: origin.to_string(),
                max_depth: self.max_depth,
            });
        }

        let mut fresh = Vec::new();
        for &(node, lineage) in &next {
            let entry = self.reach.entry(node).or_insert_with(|| {
                fresh.push(node);
                Reach {
                    generations: generation,
                    lineages: LineageSet::default(),
                }
            });
            if entry.generations == generation {
                entry.lineages.insert(lineage);
            }
        }

        self.generation = generation;
        self.frontier = next;
        Ok(fresh)
    }

    /// Smallest summed distance through any of `fresh` also reached by `other`
    fn nearest_meeting(&self, fresh: &[u32], other: &AncestorWalk<'_>) -> u32 {
        fresh
            .iter()
            .filter_map(|node| other.reach.get(node).map(|r| r.generations + self.generation))
            .min()
            .unwrap_or(u32::MAX)
    }

    fn finish(self) -> AncestorMap {
        AncestorMap { reach: self.reach }
    }
}
