//! Relationship classification
//!
//! Labels describe how `a` relates to `b` ("a is b's aunt/uncle"), derived
//! from the generations each side climbs to a nearest common ancestor.
//!
//! Qualifiers attach to the whole relationship whichever leg carries them
//! and never change the removed-by count. Step relations are never also
//! reported as half relations.

use crate::ancestry::{AncestorMap, AncestorResolver, Resolution};
use crate::budget::SearchBudget;
use crate::error::{Error, Result};
use crate::graph::Snapshot;
use crate::individual::IndividualId;
use crate::label;
use crate::query::AncestorOptions;
use crate::relationship::{EdgeKind, EdgeKinds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Broad shape of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    #[serde(rename = "self")]
    SelfRelation,
    Ancestor,
    Descendant,
    Sibling,
    AuntUncle,
    NieceNephew,
    Cousin,
    Partner,
}

/// Qualifiers on top of the generational relationship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Qualifiers {
    pub half: bool,
    pub step: bool,
    pub adoptive: bool,
}

impl Qualifiers {
    pub fn is_empty(&self) -> bool {
        !self.half && !self.step && !self.adoptive
    }

    fn count(&self) -> u8 {
        self.half as u8 + self.step as u8 + self.adoptive as u8
    }

    /// Prefix a base label: `adoptive `, then `step-`, then `half-`
    fn apply(&self, base: &str) -> String {
        let mut label = String::new();
        if self.adoptive {
            label.push_str("adoptive ");
        }
        if self.step {
            label.push_str("step-");
        }
        if self.half {
            label.push_str("half-");
        }
        label.push_str(base);
        label
    }
}

/// One interpretation of how `a` relates to `b`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipResult {
    pub label: String,
    pub kind: RelationshipKind,

    /// Generations from a and from b up to the common ancestor
    pub generations: (u32, u32),

    /// min(generations)
    pub degree: u32,

    /// Cousin level (1 = first cousin), cousins only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cousin_level: Option<u32>,

    /// |generations.0 - generations.1|
    pub removed: u32,

    pub qualifiers: Qualifiers,

    /// Common ancestors supporting this interpretation
    pub via: Vec<IndividualId>,
}

/// Every distinct relationship between two individuals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub a: IndividualId,
    pub b: IndividualId,
    pub results: Vec<RelationshipResult>,
}

impl Classification {
    /// More than one distinct interpretation exists
    pub fn is_ambiguous(&self) -> bool {
        self.results.len() > 1
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.label.as_str())
    }
}

/// Relationship classification engine
pub struct RelationshipClassifier;

impl RelationshipClassifier {
    /// Classify how `a` relates to `b`
    ///
    /// Multiple equally-near ancestors that yield different labels or
    /// qualifiers all appear in the result. A direct partner edge adds a
    /// `partner` (or `spouse`, when legal) result. Fails with
    /// [`Error::NoCommonAncestor`] when nothing relates the two.
    pub fn classify(
        snapshot: &Snapshot,
        a: &IndividualId,
        b: &IndividualId,
        options: &AncestorOptions,
        budget: &SearchBudget,
    ) -> Result<Classification> {
        let resolution = AncestorResolver::resolve(snapshot, a, b, options, budget)?;
        let kinds = options.kinds.parent_kinds();

        let mut results: Vec<RelationshipResult> = Vec::new();
        for &(node, ga, gb) in &resolution.members {
            let half = Self::is_half(snapshot, &resolution, kinds, node, ga, gb);
            let lineages_a = resolution.map_a.reach[&node].lineages;
            let lineages_b = resolution.map_b.reach[&node].lineages;

            for la in lineages_a.iter() {
                for lb in lineages_b.iter() {
                    let step = la.step || lb.step;
                    let qualifiers = Qualifiers {
                        half: half && !step,
                        step,
                        adoptive: la.adoptive || lb.adoptive,
                    };
                    let candidate = Self::describe(ga, gb, qualifiers);
                    Self::merge(&mut results, candidate, snapshot.id_at(node));
                }
            }
        }

        if resolution.a != resolution.b {
            if let Some(link) = snapshot
                .partner_links(resolution.a)
                .iter()
                .find(|link| link.node == resolution.b && link.kind == EdgeKind::Partner)
            {
                results.push(RelationshipResult {
                    label: if link.legal { "spouse" } else { "partner" }.to_string(),
                    kind: RelationshipKind::Partner,
                    generations: (0, 0),
                    degree: 0,
                    cousin_level: None,
                    removed: 0,
                    qualifiers: Qualifiers::default(),
                    via: Vec::new(),
                });
            }
        }

        if results.is_empty() {
            return Err(Error::NoCommonAncestor {
                a: a.to_string(),
                b: b.to_string(),
            });
        }

        results.sort_by(|x, y| {
            (x.kind == RelationshipKind::Partner, x.qualifiers.count(), &x.label).cmp(&(
                y.kind == RelationshipKind::Partner,
                y.qualifiers.count(),
                &y.label,
            ))
        });

        tracing::debug!(
            "Classified {} -> {}: {}",
            a,
            b,
            results
                .iter()
                .map(|r| r.label.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        );

        Ok(Classification {
            a: a.clone(),
            b: b.clone(),
            results,
        })
    }

    /// Label and degree numbers for a generation pair
    fn describe(ga: u32, gb: u32, qualifiers: Qualifiers) -> RelationshipResult {
        let (kind, base) = match (ga, gb) {
            (0, 0) => (RelationshipKind::SelfRelation, "self".to_string()),
            (0, n) => (RelationshipKind::Ancestor, label::ancestor(n)),
            (n, 0) => (RelationshipKind::Descendant, label::descendant(n)),
            (1, 1) => (RelationshipKind::Sibling, "sibling".to_string()),
            (1, n) => (RelationshipKind::AuntUncle, label::aunt_uncle(n - 1)),
            (n, 1) => (RelationshipKind::NieceNephew, label::niece_nephew(n - 1)),
            (x, y) => (RelationshipKind::Cousin, label::cousin(x.min(y) - 1, x.abs_diff(y))),
        };

        let degree = ga.min(gb);
        RelationshipResult {
            label: qualifiers.apply(&base),
            kind,
            generations: (ga, gb),
            degree,
            cousin_level: (kind == RelationshipKind::Cousin).then(|| degree - 1),
            removed: ga.abs_diff(gb),
            qualifiers,
            via: Vec::new(),
        }
    }

    fn merge(results: &mut Vec<RelationshipResult>, candidate: RelationshipResult, via: &IndividualId) {
        let existing = results.iter_mut().find(|r| {
            r.label == candidate.label
                && r.generations == candidate.generations
                && r.qualifiers == candidate.qualifiers
        });
        match existing {
            Some(result) => {
                if !result.via.contains(via) {
                    result.via.push(via.clone());
                }
            }
            None => {
                let mut candidate = candidate;
                candidate.via.push(via.clone());
                results.push(candidate);
            }
        }
    }

    /// A collateral relation through `node` is half unless another member
    /// at the same generations is also a parent of the same leg children on
    /// both sides.
    fn is_half(
        snapshot: &Snapshot,
        resolution: &Resolution,
        kinds: EdgeKinds,
        node: u32,
        ga: u32,
        gb: u32,
    ) -> bool {
        if ga == 0 || gb == 0 {
            return false;
        }

        let legs_a = Self::leg_children(snapshot, &resolution.map_a, kinds, node, ga);
        let legs_b = Self::leg_children(snapshot, &resolution.map_b, kinds, node, gb);

        let fully_shared = resolution
            .members
            .iter()
            .filter(|&&(other, oa, ob)| other != node && oa == ga && ob == gb)
            .any(|&(other, _, _)| {
                let other_a = Self::leg_children(snapshot, &resolution.map_a, kinds, other, ga);
                let other_b = Self::leg_children(snapshot, &resolution.map_b, kinds, other, gb);
                !legs_a.is_disjoint(&other_a) && !legs_b.is_disjoint(&other_b)
            });

        !fully_shared
    }

    /// Children of `ancestor` lying one generation below it on a minimal
    /// line toward the map's origin
    fn leg_children(
        snapshot: &Snapshot,
        map: &AncestorMap,
        kinds: EdgeKinds,
        ancestor: u32,
        generations: u32,
    ) -> BTreeSet<u32> {
        snapshot
            .child_links(ancestor)
            .iter()
            .filter(|link| kinds.contains(link.kind))
            .filter(|link| map.generations(link.node) == Some(generations - 1))
            .map(|link| link.node)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::RelationshipEdge;

    fn classify(snapshot: &Snapshot, a: &str, b: &str) -> Result<Classification> {
        RelationshipClassifier::classify(
            snapshot,
            &IndividualId::from(a),
            &IndividualId::from(b),
            &AncestorOptions::default(),
            &SearchBudget::unlimited(),
        )
    }

    fn only(classification: &Classification) -> &RelationshipResult {
        assert_eq!(classification.results.len(), 1, "{:?}", classification.results);
        &classification.results[0]
    }

    /// gma + gpa -> p1, p2 (full siblings); p1 -> c1 -> gc1; p2 -> c2;
    /// p2 + other -> h (c2's full sibling); p1 + x -> hs (c1's half sibling
    /// through p1 only, since c1's other parent is y).
    fn family() -> Snapshot {
        Snapshot::load(
            ["gma", "gpa", "p1", "p2", "x", "y", "other", "c1", "c2", "h", "hs", "gc1"],
            vec![
                RelationshipEdge::biological("gma", "p1"),
                RelationshipEdge::biological("gpa", "p1"),
                RelationshipEdge::biological("gma", "p2"),
                RelationshipEdge::biological("gpa", "p2"),
                RelationshipEdge::biological("p1", "c1"),
                RelationshipEdge::biological("y", "c1"),
                RelationshipEdge::biological("p1", "hs"),
                RelationshipEdge::biological("x", "hs"),
                RelationshipEdge::biological("p2", "c2"),
                RelationshipEdge::biological("other", "c2"),
                RelationshipEdge::biological("p2", "h"),
                RelationshipEdge::biological("other", "h"),
                RelationshipEdge::biological("c1", "gc1"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_full_siblings() {
        let snapshot = family();
        let result = classify(&snapshot, "p1", "p2").unwrap();
        let rel = only(&result);
        assert_eq!(rel.label, "sibling");
        assert_eq!(rel.kind, RelationshipKind::Sibling);
        assert!(!rel.qualifiers.half);
        assert_eq!(rel.via.len(), 2);

        let rel = classify(&snapshot, "c2", "h").unwrap();
        assert_eq!(only(&rel).label, "sibling");
    }

    #[test]
    fn test_half_siblings() {
        let snapshot = family();
        let result = classify(&snapshot, "c1", "hs").unwrap();
        let rel = only(&result);
        assert_eq!(rel.label, "half-sibling");
        assert!(rel.qualifiers.half);
        assert_eq!(rel.via, vec![IndividualId::from("p1")]);
    }

    #[test]
    fn test_first_cousins() {
        let snapshot = family();
        let result = classify(&snapshot, "c1", "c2").unwrap();
        let rel = only(&result);
        assert_eq!(rel.label, "first cousin");
        assert_eq!(rel.kind, RelationshipKind::Cousin);
        assert_eq!(rel.generations, (2, 2));
        assert_eq!(rel.degree, 2);
        assert_eq!(rel.cousin_level, Some(1));
        assert_eq!(rel.removed, 0);
        assert!(rel.qualifiers.is_empty());
    }

    #[test]
    fn test_first_cousin_once_removed() {
        let snapshot = family();
        let result = classify(&snapshot, "c2", "gc1").unwrap();
        let rel = only(&result);
        assert_eq!(rel.label, "first cousin once removed");
        assert_eq!(rel.generations, (2, 3));
        assert_eq!(rel.removed, 1);
        assert_eq!(rel.cousin_level, Some(1));
    }

    #[test]
    fn test_lineal_and_collateral_labels() {
        let snapshot = family();
        assert_eq!(only(&classify(&snapshot, "gma", "gc1").unwrap()).label, "great-grandparent");
        assert_eq!(only(&classify(&snapshot, "gc1", "p1").unwrap()).label, "grandchild");
        assert_eq!(only(&classify(&snapshot, "p2", "c1").unwrap()).label, "aunt/uncle");
        assert_eq!(only(&classify(&snapshot, "p2", "gc1").unwrap()).label, "great-aunt/uncle");
        assert_eq!(only(&classify(&snapshot, "c1", "p2").unwrap()).label, "niece/nephew");
        assert_eq!(only(&classify(&snapshot, "c1", "c1").unwrap()).label, "self");
    }

    #[test]
    fn test_half_cousins() {
        let snapshot = family();
        // hs's parent p1 is a full sibling of p2, so hs and c2 are full cousins
        assert_eq!(only(&classify(&snapshot, "hs", "c2").unwrap()).label, "first cousin");
        // hs and gc1: hs is a half-sibling of gc1's parent c1
        assert_eq!(only(&classify(&snapshot, "hs", "gc1").unwrap()).label, "half-aunt/uncle");
    }

    #[test]
    fn test_adoptive_grandparent() {
        let snapshot = Snapshot::load(
            ["gp", "parent", "kid"],
            vec![
                RelationshipEdge::biological("gp", "parent"),
                RelationshipEdge::adoptive("parent", "kid"),
            ],
        )
        .unwrap();

        let rel = classify(&snapshot, "gp", "kid").unwrap();
        let rel = only(&rel);
        assert_eq!(rel.label, "adoptive grandparent");
        assert!(rel.qualifiers.adoptive);
        assert_eq!(rel.kind, RelationshipKind::Ancestor);
    }

    #[test]
    fn test_step_sibling() {
        let snapshot = Snapshot::load(
            ["mum", "dad", "a", "b"],
            vec![
                RelationshipEdge::biological("mum", "a"),
                RelationshipEdge::biological("dad", "b"),
                RelationshipEdge::step("mum", "b"),
                RelationshipEdge::partners("mum", "dad"),
            ],
        )
        .unwrap();

        let rel = classify(&snapshot, "a", "b").unwrap();
        let rel = only(&rel);
        assert_eq!(rel.label, "step-sibling");
        assert!(rel.qualifiers.step);
        assert!(!rel.qualifiers.half);
    }

    #[test]
    fn test_ambiguous_qualifiers_are_all_reported() {
        // b was born to m and later adopted by f, who is a's biological father
        let snapshot = Snapshot::load(
            ["m", "f", "a", "b"],
            vec![
                RelationshipEdge::biological("m", "a"),
                RelationshipEdge::biological("f", "a"),
                RelationshipEdge::biological("m", "b"),
                RelationshipEdge::adoptive("f", "b"),
            ],
        )
        .unwrap();

        let result = classify(&snapshot, "a", "b").unwrap();
        assert!(result.is_ambiguous());
        let labels: Vec<&str> = result.labels().collect();
        assert_eq!(labels, vec!["sibling", "adoptive sibling"]);
    }

    #[test]
    fn test_spouses() {
        let snapshot = Snapshot::load(
            ["a", "b", "c", "d"],
            vec![
                RelationshipEdge::partners("a", "b"),
                RelationshipEdge::partners("c", "d").with_legal(false),
            ],
        )
        .unwrap();

        assert_eq!(only(&classify(&snapshot, "a", "b").unwrap()).label, "spouse");
        assert_eq!(only(&classify(&snapshot, "d", "c").unwrap()).label, "partner");
        assert!(matches!(
            classify(&snapshot, "a", "c"),
            Err(Error::NoCommonAncestor { .. })
        ));
    }

    #[test]
    fn test_biological_only_drops_adoptive_line() {
        let snapshot = Snapshot::load(
            ["gp", "parent", "kid"],
            vec![
                RelationshipEdge::biological("gp", "parent"),
                RelationshipEdge::adoptive("parent", "kid"),
            ],
        )
        .unwrap();

        let result = RelationshipClassifier::classify(
            &snapshot,
            &IndividualId::from("gp"),
            &IndividualId::from("kid"),
            &AncestorOptions::new().biological_only(),
            &SearchBudget::unlimited(),
        );
        assert!(matches!(result, Err(Error::NoCommonAncestor { .. })));
    }

    #[test]
    fn test_siblings_classified_despite_looping_ancestry() {
        let snapshot = Snapshot::load(
            ["q", "r", "mum", "s1", "s2"],
            vec![
                RelationshipEdge::biological("q", "r"),
                RelationshipEdge::biological("r", "q"),
                RelationshipEdge::biological("q", "mum"),
                RelationshipEdge::biological("mum", "s1"),
                RelationshipEdge::biological("mum", "s2"),
            ],
        )
        .unwrap();

        let result = classify(&snapshot, "s1", "s2").unwrap();
        assert_eq!(only(&result).label, "half-sibling");
    }
}
