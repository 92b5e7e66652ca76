//! Relocation resolution: decides, once per pass, which node moves where.
//!
//! Nodes are resolved in discovery order. A candidate target is rejected
//! when it is the node itself or lies inside the node's current subtree.
//! Every accepted move keeps the effective parent graph a tree, so a later
//! decision can never invalidate an earlier one.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::NodeId;
use crate::domain::diagnostics::{Diagnostic, Report};
use crate::domain::indexer::Registries;

/// What to do when several elements declare the same section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateSections {
    /// The first declaring element (in document order) receives the nodes.
    #[default]
    FirstDeclared,
    /// References to an ambiguous section are treated as unresolved.
    Unresolved,
}

impl fmt::Display for DuplicateSections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateSections::FirstDeclared => f.write_str("first-declared"),
            DuplicateSections::Unresolved => f.write_str("unresolved"),
        }
    }
}

impl FromStr for DuplicateSections {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-declared" | "first" => Ok(DuplicateSections::FirstDeclared),
            "unresolved" => Ok(DuplicateSections::Unresolved),
            other => Err(format!("unknown duplicate section policy: {other}")),
        }
    }
}

/// Outcome of resolving every `parent` reference of a pass.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Relocated node to its destination
    targets: HashMap<NodeId, NodeId>,
    /// Destination to the nodes spliced into it, in discovery order
    spliced: HashMap<NodeId, Vec<NodeId>>,
}

impl Resolution {
    pub fn is_relocated(&self, id: NodeId) -> bool {
        self.targets.contains_key(&id)
    }

    pub fn target_of(&self, id: NodeId) -> Option<NodeId> {
        self.targets.get(&id).copied()
    }

    pub fn spliced_into(&self, target: NodeId) -> &[NodeId] {
        self.spliced.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn relocated_count(&self) -> usize {
        self.targets.len()
    }
}

#[instrument(level = "debug", skip(registries, report))]
pub fn resolve(registries: &Registries, policy: DuplicateSections, report: &mut Report) -> Resolution {
    let mut resolution = Resolution::default();

    let requests = registries
        .arena()
        .iter()
        .filter_map(|(id, node)| node.entry.explicit_parent.as_ref().map(|parent| (id, node, parent)))
        .sorted_by_key(|(_, node, _)| node.entry.sequence);

    for (id, node, parent) in requests {
        let candidates = registries.section_members(parent);
        let at = node.entry.location.clone();

        if candidates.is_empty() {
            report.push(Diagnostic::UnresolvedParent {
                at,
                parent: parent.clone(),
            });
            continue;
        }
        if policy == DuplicateSections::Unresolved && candidates.len() > 1 {
            report.push(Diagnostic::AmbiguousSection {
                at,
                parent: parent.clone(),
                count: candidates.len(),
            });
            continue;
        }

        let accepted = candidates
            .iter()
            .copied()
            .find(|&target| !would_cycle(registries, &resolution, id, target));
        match accepted {
            Some(target) => {
                debug!(node = %at, section = %parent, "relocating");
                resolution.targets.insert(id, target);
                resolution.spliced.entry(target).or_default().push(id);
            }
            None => report.push(Diagnostic::RelocationCycle {
                at,
                parent: parent.clone(),
            }),
        }
    }

    resolution
}

/// Parent of `id` after the moves accepted so far.
fn effective_parent(registries: &Registries, resolution: &Resolution, id: NodeId) -> Option<NodeId> {
    resolution
        .target_of(id)
        .or_else(|| registries.entry(id).and_then(|e| e.natural_parent))
}

/// True when `target` is `node` or one of its effective descendants.
fn would_cycle(registries: &Registries, resolution: &Resolution, node: NodeId, target: NodeId) -> bool {
    let mut path = HashSet::new();
    let mut current = Some(target);
    while let Some(id) = current {
        if id == node || !path.insert(id) {
            return true;
        }
        current = effective_parent(registries, resolution, id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indexer::Indexer;
    use crate::domain::schema::Schema;
    use serde_json::json;

    fn resolve_json(value: serde_json::Value, policy: DuplicateSections) -> (Registries, Resolution, Report) {
        let registries = Indexer::index(Schema::from_value(value));
        let mut report = Report::new();
        let resolution = resolve(&registries, policy, &mut report);
        (registries, resolution, report)
    }

    #[test]
    fn given_matching_section_when_resolving_then_targets_declarer() {
        let (registries, resolution, report) = resolve_json(
            json!([
                {"$el": "a", "meta": {"section": "top"}},
                {"$el": "b", "meta": {"parent": "top"}}
            ]),
            DuplicateSections::FirstDeclared,
        );
        let roots = registries.children_of(None);
        assert_eq!(resolution.target_of(roots[1]), Some(roots[0]));
        assert_eq!(resolution.spliced_into(roots[0]), &[roots[1]]);
        assert!(report.is_clean());
    }

    #[test]
    fn given_missing_section_when_resolving_then_unresolved() {
        let (registries, resolution, report) = resolve_json(
            json!([{"$el": "b", "meta": {"parent": "missing-section"}}]),
            DuplicateSections::FirstDeclared,
        );
        assert!(!resolution.is_relocated(registries.children_of(None)[0]));
        assert!(matches!(
            report.iter().next(),
            Some(Diagnostic::UnresolvedParent { .. })
        ));
    }

    #[test]
    fn given_self_reference_when_resolving_then_cycle_reported() {
        let (_, resolution, report) = resolve_json(
            json!([{"$el": "a", "meta": {"section": "me", "parent": "me"}}]),
            DuplicateSections::FirstDeclared,
        );
        assert_eq!(resolution.relocated_count(), 0);
        assert!(matches!(
            report.iter().next(),
            Some(Diagnostic::RelocationCycle { .. })
        ));
    }

    #[test]
    fn given_target_inside_own_subtree_when_resolving_then_cycle_reported() {
        let (_, resolution, report) = resolve_json(
            json!([
                {"$el": "outer", "meta": {"parent": "inner"}, "children": [
                    {"$el": "inner", "meta": {"section": "inner"}}
                ]}
            ]),
            DuplicateSections::FirstDeclared,
        );
        assert_eq!(resolution.relocated_count(), 0);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn given_mutual_relocation_when_resolving_then_first_wins_second_breaks_cycle() {
        // a wants into b's section, b wants into a's section.
        let (registries, resolution, report) = resolve_json(
            json!([
                {"$el": "a", "meta": {"section": "a", "parent": "b"}},
                {"$el": "b", "meta": {"section": "b", "parent": "a"}}
            ]),
            DuplicateSections::FirstDeclared,
        );
        let roots = registries.children_of(None);
        assert_eq!(resolution.target_of(roots[0]), Some(roots[1]));
        assert!(!resolution.is_relocated(roots[1]));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn given_duplicate_sections_when_first_declared_then_first_valid_target() {
        let (registries, resolution, _) = resolve_json(
            json!([
                {"$el": "a", "meta": {"section": "s"}},
                {"$el": "b", "meta": {"section": "s"}},
                {"$el": "c", "meta": {"parent": "s"}}
            ]),
            DuplicateSections::FirstDeclared,
        );
        let roots = registries.children_of(None);
        assert_eq!(resolution.target_of(roots[2]), Some(roots[0]));
    }

    #[test]
    fn given_duplicate_sections_when_first_is_cyclic_then_falls_back_to_next() {
        let (registries, resolution, report) = resolve_json(
            json!([
                {"$el": "a", "meta": {"parent": "s"}, "children": [
                    {"$el": "inner", "meta": {"section": "s"}}
                ]},
                {"$el": "b", "meta": {"section": "s"}}
            ]),
            DuplicateSections::FirstDeclared,
        );
        let roots = registries.children_of(None);
        assert_eq!(resolution.target_of(roots[0]), Some(roots[1]));
        // The usable second target means no cycle is reported.
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn given_duplicate_sections_when_unresolved_policy_then_left_in_place() {
        let (_, resolution, report) = resolve_json(
            json!([
                {"$el": "a", "meta": {"section": "s"}},
                {"$el": "b", "meta": {"section": "s"}},
                {"$el": "c", "meta": {"parent": "s"}}
            ]),
            DuplicateSections::Unresolved,
        );
        assert_eq!(resolution.relocated_count(), 0);
        assert!(matches!(
            report.iter().next(),
            Some(Diagnostic::AmbiguousSection { count: 2, .. })
        ));
    }

    #[test]
    fn given_policy_names_when_parsing_then_accepts_aliases() {
        assert_eq!(
            "first-declared".parse::<DuplicateSections>(),
            Ok(DuplicateSections::FirstDeclared)
        );
        assert_eq!(
            "FIRST_DECLARED".parse::<DuplicateSections>(),
            Ok(DuplicateSections::FirstDeclared)
        );
        assert_eq!(
            "unresolved".parse::<DuplicateSections>(),
            Ok(DuplicateSections::Unresolved)
        );
        assert!("reject".parse::<DuplicateSections>().is_err());
    }
}
