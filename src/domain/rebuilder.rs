//! Rebuilder: turns registries back into a schema, applying relocations.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::domain::arena::NodeId;
use crate::domain::diagnostics::Report;
use crate::domain::indexer::{Registries, Shape};
use crate::domain::merge::{merge, Placed};
use crate::domain::resolve::{resolve, DuplicateSections, Resolution};
use crate::domain::schema::{Schema, SchemaNode};

/// Knobs for one restructuring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestructureOptions {
    pub duplicate_sections: DuplicateSections,
}

pub struct Rebuilder {
    registries: Registries,
    resolution: Resolution,
    /// Handles already emitted; each node is emitted at most once
    emitted: HashSet<NodeId>,
}

impl Rebuilder {
    /// Rebuild with default options, discarding diagnostics.
    pub fn rebuild(registries: Registries) -> Schema {
        Self::rebuild_with(registries, &RestructureOptions::default()).0
    }

    /// Rebuild and return the diagnostics of indexing and resolution.
    #[instrument(level = "debug", skip(registries))]
    pub fn rebuild_with(mut registries: Registries, options: &RestructureOptions) -> (Schema, Report) {
        let mut report = std::mem::take(&mut registries.report);
        let resolution = resolve(&registries, options.duplicate_sections, &mut report);
        debug!(relocated = resolution.relocated_count(), "resolved relocations");

        let shape = registries.shape;
        let expected = registries.len();
        let mut rebuilder = Self {
            registries,
            resolution,
            emitted: HashSet::with_capacity(expected),
        };
        let mut roots = rebuilder.build_children(None);

        if rebuilder.emitted.len() != expected {
            warn!(
                expected,
                emitted = rebuilder.emitted.len(),
                "rebuild did not emit every indexed node"
            );
        }

        let schema = match shape {
            Shape::Absent => Schema::Absent,
            Shape::List => Schema::List(roots),
            Shape::Node => match roots.len() {
                0 => Schema::Absent,
                _ => Schema::Node(roots.swap_remove(0)),
            },
        };
        (schema, report)
    }

    /// Ordered handles that end up under `parent`.
    fn ordered_children(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        let arena = &self.registries.arena;

        let kept = arena
            .children_of(parent)
            .iter()
            .copied()
            .filter(|&id| !self.resolution.is_relocated(id))
            .filter_map(|id| arena.entry(id).map(|e| Placed::floating(id, e.sequence)));

        let spliced = parent
            .map(|p| self.resolution.spliced_into(p))
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter_map(|id| {
                arena
                    .entry(id)
                    .map(|e| Placed::at(id, e.sequence, e.explicit_index))
            });

        let placed: Vec<Placed<NodeId>> = kept.chain(spliced).collect();
        merge(&placed)
    }

    /// Post-order rebuild with an explicit stack of open branches.
    fn build_children(&mut self, parent: Option<NodeId>) -> Vec<SchemaNode> {
        let mut open = vec![Branch::new(parent, self.ordered_children(parent))];

        loop {
            let Some(top) = open.last_mut() else {
                return Vec::new();
            };
            if let Some(id) = top.pending.next() {
                if !self.emitted.insert(id) {
                    warn!(?id, "node reached twice, skipping");
                    continue;
                }
                let order = self.ordered_children(Some(id));
                open.push(Branch::new(Some(id), order));
                continue;
            }

            let Some(done) = open.pop() else {
                return Vec::new();
            };
            if open.is_empty() {
                return done.built;
            }
            let Some(owner) = done.owner else {
                continue;
            };
            let Some(indexed) = self.registries.arena.remove(owner) else {
                continue;
            };
            let mut node = indexed.node;
            node.set_children(done.built);
            if let Some(up) = open.last_mut() {
                up.built.push(node);
            }
        }
    }
}

/// A branch whose children are being rebuilt.
struct Branch {
    owner: Option<NodeId>,
    pending: std::vec::IntoIter<NodeId>,
    built: Vec<SchemaNode>,
}

impl Branch {
    fn new(owner: Option<NodeId>, order: Vec<NodeId>) -> Self {
        Self {
            owner,
            built: Vec::with_capacity(order.len()),
            pending: order.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indexer::Indexer;
    use serde_json::{json, Value};

    fn rebuild_json(value: Value) -> Value {
        Rebuilder::rebuild(Indexer::index(Schema::from_value(value))).to_value()
    }

    #[test]
    fn given_section_and_parent_when_rebuilding_then_moves_node() {
        let output = rebuild_json(json!([
            {"$el": "A", "meta": {"section": "top"}},
            {"$el": "B", "meta": {"parent": "top", "index": 0}},
            {"$el": "C"}
        ]));
        assert_eq!(
            output,
            json!([
                {"$el": "A", "meta": {"section": "top"}, "children": [
                    {"$el": "B", "meta": {"parent": "top", "index": 0}}
                ]},
                {"$el": "C"}
            ])
        );
    }

    #[test]
    fn given_no_placement_when_rebuilding_then_unchanged() {
        let input = json!([
            {"$el": "form", "children": [
                {"$cmp": "FormKit", "props": {"type": "email"}},
                "hint",
                {"if": "$x", "then": "y"}
            ]},
            "tail"
        ]);
        assert_eq!(rebuild_json(input.clone()), input);
    }

    #[test]
    fn given_absent_schema_when_rebuilding_then_absent() {
        assert_eq!(rebuild_json(Value::Null), Value::Null);
    }

    #[test]
    fn given_single_root_when_rebuilding_then_single_root() {
        let output = rebuild_json(json!({
            "$el": "div",
            "children": [
                {"$el": "header", "meta": {"section": "head"}},
                {"$el": "h1", "meta": {"parent": "head"}}
            ]
        }));
        assert_eq!(
            output,
            json!({
                "$el": "div",
                "children": [
                    {"$el": "header", "meta": {"section": "head"}, "children": [
                        {"$el": "h1", "meta": {"parent": "head"}}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn given_cycle_when_rebuilding_then_all_nodes_kept_in_place() {
        let input = json!([
            {"$el": "outer", "meta": {"parent": "inner"}, "children": [
                {"$el": "inner", "meta": {"section": "inner"}}
            ]}
        ]);
        let (schema, report) = Rebuilder::rebuild_with(
            Indexer::index(Schema::from_value(input.clone())),
            &RestructureOptions::default(),
        );
        assert_eq!(schema.to_value(), input);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn given_chained_relocations_when_rebuilding_then_follows_chain() {
        // c moves into b, b moves into a.
        let output = rebuild_json(json!([
            {"$el": "a", "meta": {"section": "a"}},
            {"$el": "b", "meta": {"section": "b", "parent": "a"}},
            {"$el": "c", "meta": {"parent": "b"}}
        ]));
        assert_eq!(
            output,
            json!([
                {"$el": "a", "meta": {"section": "a"}, "children": [
                    {"$el": "b", "meta": {"section": "b", "parent": "a"}, "children": [
                        {"$el": "c", "meta": {"parent": "b"}}
                    ]}
                ]}
            ])
        );
    }

    #[test]
    fn given_node_moving_out_of_deep_branch_when_rebuilding_then_carries_subtree() {
        let output = rebuild_json(json!([
            {"$el": "aside", "meta": {"section": "side"}},
            {"$el": "main", "children": [
                {"$el": "nav", "meta": {"parent": "side"}, "children": ["link"]},
                {"$el": "p"}
            ]}
        ]));
        assert_eq!(
            output,
            json!([
                {"$el": "aside", "meta": {"section": "side"}, "children": [
                    {"$el": "nav", "meta": {"parent": "side"}, "children": ["link"]}
                ]},
                {"$el": "main", "children": [{"$el": "p"}]}
            ])
        );
    }

    #[test]
    fn given_deeply_nested_typed_schema_when_rebuilding_then_relocates_from_bottom() {
        use crate::domain::placement::Placement;
        use crate::domain::schema::Element;

        const DEPTH: usize = 2_000;
        let mut node: SchemaNode = Element::dom("leaf")
            .with_placement(Placement::parent("top"))
            .into();
        for _ in 0..DEPTH {
            node = Element::dom("div").with_children(vec![node]).into();
        }
        let schema = Schema::List(vec![
            Element::dom("top")
                .with_placement(Placement::section("top"))
                .into(),
            node,
        ]);

        let output = Rebuilder::rebuild(Indexer::index(schema));

        let roots = output.roots();
        assert_eq!(roots[0].children().len(), 1);
        let mut depth = 0;
        let mut current = &roots[1];
        while let [child] = current.children() {
            depth += 1;
            current = child;
        }
        assert_eq!(depth, DEPTH - 1);
        assert!(current.children().is_empty());
    }
}
