/*
Outline rendering for schemas.

`termtree::Tree` only knows strings, so nodes are converted through a trait
implemented for each schema type and for the arena (natural nesting as
indexed, before any relocation).
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{NodeId, SchemaArena};
use crate::domain::schema::{Schema, SchemaNode};

pub trait ToOutline {
    fn to_outline(&self) -> Tree<String>;
}

impl ToOutline for SchemaNode {
    fn to_outline(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_outline()).collect();
        Tree::new(self.label()).with_leaves(leaves)
    }
}

impl ToOutline for Schema {
    #[instrument(level = "debug", skip(self))]
    fn to_outline(&self) -> Tree<String> {
        match self {
            Schema::Absent => Tree::new("(absent)".to_string()),
            Schema::Node(node) => node.to_outline(),
            Schema::List(nodes) => {
                let leaves: Vec<_> = nodes.iter().map(|n| n.to_outline()).collect();
                Tree::new("$".to_string()).with_leaves(leaves)
            }
        }
    }
}

impl ToOutline for SchemaArena {
    fn to_outline(&self) -> Tree<String> {
        fn build_tree(arena: &SchemaArena, node_idx: NodeId, parent_tree: &mut Tree<String>) {
            for &child_idx in arena.children_of(Some(node_idx)) {
                if let Some(child) = arena.get_node(child_idx) {
                    let mut child_tree = Tree::new(child.node.label());
                    build_tree(arena, child_idx, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut tree = Tree::new("$".to_string());
        for &root_idx in self.roots() {
            if let Some(root) = self.get_node(root_idx) {
                let mut root_tree = Tree::new(root.node.label());
                build_tree(self, root_idx, &mut root_tree);
                tree.push(root_tree);
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indexer::Indexer;
    use serde_json::json;

    #[test]
    fn given_list_schema_when_outlining_then_renders_nested_labels() {
        let schema = Schema::from_value(json!([
            {"$el": "div", "meta": {"section": "top"}, "children": ["hi"]},
            {"$cmp": "FormKit", "meta": {"parent": "top", "index": 0}}
        ]));
        let rendered = schema.to_outline().to_string();
        assert!(rendered.starts_with("$\n"));
        assert!(rendered.contains("<div> #top"));
        assert!(rendered.contains("\"hi\""));
        assert!(rendered.contains("<FormKit /> -> top @0"));
    }

    #[test]
    fn given_indexed_arena_when_outlining_then_matches_schema_outline() {
        let schema = Schema::from_value(json!([{"$el": "ul", "children": [{"$el": "li"}]}]));
        let expected = schema.to_outline().to_string();
        let registries = Indexer::index(schema);
        assert_eq!(registries.arena().to_outline().to_string(), expected);
    }

    #[test]
    fn given_absent_schema_when_outlining_then_placeholder() {
        assert_eq!(Schema::Absent.to_outline().to_string().trim(), "(absent)");
    }
}
