//! Indexer: one depth-first walk that builds the registries of a pass.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, RegistryEntry, SchemaArena};
use crate::domain::diagnostics::{Diagnostic, Report};
use crate::domain::placement::{Identifier, Placement};
use crate::domain::schema::{Schema, SchemaNode};

/// Shape of the input, restored on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Absent,
    Node,
    List,
}

/// Everything the Rebuilder needs, built fresh for every pass.
#[derive(Debug)]
pub struct Registries {
    pub(crate) arena: SchemaArena,
    /// Section name to declaring elements, in discovery order
    pub(crate) sections: HashMap<Identifier, Vec<NodeId>>,
    pub(crate) shape: Shape,
    pub(crate) report: Report,
}

impl Registries {
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn entry(&self, id: NodeId) -> Option<&RegistryEntry> {
        self.arena.entry(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.arena.get_node(id).map(|n| &n.node)
    }

    /// Natural children of `parent` in source order; `None` is the implicit root.
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        self.arena.children_of(parent)
    }

    /// Elements declaring `section`, in discovery order.
    pub fn section_members(&self, section: &Identifier) -> &[NodeId] {
        self.sections.get(section).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn arena(&self) -> &SchemaArena {
        &self.arena
    }

    /// Diagnostics found while indexing.
    pub fn report(&self) -> &Report {
        &self.report
    }
}

#[derive(Debug, Default)]
pub struct Indexer {
    arena: SchemaArena,
    sections: HashMap<Identifier, Vec<NodeId>>,
    sequence: usize,
    report: Report,
}

impl Indexer {
    /// Index a schema. Never fails: malformed metadata is treated as absent.
    #[instrument(level = "debug", skip(schema))]
    pub fn index(schema: Schema) -> Registries {
        let mut indexer = Self::default();
        let shape = match schema {
            Schema::Absent => Shape::Absent,
            Schema::Node(node) => {
                indexer.visit(node, None, 0, "$".to_string());
                Shape::Node
            }
            Schema::List(nodes) => {
                for (i, node) in nodes.into_iter().enumerate() {
                    indexer.visit(node, None, i, format!("$[{}]", i));
                }
                Shape::List
            }
        };
        debug!(
            nodes = indexer.arena.len(),
            sections = indexer.sections.len(),
            "indexed schema"
        );
        Registries {
            arena: indexer.arena,
            sections: indexer.sections,
            shape,
            report: indexer.report,
        }
    }

    /// Pre-order walk with an explicit stack, so depth is bounded by the heap.
    fn visit(&mut self, node: SchemaNode, parent: Option<NodeId>, index: usize, location: String) {
        let mut pending = vec![(node, parent, index, location)];
        while let Some((mut node, parent, index, location)) = pending.pop() {
            let children = node.take_children();
            self.check_meta(&node, &location);

            // Opaque nodes take part in ordering only.
            let placement = node.placement().cloned().unwrap_or_default();
            let section = match &node {
                SchemaNode::Element(_) => placement.section,
                _ => None,
            };
            let entry = RegistryEntry {
                natural_parent: parent,
                natural_index: index,
                explicit_parent: placement.parent,
                explicit_index: placement.index,
                section: section.clone(),
                sequence: self.sequence,
                location: location.clone(),
            };
            self.sequence += 1;

            let id = self.arena.insert_node(node, entry);
            if let Some(section) = section {
                self.register_section(section, id, &location);
            }

            for (i, child) in children.into_iter().enumerate().rev() {
                let child_location = format!("{}.children[{}]", location, i);
                pending.push((child, Some(id), i, child_location));
            }
        }
    }

    fn register_section(&mut self, section: Identifier, id: NodeId, location: &str) {
        let members = self.sections.entry(section.clone()).or_default();
        if let Some(first) = members.first().and_then(|&first| self.arena.entry(first)) {
            self.report.push(Diagnostic::DuplicateSection {
                at: location.to_string(),
                section,
                first: first.location.clone(),
            });
        }
        members.push(id);
    }

    fn check_meta(&mut self, node: &SchemaNode, location: &str) {
        let SchemaNode::Element(el) = node else {
            return;
        };
        for field in Placement::malformed_fields(el.field("meta")) {
            self.report.push(Diagnostic::MalformedPlacement {
                at: location.to_string(),
                field,
            });
        }
    }
}
