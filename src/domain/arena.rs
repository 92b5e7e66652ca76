use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::placement::Identifier;
use crate::domain::schema::SchemaNode;

/// Handle of a node for the duration of one restructuring pass.
pub type NodeId = Index;

/// Registry entry: where a node sits naturally and where it asks to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Parent in the original nesting, `None` for top-level nodes
    pub natural_parent: Option<NodeId>,
    /// 0-based position among the natural parent's children
    pub natural_index: usize,
    /// Section this node wants to be moved into
    pub explicit_parent: Option<Identifier>,
    /// Desired slot in the destination
    pub explicit_index: Option<usize>,
    /// Section this node declares (elements only)
    pub section: Option<Identifier>,
    /// Pre-order discovery position, the tie-breaker for every ordering decision
    pub sequence: usize,
    /// JSONPath-like location in the input
    pub location: String,
}

/// Node stored in the arena, detached from its children.
#[derive(Debug)]
pub struct IndexedNode {
    /// The node itself with an empty children sequence
    pub node: SchemaNode,
    pub entry: RegistryEntry,
    /// Natural children in source order
    pub children: Vec<NodeId>,
}

/// Arena of all nodes of one schema.
///
/// Uses generational arena handles so two structurally identical nodes stay
/// distinct. The `children` lists together with `roots` form the
/// parent-to-children grouping keyed by natural parent.
#[derive(Debug, Default)]
pub struct SchemaArena {
    arena: Arena<IndexedNode>,
    /// Children of the implicit root
    roots: Vec<NodeId>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self, node))]
    pub fn insert_node(&mut self, node: SchemaNode, entry: RegistryEntry) -> NodeId {
        let parent = entry.natural_parent;
        let node_idx = self.arena.insert(IndexedNode {
            node,
            entry,
            children: Vec::new(),
        });

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(node_idx);
                }
            }
            None => self.roots.push(node_idx),
        }

        node_idx
    }

    pub fn get_node(&self, idx: NodeId) -> Option<&IndexedNode> {
        self.arena.get(idx)
    }

    pub fn entry(&self, idx: NodeId) -> Option<&RegistryEntry> {
        self.arena.get(idx).map(|n| &n.entry)
    }

    /// Take a node out of the arena. A second call for the same handle yields `None`.
    pub fn remove(&mut self, idx: NodeId) -> Option<IndexedNode> {
        self.arena.remove(idx)
    }

    /// Natural children of `parent`; `None` is the implicit root.
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(idx) => self
                .arena
                .get(idx)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal of the natural tree.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Depth of the natural tree, 0 when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: NodeId) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a SchemaArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a SchemaArena) -> Self {
        Self {
            arena,
            stack: arena.roots.iter().rev().copied().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a IndexedNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}
