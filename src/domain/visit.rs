use crate::domain::schema::{Conditional, Element, Schema, SchemaNode, TextLeaf};

/// Visitor pattern for traversing schema nodes immutably
///
/// Default implementations walk the whole tree. Override specific visit_*
/// methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &SchemaNode) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }

    fn visit_text(&mut self, _text: &TextLeaf) {
        // Leaf node, no children to walk
    }

    fn visit_conditional(&mut self, _conditional: &Conditional) {
        // Opaque, branches are not walked
    }
}

pub fn walk_schema<V: Visitor>(visitor: &mut V, schema: &Schema) {
    for node in schema.roots() {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &SchemaNode) {
    match node {
        SchemaNode::Element(el) => visitor.visit_element(el),
        SchemaNode::Text(leaf) => visitor.visit_text(leaf),
        SchemaNode::Conditional(c) => visitor.visit_conditional(c),
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element) {
    for child in &element.children {
        visitor.visit_node(child);
    }
}

#[derive(Default)]
struct NodeCounter {
    count: usize,
}

impl Visitor for NodeCounter {
    fn visit_node(&mut self, node: &SchemaNode) {
        self.count += 1;
        walk_node(self, node);
    }
}

#[derive(Default)]
struct DepthMeter {
    current: usize,
    max: usize,
}

impl Visitor for DepthMeter {
    fn visit_node(&mut self, node: &SchemaNode) {
        self.current += 1;
        self.max = self.max.max(self.current);
        walk_node(self, node);
        self.current -= 1;
    }
}

#[derive(Default)]
struct SectionCollector {
    sections: Vec<String>,
}

impl Visitor for SectionCollector {
    fn visit_element(&mut self, element: &Element) {
        if let Some(section) = element.section() {
            self.sections.push(section.to_string());
        }
        walk_element(self, element);
    }
}

/// Number of nodes, opaque nodes count as one.
pub fn count_nodes(schema: &Schema) -> usize {
    let mut counter = NodeCounter::default();
    walk_schema(&mut counter, schema);
    counter.count
}

/// Nesting depth, 0 for an absent or empty schema.
pub fn max_depth(schema: &Schema) -> usize {
    let mut meter = DepthMeter::default();
    walk_schema(&mut meter, schema);
    meter.max
}

/// Declared sections in document order.
pub fn sections(schema: &Schema) -> Vec<String> {
    let mut collector = SectionCollector::default();
    walk_schema(&mut collector, schema);
    collector.sections
}
