//! Schema node model.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::placement::{Identifier, Placement};

/// Identity of an element: a DOM tag (`$el`) or a component name (`$cmp`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Dom(String),
    Component(String),
}

impl Tag {
    /// Key under which the tag is stored in the source object.
    pub fn key(&self) -> &'static str {
        match self {
            Tag::Dom(_) => "$el",
            Tag::Component(_) => "$cmp",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::Dom(name) | Tag::Component(name) => name,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Dom(name) => write!(f, "<{}>", name),
            Tag::Component(name) => write!(f, "<{} />", name),
        }
    }
}

/// How `children` was written in the source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ChildrenForm {
    /// No `children` key.
    #[default]
    Absent,
    /// `children: [...]`
    List,
    /// `children: "text"`
    Text,
    /// `children: {...}` holding one opaque node.
    Single,
}

/// Element node: has a tag and a children sequence.
///
/// Every source field other than `children` is kept in `fields`, in source
/// order, so an element that is not moved serializes back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub children: Vec<SchemaNode>,
    pub placement: Option<Placement>,
    pub(crate) fields: Map<String, Value>,
    pub(crate) children_form: ChildrenForm,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        let mut fields = Map::new();
        fields.insert(tag.key().into(), Value::String(tag.name().into()));
        Self {
            tag,
            children: Vec::new(),
            placement: None,
            fields,
            children_form: ChildrenForm::Absent,
        }
    }

    pub fn dom(name: impl Into<String>) -> Self {
        Self::new(Tag::Dom(name.into()))
    }

    pub fn component(name: impl Into<String>) -> Self {
        Self::new(Tag::Component(name.into()))
    }

    pub fn with_children(mut self, children: Vec<SchemaNode>) -> Self {
        self.children = children;
        if self.children_form == ChildrenForm::Absent {
            self.children_form = ChildrenForm::List;
        }
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = (!placement.is_empty()).then_some(placement);
        self
    }

    /// Set an arbitrary source field (`attrs`, `props`, `if`, ...).
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Section this element declares, if any.
    pub fn section(&self) -> Option<&Identifier> {
        self.placement.as_ref().and_then(|p| p.section.as_ref())
    }
}

/// Text payload, no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf {
    pub text: String,
    pub placement: Option<Placement>,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placement: None,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = (!placement.is_empty()).then_some(placement);
        self
    }
}

/// Structurally opaque node, passed through unchanged.
///
/// Holds conditionals (`{ if, then, else }`) and any other value that is
/// neither an element nor text.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub value: Value,
}

impl Conditional {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Element(Element),
    Text(TextLeaf),
    Conditional(Conditional),
}

impl SchemaNode {
    pub fn text(text: impl Into<String>) -> Self {
        SchemaNode::Text(TextLeaf::new(text))
    }

    pub fn placement(&self) -> Option<&Placement> {
        match self {
            SchemaNode::Element(el) => el.placement.as_ref(),
            SchemaNode::Text(leaf) => leaf.placement.as_ref(),
            SchemaNode::Conditional(_) => None,
        }
    }

    pub fn children(&self) -> &[SchemaNode] {
        match self {
            SchemaNode::Element(el) => &el.children,
            _ => &[],
        }
    }

    /// Detach the children, leaving an empty sequence behind.
    pub(crate) fn take_children(&mut self) -> Vec<SchemaNode> {
        match self {
            SchemaNode::Element(el) => std::mem::take(&mut el.children),
            _ => Vec::new(),
        }
    }

    pub(crate) fn set_children(&mut self, children: Vec<SchemaNode>) {
        if let SchemaNode::Element(el) = self {
            el.children = children;
        }
    }

    /// One-line description used in outlines and logs.
    pub fn label(&self) -> String {
        let mut label = match self {
            SchemaNode::Element(el) => el.tag.to_string(),
            SchemaNode::Text(leaf) => format!("{:?}", leaf.text),
            SchemaNode::Conditional(c) => match c.value.get("if") {
                Some(cond) => format!("if {}", cond),
                None => "{opaque}".to_string(),
            },
        };
        if let Some(placement) = self.placement() {
            if let Some(section) = &placement.section {
                label.push_str(&format!(" #{}", section));
            }
            if let Some(parent) = &placement.parent {
                label.push_str(&format!(" -> {}", parent));
            }
            if let Some(index) = placement.index {
                label.push_str(&format!(" @{}", index));
            }
        }
        label
    }
}

impl From<Element> for SchemaNode {
    fn from(el: Element) -> Self {
        SchemaNode::Element(el)
    }
}

impl From<TextLeaf> for SchemaNode {
    fn from(leaf: TextLeaf) -> Self {
        SchemaNode::Text(leaf)
    }
}

impl From<Conditional> for SchemaNode {
    fn from(c: Conditional) -> Self {
        SchemaNode::Conditional(c)
    }
}

/// A whole schema as handed across the restructuring boundary.
///
/// The output of a restructuring pass always has the same shape as its input.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Schema {
    #[default]
    Absent,
    Node(SchemaNode),
    List(Vec<SchemaNode>),
}

impl Schema {
    pub fn is_absent(&self) -> bool {
        matches!(self, Schema::Absent)
    }

    /// Top-level nodes in order.
    pub fn roots(&self) -> &[SchemaNode] {
        match self {
            Schema::Absent => &[],
            Schema::Node(node) => std::slice::from_ref(node),
            Schema::List(nodes) => nodes,
        }
    }
}

impl From<Vec<SchemaNode>> for Schema {
    fn from(nodes: Vec<SchemaNode>) -> Self {
        Schema::List(nodes)
    }
}

impl From<SchemaNode> for Schema {
    fn from(node: SchemaNode) -> Self {
        Schema::Node(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_builder_when_creating_element_then_records_tag_field() {
        let el = Element::dom("div").with_field("attrs", serde_json::json!({"id": "a"}));
        assert_eq!(el.field("$el"), Some(&Value::String("div".into())));
        assert_eq!(el.tag.name(), "div");
        assert!(el.field("attrs").is_some());
    }

    #[test]
    fn given_empty_placement_when_attaching_then_stored_as_none() {
        let el = Element::dom("div").with_placement(Placement::default());
        assert!(el.placement.is_none());
    }

    #[test]
    fn given_placement_when_labeling_then_shows_section_parent_and_index() {
        let node: SchemaNode = Element::component("FormKit")
            .with_placement(Placement::parent("footer").with_index(1))
            .into();
        assert_eq!(node.label(), "<FormKit /> -> footer @1");

        let node: SchemaNode = Element::dom("section")
            .with_placement(Placement::section("footer"))
            .into();
        assert_eq!(node.label(), "<section> #footer");
    }

    #[test]
    fn given_leaf_when_taking_children_then_empty() {
        let mut node = SchemaNode::text("hello");
        assert!(node.take_children().is_empty());
        assert!(node.children().is_empty());
    }
}
