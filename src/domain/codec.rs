//! JSON representation of schemas.
//!
//! Objects carrying a string `$el` are DOM elements, a string `$cmp` marks a
//! component, bare strings are text. Everything else is opaque. Conversion
//! never fails: unknown shapes fall through to [`Conditional`].

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::placement::Placement;
use crate::domain::schema::{ChildrenForm, Conditional, Element, Schema, SchemaNode, Tag, TextLeaf};

impl Schema {
    /// `null` is an absent schema, an array a list, anything else one node.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Schema::Absent,
            Value::Array(items) => Schema::List(items.into_iter().map(SchemaNode::from_value).collect()),
            other => Schema::Node(SchemaNode::from_value(other)),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Schema::Absent => Value::Null,
            Schema::Node(node) => node.to_value(),
            Schema::List(nodes) => Value::Array(nodes.iter().map(SchemaNode::to_value).collect()),
        }
    }

    /// Parse JSON text. Empty or whitespace-only input is an absent schema.
    pub fn from_json_str(text: &str) -> DomainResult<Self> {
        if text.trim().is_empty() {
            return Ok(Schema::Absent);
        }
        let value: Value = serde_json::from_str(text).map_err(DomainError::Json)?;
        Ok(Self::from_value(value))
    }

    pub fn to_json_string(&self, pretty: bool) -> DomainResult<String> {
        let value = self.to_value();
        let text = if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(DomainError::Json)
    }
}

impl SchemaNode {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => SchemaNode::Text(TextLeaf::new(text)),
            Value::Object(fields) => match element_tag(&fields) {
                Some(tag) => SchemaNode::Element(element_from_fields(tag, fields)),
                None => SchemaNode::Conditional(Conditional::new(Value::Object(fields))),
            },
            other => SchemaNode::Conditional(Conditional::new(other)),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Element(el) => element_to_value(el),
            SchemaNode::Text(leaf) => text_to_value(leaf),
            SchemaNode::Conditional(c) => c.value.clone(),
        }
    }
}

fn element_tag(fields: &Map<String, Value>) -> Option<Tag> {
    if let Some(Value::String(name)) = fields.get("$el") {
        return Some(Tag::Dom(name.clone()));
    }
    if let Some(Value::String(name)) = fields.get("$cmp") {
        return Some(Tag::Component(name.clone()));
    }
    None
}

fn element_from_fields(tag: Tag, mut fields: Map<String, Value>) -> Element {
    let placement = Placement::from_meta(fields.get("meta"));
    // Leave a placeholder so the key keeps its position when written back.
    let (children, children_form) = match fields.get_mut("children").map(Value::take) {
        None => (Vec::new(), ChildrenForm::Absent),
        Some(Value::Array(items)) => (
            items.into_iter().map(SchemaNode::from_value).collect(),
            ChildrenForm::List,
        ),
        Some(Value::String(text)) => (vec![SchemaNode::text(text)], ChildrenForm::Text),
        Some(other) => (vec![SchemaNode::from_value(other)], ChildrenForm::Single),
    };
    Element {
        tag,
        children,
        placement,
        fields,
        children_form,
    }
}

fn element_to_value(el: &Element) -> Value {
    let mut fields = el.fields.clone();

    if let Some(placement) = &el.placement {
        let meta = fields
            .entry("meta")
            .or_insert_with(|| Value::Object(Map::new()));
        if !meta.is_object() {
            *meta = Value::Object(Map::new());
        }
        if let Value::Object(meta) = meta {
            placement.write_into(meta);
        }
    }

    let children = match (el.children_form, el.children.as_slice()) {
        (ChildrenForm::Absent, []) => None,
        (ChildrenForm::Text, [SchemaNode::Text(leaf)]) if leaf.placement.is_none() => {
            Some(Value::String(leaf.text.clone()))
        }
        (ChildrenForm::Single, [SchemaNode::Conditional(c)]) => Some(c.value.clone()),
        (_, nodes) => Some(Value::Array(nodes.iter().map(SchemaNode::to_value).collect())),
    };
    if let Some(children) = children {
        fields.insert("children".into(), children);
    }
    Value::Object(fields)
}

/// A bare string, unless the leaf carries placement that must survive.
fn text_to_value(leaf: &TextLeaf) -> Value {
    match &leaf.placement {
        None => Value::String(leaf.text.clone()),
        Some(placement) => {
            let mut meta = Map::new();
            placement.write_into(&mut meta);
            let mut fields = Map::new();
            fields.insert("$el".into(), Value::String("text".into()));
            fields.insert("children".into(), Value::String(leaf.text.clone()));
            fields.insert("meta".into(), Value::Object(meta));
            Value::Object(fields)
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Schema::from_value)
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(SchemaNode::from_value)
    }
}
