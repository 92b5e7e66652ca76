//! Placement metadata: the `{section, parent, index}` bundle carried in `meta`.
//!
//! Parsing is lenient. A value of the wrong type is treated as if the key
//! were missing; [`Placement::malformed_fields`] reports which keys were
//! present but unusable so callers can surface them as diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of a section, normalized to a string.
///
/// JSON integers normalize to their decimal form so `section: 3` and
/// `parent: "3"` refer to the same section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse an identifier from a JSON value, `None` when unusable.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => n.as_i64().map(|i| Self(i.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One of the three placement keys inside `meta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementField {
    Section,
    Parent,
    Index,
}

impl PlacementField {
    pub const ALL: [PlacementField; 3] = [Self::Section, Self::Parent, Self::Index];

    pub fn key(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Parent => "parent",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for PlacementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Declared positioning intent of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// This node is an anchor other nodes may target.
    pub section: Option<Identifier>,
    /// Move this node under the node declaring `section == parent`.
    pub parent: Option<Identifier>,
    /// Desired slot among the destination's children.
    pub index: Option<usize>,
}

impl Placement {
    pub fn section(name: impl Into<Identifier>) -> Self {
        Self {
            section: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn parent(name: impl Into<Identifier>) -> Self {
        Self {
            parent: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_section(mut self, name: impl Into<Identifier>) -> Self {
        self.section = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.parent.is_none() && self.index.is_none()
    }

    /// Read the placement keys of a `meta` value.
    ///
    /// Returns `None` when `meta` is missing, not an object, or carries no
    /// usable placement key.
    pub fn from_meta(meta: Option<&Value>) -> Option<Self> {
        let meta = meta?.as_object()?;
        let placement = Self {
            section: meta.get("section").and_then(Identifier::from_value),
            parent: meta.get("parent").and_then(Identifier::from_value),
            index: meta.get("index").and_then(parse_index),
        };
        (!placement.is_empty()).then_some(placement)
    }

    /// Keys present in `meta` whose values could not be used.
    pub fn malformed_fields(meta: Option<&Value>) -> Vec<PlacementField> {
        let Some(meta) = meta.and_then(Value::as_object) else {
            return Vec::new();
        };
        PlacementField::ALL
            .into_iter()
            .filter(|field| match meta.get(field.key()) {
                None => false,
                Some(value) => match field {
                    PlacementField::Index => parse_index(value).is_none(),
                    _ => Identifier::from_value(value).is_none(),
                },
            })
            .collect()
    }

    /// Write the keys of this placement into `meta`.
    ///
    /// A key whose current value already parses to the same placement is
    /// left untouched, so metadata read from JSON is written back verbatim.
    pub fn write_into(&self, meta: &mut Map<String, Value>) {
        if let Some(section) = &self.section {
            if meta.get("section").and_then(Identifier::from_value).as_ref() != Some(section) {
                meta.insert("section".into(), Value::String(section.to_string()));
            }
        }
        if let Some(parent) = &self.parent {
            if meta.get("parent").and_then(Identifier::from_value).as_ref() != Some(parent) {
                meta.insert("parent".into(), Value::String(parent.to_string()));
            }
        }
        if let Some(index) = self.index {
            if meta.get("index").and_then(parse_index) != Some(index) {
                meta.insert("index".into(), Value::from(index));
            }
        }
    }
}

/// Non-negative integer, integral float, or numeric string.
fn parse_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                usize::try_from(u).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as usize)
            }
        }
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}
