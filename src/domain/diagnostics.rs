//! Non-fatal findings collected during a restructuring pass.
//!
//! Every diagnostic describes metadata that was ignored; none of them stops
//! the pass. Locations are JSONPath-like (`$[0].children[2]`).

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::placement::{Identifier, PlacementField};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    #[error("{at}: parent '{parent}' does not match any section, node left in place")]
    UnresolvedParent { at: String, parent: Identifier },

    #[error("{at}: moving into section '{parent}' would nest the node inside itself, node left in place")]
    RelocationCycle { at: String, parent: Identifier },

    #[error("{at}: section '{section}' is already declared at {first}")]
    DuplicateSection {
        at: String,
        section: Identifier,
        first: String,
    },

    #[error("{at}: parent '{parent}' matches {count} sections, node left in place")]
    AmbiguousSection {
        at: String,
        parent: Identifier,
        count: usize,
    },

    #[error("{at}: ignoring malformed meta.{field}")]
    MalformedPlacement { at: String, field: PlacementField },
}

impl Diagnostic {
    /// Location of the node the diagnostic is about.
    pub fn at(&self) -> &str {
        match self {
            Diagnostic::UnresolvedParent { at, .. }
            | Diagnostic::RelocationCycle { at, .. }
            | Diagnostic::DuplicateSection { at, .. }
            | Diagnostic::AmbiguousSection { at, .. }
            | Diagnostic::MalformedPlacement { at, .. } => at,
        }
    }
}

/// Ordered collection of diagnostics for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
