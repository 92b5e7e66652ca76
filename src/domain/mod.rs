//! Domain layer: schema model and the restructuring core
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod indexer;
pub mod merge;
pub mod outline;
pub mod placement;
pub mod rebuilder;
pub mod resolve;
pub mod schema;
pub mod visit;

pub use arena::{IndexedNode, NodeId, RegistryEntry, SchemaArena};
pub use diagnostics::{Diagnostic, Report};
pub use error::{DomainError, DomainResult};
pub use indexer::{Indexer, Registries, Shape};
pub use outline::ToOutline;
pub use placement::{Identifier, Placement, PlacementField};
pub use rebuilder::{Rebuilder, RestructureOptions};
pub use resolve::DuplicateSections;
pub use schema::{Conditional, Element, Schema, SchemaNode, Tag, TextLeaf};
