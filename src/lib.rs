//! Relocate schema nodes into declared sections.
//!
//! Nodes carry placement metadata in `meta`: `section` names an anchor,
//! `parent` asks to be moved under the anchor with that name, and `index`
//! picks a position among the anchor's children. Everything without a
//! resolvable `parent` stays where it was.
//!
//! ```
//! use restructure::domain::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_value(json!([
//!     {"$el": "div", "meta": {"section": "top"}},
//!     {"$el": "span", "meta": {"parent": "top"}}
//! ]));
//! let out = restructure::restructure(schema).to_value();
//! assert_eq!(out[0]["children"][0]["$el"], "span");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

use domain::{Indexer, Rebuilder, Report, RestructureOptions, Schema};

/// Restructure with default options, discarding diagnostics.
pub fn restructure(schema: Schema) -> Schema {
    Rebuilder::rebuild(Indexer::index(schema))
}

/// Restructure with explicit options, returning diagnostics alongside.
pub fn restructure_with(schema: Schema, options: &RestructureOptions) -> (Schema, Report) {
    Rebuilder::rebuild_with(Indexer::index(schema), options)
}
