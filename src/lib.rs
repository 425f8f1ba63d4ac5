//! # weft-core
//!
//! A Rust library maintaining a personal knowledge base as a graph of notes
//! connected by links, queryable through a small structured query language.
//!
//! The name "weft" comes from weaving: the weft is the thread carried across
//! the warp, the way links carry meaning across separate notes.
//!
//! ## Overview
//!
//! weft-core has two load-bearing subsystems:
//!
//! - **Graph synchronizer**: keeps a persistent node/connection map
//!   consistent with the live link structure extracted from documents, while
//!   never destroying connections the user created by hand. Document
//!   collaborators report [`properties::StructureDelta`] batches; the
//!   [`map::MapSynchronizer`] applies each one as a single undo-grouped
//!   transaction against the session's [`map::NoteMap`].
//! - **Query engine**: parses query text like
//!   `Notes with #project/active and named 'plan'` into an AST
//!   ([`query::Query`]) and evaluates it against per-note fact views
//!   ([`query::NoteFacts`]) to a boolean match.
//!
//! The document model itself (rich text, file persistence, undo mechanics
//! beyond the grouping contract) belongs to collaborators; weft-core only
//! consumes their structure feed, fact views, and transaction scope.
//!
//! ### Key invariants
//!
//! - Connection and node strength is ordered (`Connected < Navigated`) and
//!   automatic machinery only promotes, never demotes or deletes
//!   `Navigated` entities.
//! - Orphan collection removes only `Connected` nodes with zero remaining
//!   connections.
//! - Query parsing is deterministic and side-effect-free; every pattern is
//!   compiled at parse time so evaluation never fails.
//! - Deltas for a document apply in production order; deltas arriving while
//!   the document loads are deferred and replayed on readiness.
//!
//! ## Quick Start
//!
//! ### Parsing and matching a query
//!
//! ```rust
//! use weft_core::properties::TodoState;
//! use weft_core::query::{evaluate, parse_query_text, NoteFacts, Query};
//! use weft_core::tags::TagName;
//!
//! struct Facts {
//!     tags: Vec<TagName>,
//! }
//!
//! impl NoteFacts for Facts {
//!     fn display_name(&self) -> &str {
//!         "Reading List"
//!     }
//!     fn content(&self) -> &str {
//!         ""
//!     }
//!     fn tags(&self) -> &[TagName] {
//!         &self.tags
//!     }
//!     fn todo_states(&self) -> &[TodoState] {
//!         &[]
//!     }
//!     fn in_scope(&self, _reference: &str) -> bool {
//!         false
//!     }
//!     fn linked_from(&self, _reference: &str) -> bool {
//!         false
//!     }
//!     fn resolve(&self, _query: &Query) -> Vec<String> {
//!         Vec::new()
//!     }
//! }
//!
//! # fn main() -> Result<(), weft_core::query::ParseError> {
//! let query = parse_query_text("Notes with #reading")?;
//! let facts = Facts {
//!     tags: vec![TagName::from("reading/fiction")],
//! };
//! assert!(evaluate(&query, &facts));
//! # Ok(())
//! # }
//! ```
//!
//! ### Synchronizing document structure
//!
//! ```rust
//! use weft_core::map::{MapSession, MapSynchronizer, NoteMap};
//! use weft_core::properties::{Nid, StructureDelta, StructureItem};
//!
//! # fn main() -> Result<(), weft_core::WeftError> {
//! let mut session = MapSession::new(NoteMap::new());
//! let mut synchronizer = MapSynchronizer::new();
//! let owner = Nid::new();
//! let target = Nid::new();
//!
//! let delta = StructureDelta {
//!     added: vec![StructureItem::link(target)],
//!     removed: vec![],
//! };
//! synchronizer.apply_structure_delta(Some(&mut session), owner, delta)?;
//! assert_eq!(session.map.connection_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! Start with [`query::parse_query_text`] and [`query::matcher`] for the
//! query engine, then [`map::MapSynchronizer`] for keeping the map in step
//! with documents. [`properties`] holds the shared building blocks,
//! [`event`] the incremental map-change stream, and [`config`] the TOML
//! settings surface.

pub mod config;
pub mod error;
pub mod event;
pub mod map;
pub mod properties;
pub mod query;
pub mod tags;
#[cfg(test)]
mod tests;

pub use error::*;
pub use query::parser::parse_query_text;
