//! The note map: nodes, connections, sessions, and the structure
//! synchronizer.
//!
//! This module provides the graph side of the workspace:
//! - [`NoteMap`]: node states plus a directed connection graph
//! - [`MapSession`]: exclusive ownership of a map paired with the
//!   collaborator-provided undo grouping scope
//! - [`MapSynchronizer`]: applies document structure deltas to the map while
//!   protecting user-curated (`Navigated`) entities

mod graph;
mod session;
mod sync;

pub use graph::{ConnectParams, NoteMap};
pub use session::{MapSession, NullUndoScope, UndoGroup, UndoScope};
pub use sync::{MapSynchronizer, SyncOutcome};
