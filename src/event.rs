use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::properties::{Nid, Strength};

/// Incremental change notifications emitted by [crate::map::NoteMap] so that
/// caches and views can track map mutations without polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEvent {
    NodeAdded(Nid, Strength),
    /// Node strength raised. Never emitted for demotion.
    NodePromoted(Nid, Strength),
    NodeRemoved(Nid),
    /// From ID, To ID, edge strength
    ConnectionAdded(Nid, Nid, Strength),
    ConnectionPromoted(Nid, Nid, Strength),
    ConnectionRemoved(Nid, Nid),
}

impl Display for MapEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            MapEvent::NodeAdded(_, _) => write!(f, "NodeAdded"),
            MapEvent::NodePromoted(_, _) => write!(f, "NodePromoted"),
            MapEvent::NodeRemoved(_) => write!(f, "NodeRemoved"),
            MapEvent::ConnectionAdded(_, _, _) => write!(f, "ConnectionAdded"),
            MapEvent::ConnectionPromoted(_, _, _) => write!(f, "ConnectionPromoted"),
            MapEvent::ConnectionRemoved(_, _) => write!(f, "ConnectionRemoved"),
        }
    }
}
