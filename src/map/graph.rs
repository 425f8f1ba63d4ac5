//! Graph data structures for the note map.
//!
//! [`NoteMap`] pairs a state map (one [`MapNode`] per addressable content
//! target) with a directed connection graph whose edge weights are
//! [`Strength`] values. Adjacency is insertion-ordered, so a node's outgoing
//! and incoming connection lists are stable and ordered.

use petgraph::{graphmap::DiGraphMap, Direction};
use std::{
    collections::{btree_map::Entry as BTreeEntry, BTreeMap, BTreeSet},
    fmt,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    error::WeftError,
    event::MapEvent,
    properties::{Connection, MapNode, Nid, Strength},
};

/// Parameters for [NoteMap::connect].
#[derive(Clone, Copy, Debug)]
pub struct ConnectParams {
    pub from: Nid,
    pub to: Nid,
    pub strength: Strength,
    /// Refuse to create a connection closing a cycle back to an ancestor
    /// already reached through the current connect operation.
    pub prevent_recursive: bool,
}

#[derive(Clone, Default)]
pub struct NoteMap {
    states: BTreeMap<Nid, MapNode>,
    connections: DiGraphMap<Nid, Strength>,
    events: Option<UnboundedSender<MapEvent>>,
}

impl NoteMap {
    pub fn new() -> Self {
        NoteMap::default()
    }

    /// Attach an event channel. Every subsequent mutation emits a
    /// [MapEvent]; a dropped receiver degrades to a log line.
    pub fn with_events(mut self, sender: UnboundedSender<MapEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    fn send(events: &Option<UnboundedSender<MapEvent>>, event: MapEvent) {
        if let Some(tx) = events {
            if tx.send(event).is_err() {
                tracing::warn!("Map event receiver dropped; event not delivered");
            }
        }
    }

    pub fn states(&self) -> &BTreeMap<Nid, MapNode> {
        &self.states
    }

    pub fn get(&self, nid: &Nid) -> Option<&MapNode> {
        self.states.get(nid)
    }

    pub fn contains(&self, nid: &Nid) -> bool {
        self.states.contains_key(nid)
    }

    pub fn node_count(&self) -> usize {
        self.states.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.connections.edge_count() == 0
    }

    /// Create the node if absent, or raise its strength if the requested
    /// strength is higher. Never demotes.
    pub fn get_or_create(&mut self, nid: Nid, strength: Strength) -> &MapNode {
        match self.states.entry(nid) {
            BTreeEntry::Occupied(entry) => {
                let node = entry.into_mut();
                if strength > node.strength {
                    node.strength = strength;
                    Self::send(&self.events, MapEvent::NodePromoted(nid, strength));
                }
                node
            }
            BTreeEntry::Vacant(entry) => {
                self.connections.add_node(nid);
                Self::send(&self.events, MapEvent::NodeAdded(nid, strength));
                entry.insert(MapNode::new(nid, strength))
            }
        }
    }

    pub fn set_label(&mut self, nid: &Nid, label: impl Into<String>) {
        if let Some(node) = self.states.get_mut(nid) {
            node.label = label.into();
        }
    }

    /// Ordered outgoing connections of `nid`.
    pub fn outgoing(&self, nid: Nid) -> Vec<Connection> {
        self.connections
            .edges_directed(nid, Direction::Outgoing)
            .map(|(from, to, strength)| Connection {
                from,
                to,
                strength: *strength,
            })
            .collect()
    }

    /// Ordered incoming connections of `nid`.
    pub fn incoming(&self, nid: Nid) -> Vec<Connection> {
        self.connections
            .edges_directed(nid, Direction::Incoming)
            .map(|(from, to, strength)| Connection {
                from,
                to,
                strength: *strength,
            })
            .collect()
    }

    pub fn find_connection(&self, from: Nid, to: Nid) -> Option<Connection> {
        self.connections
            .edge_weight(from, to)
            .map(|strength| Connection {
                from,
                to,
                strength: *strength,
            })
    }

    /// Create (or promote) a connection. Duplicate connections at the same
    /// or weaker strength are no-ops, never errors. Returns the resulting
    /// connection, or `None` when the request was refused (self-connection
    /// or recursion prevention).
    pub fn connect(&mut self, params: ConnectParams) -> Option<Connection> {
        let mut visited = BTreeSet::from([params.from]);
        self.connect_with_context(params, &mut visited)
    }

    /// [NoteMap::connect] with an explicit traversal context. `visited`
    /// carries the ancestor set of the current connect operation so that
    /// recursion prevention is testable in isolation; callers expanding
    /// links recursively pass the accumulated set back in.
    pub fn connect_with_context(
        &mut self,
        params: ConnectParams,
        visited: &mut BTreeSet<Nid>,
    ) -> Option<Connection> {
        let ConnectParams {
            from,
            to,
            strength,
            prevent_recursive,
        } = params;

        if from == to {
            tracing::warn!("Ignoring self-connection (infinite loop) on [{from}]");
            return None;
        }
        if prevent_recursive && visited.contains(&to) {
            tracing::debug!("Refusing recursive connection [{from} -> {to}]");
            return None;
        }

        self.get_or_create(from, strength);
        self.get_or_create(to, strength);
        visited.insert(to);

        match self.connections.edge_weight(from, to).copied() {
            Some(existing) => {
                // Promote but never demote; a duplicate at the same or
                // weaker strength is a no-op.
                if strength > existing {
                    self.connections.add_edge(from, to, strength);
                    Self::send(&self.events, MapEvent::ConnectionPromoted(from, to, strength));
                }
            }
            None => {
                self.connections.add_edge(from, to, strength);
                Self::send(&self.events, MapEvent::ConnectionAdded(from, to, strength));
            }
        }

        self.find_connection(from, to)
    }

    /// Remove a connection regardless of strength. This is the explicit
    /// user-action path; automatic machinery goes through
    /// [NoteMap::disconnect_auto].
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let removed = self
            .connections
            .remove_edge(connection.from, connection.to)
            .is_some();
        if removed {
            Self::send(
                &self.events,
                MapEvent::ConnectionRemoved(connection.from, connection.to),
            );
        }
        removed
    }

    /// Remove a connection on behalf of the synchronizer. The connection
    /// must be exactly `Connected`; removing a `Navigated` connection here
    /// is a programming error.
    pub fn disconnect_auto(&mut self, from: Nid, to: Nid) -> Result<bool, WeftError> {
        let Some(strength) = self.connections.edge_weight(from, to).copied() else {
            return Ok(false);
        };
        if !strength.is_automatic() {
            debug_assert!(
                false,
                "synchronizer attempted to remove a {strength} connection [{from} -> {to}]"
            );
            return Err(WeftError::InvariantViolation(format!(
                "attempted automatic removal of a {strength} connection [{from} -> {to}]"
            )));
        }
        self.connections.remove_edge(from, to);
        Self::send(&self.events, MapEvent::ConnectionRemoved(from, to));
        Ok(true)
    }

    /// Delete the node if it is `Connected` and has no remaining
    /// connections in either direction. `Navigated` nodes always survive.
    pub fn collect_orphan(&mut self, nid: Nid) -> bool {
        let Some(node) = self.states.get(&nid) else {
            return false;
        };
        if !node.strength.is_automatic() {
            return false;
        }
        let disconnected = self
            .connections
            .neighbors_directed(nid, Direction::Incoming)
            .next()
            .is_none()
            && self
                .connections
                .neighbors_directed(nid, Direction::Outgoing)
                .next()
                .is_none();
        if !disconnected {
            return false;
        }
        self.connections.remove_node(nid);
        self.states.remove(&nid);
        Self::send(&self.events, MapEvent::NodeRemoved(nid));
        true
    }

    /// Remove a node and all its connections. This is the explicit
    /// user-action path; the synchronizer only deletes through
    /// [NoteMap::collect_orphan].
    pub fn delete(&mut self, nid: Nid) -> Option<MapNode> {
        let node = self.states.remove(&nid)?;
        let edges: Vec<(Nid, Nid)> = self
            .outgoing(nid)
            .into_iter()
            .chain(self.incoming(nid))
            .map(|c| (c.from, c.to))
            .collect();
        self.connections.remove_node(nid);
        for (from, to) in edges {
            Self::send(&self.events, MapEvent::ConnectionRemoved(from, to));
        }
        Self::send(&self.events, MapEvent::NodeRemoved(nid));
        Some(node)
    }

    pub fn display_contents(&self) -> String {
        let nodes = self
            .states
            .values()
            .map(|node| format!("{}: {}", node.display_label(), node.strength))
            .collect::<Vec<String>>()
            .join(",\n- ");
        let edges = self
            .connections
            .all_edges()
            .map(|(from, to, strength)| {
                let from = self
                    .states
                    .get(&from)
                    .map(|n| n.display_label())
                    .unwrap_or_else(|| from.to_string());
                let to = self
                    .states
                    .get(&to)
                    .map(|n| n.display_label())
                    .unwrap_or_else(|| to.to_string());
                format!("{from} -> {to}: {strength}")
            })
            .collect::<Vec<String>>()
            .join("\n- ");
        format!("nodes:\n- {nodes},\nconnections:\n- {edges}")
    }
}

impl fmt::Debug for NoteMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NoteMap")
            .field("nodes", &self.states.len())
            .field("connections", &self.connections.edge_count())
            .finish()
    }
}

impl fmt::Display for NoteMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_contents())
    }
}
