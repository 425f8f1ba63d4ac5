//! Structure synchronization integration tests
//!
//! Drives the synchronizer through realistic editing sessions: links added
//! and removed across several notes, deferred replay for a loading note,
//! orphan collection, and `linked from` queries answered from the live map
//! through a map-backed fact view.

use test_log::test;

use weft_core::map::{MapSession, MapSynchronizer, NoteMap, SyncOutcome};
use weft_core::properties::{Nid, Strength, StructureDelta, StructureItem, TodoState};
use weft_core::query::{evaluate, parse_query_text, NoteFacts, Query};
use weft_core::tags::TagName;

/// Fact view answering `linked from` clauses from the live note map.
struct MapFacts<'a> {
    map: &'a NoteMap,
    nid: Nid,
    name: String,
}

impl NoteFacts for MapFacts<'_> {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &str {
        ""
    }

    fn tags(&self) -> &[TagName] {
        &[]
    }

    fn todo_states(&self) -> &[TodoState] {
        &[]
    }

    fn in_scope(&self, _reference: &str) -> bool {
        false
    }

    fn linked_from(&self, reference: &str) -> bool {
        self.map.incoming(self.nid).iter().any(|connection| {
            self.map
                .get(&connection.from)
                .map(|node| node.label.eq_ignore_ascii_case(reference))
                .unwrap_or(false)
        })
    }

    fn resolve(&self, _query: &Query) -> Vec<String> {
        Vec::new()
    }
}

fn add_links(targets: &[Nid]) -> StructureDelta {
    StructureDelta {
        added: targets.iter().copied().map(StructureItem::link).collect(),
        removed: vec![],
    }
}

fn remove_links(targets: &[Nid]) -> StructureDelta {
    StructureDelta {
        added: vec![],
        removed: targets.iter().copied().map(StructureItem::link).collect(),
    }
}

#[test]
fn editing_session_keeps_map_consistent() {
    let mut session = MapSession::new(NoteMap::new());
    let mut synchronizer = MapSynchronizer::new();

    let home = Nid::new();
    let projects = Nid::new();
    let journal = Nid::new();

    // Home links to Projects and Journal.
    synchronizer
        .apply_structure_delta(Some(&mut session), home, add_links(&[projects, journal]))
        .unwrap();
    // Journal links back to Home: mutual links stay at exactly two edges.
    synchronizer
        .apply_structure_delta(Some(&mut session), journal, add_links(&[home]))
        .unwrap();

    assert_eq!(session.map.node_count(), 3);
    assert_eq!(session.map.connection_count(), 3);
    assert!(session.map.find_connection(home, journal).is_some());
    assert!(session.map.find_connection(journal, home).is_some());

    // Editing Home to drop the Projects link collects the orphaned node.
    synchronizer
        .apply_structure_delta(Some(&mut session), home, remove_links(&[projects]))
        .unwrap();
    assert!(!session.map.contains(&projects));
    // Journal keeps both of its edges.
    assert_eq!(session.map.connection_count(), 2);
}

#[test]
fn linked_from_query_consults_the_map() {
    let mut session = MapSession::new(NoteMap::new());
    let mut synchronizer = MapSynchronizer::new();

    let home = Nid::new();
    let target = Nid::new();
    synchronizer
        .apply_structure_delta(Some(&mut session), home, add_links(&[target]))
        .unwrap();
    session.map.set_label(&home, "Home");
    session.map.set_label(&target, "Target");

    let query = parse_query_text("Notes linked from [[Home]]").unwrap();
    let facts = MapFacts {
        map: &session.map,
        nid: target,
        name: "Target".to_string(),
    };
    assert!(evaluate(&query, &facts));

    // Promote the target so orphan collection spares it, then remove the
    // link: the query must stop matching while the node survives.
    session.map.get_or_create(target, Strength::Navigated);
    synchronizer
        .apply_structure_delta(Some(&mut session), home, remove_links(&[target]))
        .unwrap();
    let facts = MapFacts {
        map: &session.map,
        nid: target,
        name: "Target".to_string(),
    };
    assert!(!evaluate(&query, &facts));
}

#[test]
fn deltas_defer_until_note_ready() {
    let mut session = MapSession::new(NoteMap::new());
    let mut synchronizer = MapSynchronizer::new();

    let note = Nid::new();
    let (a, b) = (Nid::new(), Nid::new());

    synchronizer.mark_loading(note);
    assert_eq!(
        synchronizer
            .apply_structure_delta(Some(&mut session), note, add_links(&[a, b]))
            .unwrap(),
        SyncOutcome::Deferred
    );
    assert_eq!(
        synchronizer
            .apply_structure_delta(Some(&mut session), note, remove_links(&[b]))
            .unwrap(),
        SyncOutcome::Deferred
    );
    assert!(session.map.is_empty());

    let replayed = synchronizer.note_ready(&mut session, note).unwrap();
    assert_eq!(replayed, 2);
    assert!(session.map.find_connection(note, a).is_some());
    assert!(session.map.find_connection(note, b).is_none());
    assert!(!session.map.contains(&b));

    // Once ready, later deltas apply immediately.
    assert_eq!(
        synchronizer
            .apply_structure_delta(Some(&mut session), note, add_links(&[b]))
            .unwrap(),
        SyncOutcome::Applied
    );
}

#[test]
fn reapplying_full_structure_is_idempotent() {
    let mut session = MapSession::new(NoteMap::new());
    let mut synchronizer = MapSynchronizer::new();

    let note = Nid::new();
    let targets = [Nid::new(), Nid::new(), Nid::new()];

    for _ in 0..3 {
        synchronizer
            .apply_structure_delta(Some(&mut session), note, add_links(&targets))
            .unwrap();
    }
    assert_eq!(session.map.node_count(), 4);
    assert_eq!(session.map.connection_count(), 3);
}
