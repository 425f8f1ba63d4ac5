//! Applies document structure deltas to the note map.
//!
//! One delta is one atomic undo-grouped transaction: either every edit of
//! the delta lands inside a single undo group, or (when no session is
//! resolvable) nothing is mutated at all. Deltas for a document that is
//! still loading are queued and replayed in production order once the note
//! signals readiness; out-of-order application could undo a later add with
//! an earlier remove.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{
    config::SyncSettings,
    error::WeftError,
    map::{
        graph::ConnectParams,
        session::{MapSession, UndoGroup, UndoScope},
    },
    properties::{Nid, Strength, StructureDelta},
};

/// What [MapSynchronizer::apply_structure_delta] did with a delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Applied inside one undo group.
    Applied,
    /// Queued behind the owner's readiness; replayed by
    /// [MapSynchronizer::note_ready].
    Deferred,
}

#[derive(Debug, Default)]
pub struct MapSynchronizer {
    settings: SyncSettings,
    pending: BTreeMap<Nid, VecDeque<StructureDelta>>,
    loading: BTreeSet<Nid>,
}

impl MapSynchronizer {
    pub fn new() -> Self {
        MapSynchronizer::default()
    }

    pub fn with_settings(settings: SyncSettings) -> Self {
        MapSynchronizer {
            settings,
            ..MapSynchronizer::default()
        }
    }

    /// Mark a document as not yet ready to own map mutations. Deltas for it
    /// defer until [MapSynchronizer::note_ready].
    pub fn mark_loading(&mut self, owner: Nid) {
        self.loading.insert(owner);
    }

    pub fn is_loading(&self, owner: &Nid) -> bool {
        self.loading.contains(owner)
    }

    pub fn pending_count(&self, owner: &Nid) -> usize {
        self.pending.get(owner).map(VecDeque::len).unwrap_or(0)
    }

    /// Apply one structure delta against the node owning the document.
    ///
    /// With no resolvable session this reports
    /// [WeftError::UnresolvedOwner] and performs no mutation. While the
    /// owner is loading, or while earlier deltas for it are still queued,
    /// the delta is enqueued FIFO and [SyncOutcome::Deferred] is returned.
    pub fn apply_structure_delta<U: UndoScope>(
        &mut self,
        session: Option<&mut MapSession<U>>,
        owner: Nid,
        delta: StructureDelta,
    ) -> Result<SyncOutcome, WeftError> {
        let Some(session) = session else {
            tracing::error!("No session found to own structure delta for [{owner}]");
            return Err(WeftError::UnresolvedOwner(owner.to_string()));
        };

        if self.loading.contains(&owner) || self.pending_count(&owner) > 0 {
            tracing::debug!("Deferring structure delta for [{owner}] until the note is ready");
            self.pending.entry(owner).or_default().push_back(delta);
            return Ok(SyncOutcome::Deferred);
        }

        self.apply_now(session, owner, delta)?;
        Ok(SyncOutcome::Applied)
    }

    /// Replay the owner's queued deltas in production order, one undo group
    /// per delta. Returns how many deltas were applied.
    pub fn note_ready<U: UndoScope>(
        &mut self,
        session: &mut MapSession<U>,
        owner: Nid,
    ) -> Result<usize, WeftError> {
        self.loading.remove(&owner);
        let Some(mut queue) = self.pending.remove(&owner) else {
            return Ok(0);
        };
        let mut applied = 0;
        while let Some(delta) = queue.pop_front() {
            if let Err(err) = self.apply_now(session, owner, delta) {
                // Keep the untouched remainder queued so ordering survives.
                if !queue.is_empty() {
                    self.pending.insert(owner, queue);
                }
                return Err(err);
            }
            applied += 1;
        }
        Ok(applied)
    }

    fn apply_now<U: UndoScope>(
        &self,
        session: &mut MapSession<U>,
        owner: Nid,
        delta: StructureDelta,
    ) -> Result<(), WeftError> {
        let _group = UndoGroup::new(&mut session.undo);
        let map = &mut session.map;

        // Ensure the owning document is on the map as a user-intentional
        // node; promote but never demote.
        map.get_or_create(owner, Strength::Navigated);

        for removed in delta.removed.iter().filter(|i| i.kind.is_connective()) {
            let Some(to) = removed.to else {
                tracing::debug!("Skipping removal of unresolved reference '{}'", removed.raw);
                continue;
            };
            if let Some(connection) = map.find_connection(owner, to) {
                // Only remove automatic connections.
                if connection.strength == Strength::Connected {
                    map.disconnect_auto(owner, to)?;
                    // Clear out nodes that no longer need to be here.
                    if self.settings.collect_orphans {
                        map.collect_orphan(to);
                    }
                }
            }
        }

        for added in delta.added.iter().filter(|i| i.kind.is_connective()) {
            let Some(to) = added.to else {
                tracing::debug!("Skipping addition of unresolved reference '{}'", added.raw);
                continue;
            };
            map.connect(ConnectParams {
                from: owner,
                to,
                strength: Strength::Connected,
                prevent_recursive: self.settings.prevent_recursive_links,
            });
        }

        Ok(())
    }
}
