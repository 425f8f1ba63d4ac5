//! Session ownership and the undo transaction scope.
//!
//! The note map is exclusively owned by the active session; only the
//! synchronizer and explicit user actions mutate it, and mutation happens
//! inside the collaborator's undo grouping so a single user-facing undo
//! reverses an entire delta's effects.

use crate::map::NoteMap;

/// The transaction-grouping primitive a workspace collaborator provides:
/// "run the given block as one undoable unit". Implementations pair every
/// [UndoScope::open_group] with exactly one [UndoScope::close_group].
pub trait UndoScope {
    fn open_group(&mut self);
    fn close_group(&mut self);
}

/// Scoped acquisition of an undo group. Closing is guaranteed on every exit
/// path, including early returns and failures, because it happens on drop.
pub struct UndoGroup<'a> {
    scope: &'a mut dyn UndoScope,
}

impl<'a> UndoGroup<'a> {
    pub fn new(scope: &'a mut dyn UndoScope) -> Self {
        scope.open_group();
        UndoGroup { scope }
    }
}

impl Drop for UndoGroup<'_> {
    fn drop(&mut self) {
        self.scope.close_group();
    }
}

/// No-op scope for sessions without an undo stack (tests, batch imports).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullUndoScope;

impl UndoScope for NullUndoScope {
    fn open_group(&mut self) {}
    fn close_group(&mut self) {}
}

/// The active session: the note map plus the undo scope that groups its
/// mutations.
#[derive(Debug)]
pub struct MapSession<U: UndoScope = NullUndoScope> {
    pub map: NoteMap,
    pub undo: U,
}

impl MapSession<NullUndoScope> {
    pub fn new(map: NoteMap) -> Self {
        MapSession {
            map,
            undo: NullUndoScope,
        }
    }
}

impl<U: UndoScope> MapSession<U> {
    pub fn with_undo(map: NoteMap, undo: U) -> Self {
        MapSession { map, undo }
    }
}
