//! Storage collaborator
//!
//! The library never persists anything itself; importers hand finished records to a
//! [`NoteStore`]. [`MemoryStore`] keeps them in memory, for tests and dry runs.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::StoreError;
use crate::note::SerializedNote;

/// Where imported notes go
pub trait NoteStore {
    /// Insert or replace a note, returning its id
    fn upsert_note(&mut self, note: SerializedNote) -> Result<Uuid, StoreError>;

    fn get_note(&self, id: &Uuid) -> Option<SerializedNote>;
}

/// An in-memory store keyed by note id
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: BTreeMap<Uuid, SerializedNote>,
    /// Insertion order of ids, for callers that care which note came first
    order: Vec<Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes in the order they were first stored
    pub fn notes(&self) -> impl Iterator<Item = &SerializedNote> {
        self.order.iter().filter_map(|id| self.notes.get(id))
    }
}

impl NoteStore for MemoryStore {
    fn upsert_note(&mut self, note: SerializedNote) -> Result<Uuid, StoreError> {
        let id = note.id;
        if self.notes.insert(id, note).is_none() {
            self.order.push(id);
        }
        Ok(id)
    }

    fn get_note(&self, id: &Uuid) -> Option<SerializedNote> {
        self.notes.get(id).cloned()
    }
}
