//! Directory-backed note store
//!
//! Each note is one pretty-printed JSON file named `<id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use note_babel::import::NoteStore;
use note_babel::{SerializedNote, StoreError};
use tracing::debug;
use uuid::Uuid;

pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a store directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| StoreError(format!("Cannot create store '{}': {e}", root.display())))?;
        Ok(Self { root })
    }

    fn path_for(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl NoteStore for JsonDirStore {
    fn upsert_note(&mut self, note: SerializedNote) -> Result<Uuid, StoreError> {
        let path = self.path_for(&note.id);
        let json = serde_json::to_string_pretty(&note)
            .map_err(|e| StoreError(format!("Cannot encode note {}: {e}", note.id)))?;
        fs::write(&path, json)
            .map_err(|e| StoreError(format!("Cannot write '{}': {e}", path.display())))?;
        debug!(id = %note.id, path = %path.display(), "note stored");
        Ok(note.id)
    }

    fn get_note(&self, id: &Uuid) -> Option<SerializedNote> {
        let raw = fs::read_to_string(self.path_for(id)).ok()?;
        serde_json::from_str(&raw).ok()
    }
}
