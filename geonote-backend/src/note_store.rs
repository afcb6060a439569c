//! NoteStore — in-memory session note collection.
//!
//! Ordered newest-first; the only mutators are `create` and `delete`, both
//! atomic under the store mutex. Nothing here survives the process.

use chrono::Utc;
use geonote_types::{LocationSnapshot, Note, ValidationError};
use std::sync::Mutex;
use uuid::Uuid;

pub struct NoteStore {
    notes: Mutex<Vec<Note>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
        }
    }

    /// Create a note, freezing the supplied location snapshot as-is.
    ///
    /// Title and content are stored trimmed; an empty trimmed field fails
    /// validation and leaves the collection untouched.
    pub fn create(
        &self,
        title: &str,
        content: &str,
        location: Option<LocationSnapshot>,
    ) -> Result<Note, ValidationError> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let note = Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            location,
            created_at: Utc::now(),
        };

        let mut notes = self.notes.lock().unwrap();
        notes.insert(0, note.clone());
        log::info!("Created note {} ({} total)", note.id, notes.len());

        Ok(note)
    }

    /// Remove the note with `id` if present. Idempotent: deleting an
    /// absent id is a no-op, not an error.
    pub fn delete(&self, id: Uuid) -> bool {
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|note| note.id != id);

        let deleted = notes.len() < before;
        if deleted {
            log::info!("Deleted note {}", id);
        }
        deleted
    }

    /// Newest-first snapshot of the collection.
    pub fn list(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.notes.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> LocationSnapshot {
        LocationSnapshot {
            latitude: 37.5665,
            longitude: 126.9780,
            accuracy_meters: 10.0,
            address: "Seoul, South Korea".to_string(),
        }
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let store = NoteStore::new();

        assert_eq!(
            store.create("", "x", None),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(
            store.create("x", "", None),
            Err(ValidationError::EmptyContent)
        );
        assert_eq!(
            store.create("  ", "  ", None),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_create_without_location_succeeds() {
        let store = NoteStore::new();
        let note = store
            .create("A", "B", None)
            .expect("Failed to create note");

        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
        assert!(note.location.is_none());
    }

    #[test]
    fn test_create_trims_title_and_content() {
        let store = NoteStore::new();
        let note = store
            .create("  Lunch spot  ", "  Great noodles.  ", None)
            .expect("Failed to create note");

        assert_eq!(note.title, "Lunch spot");
        assert_eq!(note.content, "Great noodles.");
    }

    #[test]
    fn test_create_freezes_location_snapshot() {
        let store = NoteStore::new();
        let s = snapshot();
        let note = store
            .create("Here", "Now", Some(s.clone()))
            .expect("Failed to create note");

        assert_eq!(note.location, Some(s));
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = NoteStore::new();
        let n1 = store.create("First", "1", None).expect("Failed to create");
        let n2 = store.create("Second", "2", None).expect("Failed to create");

        let listed = store.list();
        assert_eq!(listed, vec![n2.clone(), n1.clone()]);

        assert!(store.delete(n1.id));
        assert_eq!(store.list(), vec![n2]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = NoteStore::new();
        let note = store.create("Keep", "me", None).expect("Failed to create");

        assert!(!store.delete(Uuid::new_v4()));
        assert_eq!(store.list(), vec![note.clone()]);

        assert!(store.delete(note.id));
        assert!(!store.delete(note.id));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let store = NoteStore::new();
        let a = store.create("A", "a", None).expect("Failed to create");
        let b = store.create("B", "b", None).expect("Failed to create");
        assert_ne!(a.id, b.id);
    }
}
