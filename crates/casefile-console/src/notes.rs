#![forbid(unsafe_code)]

//! Per-subject persisted notes.
//!
//! [`NoteStore`] is the only path from the console to durable storage. Its
//! contract is fail-soft: a backend error is logged and absorbed, never
//! returned. Reads that fail look exactly like "nothing saved", and writes
//! that fail leave the caller's in-memory text as the only copy.
//!
//! Keys are namespaced as `casefile_console_v1:<subject_id>` so notes never
//! collide with anything else sharing the backend.

use std::fmt;
use std::sync::Arc;

use casefile_runtime::kv_store::KeyValueStore;
use tracing::{debug, warn};

/// Namespace prepended to every subject id.
pub const NOTE_KEY_PREFIX: &str = "casefile_console_v1:";

/// Storage key for a subject's note.
#[must_use]
pub fn note_key(subject_id: &str) -> String {
    format!("{NOTE_KEY_PREFIX}{subject_id}")
}

/// Result of a write through the note store.
///
/// `Ignored` means the backend refused the write and the failure was
/// absorbed; it is informational only and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The backend accepted the write.
    Stored,
    /// The backend failed; the failure was logged and dropped.
    Ignored,
}

impl PersistOutcome {
    /// Whether the write reached the backend.
    #[must_use]
    pub const fn is_stored(self) -> bool {
        matches!(self, Self::Stored)
    }
}

/// Fail-soft note persistence over a [`KeyValueStore`].
#[derive(Clone)]
pub struct NoteStore {
    backend: Arc<dyn KeyValueStore>,
}

impl NoteStore {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Name of the backing store.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Last saved note for `subject_id`, or `None` if there is none or the
    /// backend could not be read.
    #[must_use]
    pub fn load(&self, subject_id: &str) -> Option<String> {
        match self.backend.get(&note_key(subject_id)) {
            Ok(note) => note,
            Err(error) => {
                warn!(
                    subject_id,
                    backend = self.backend.name(),
                    %error,
                    "note read failed, falling back to default view"
                );
                None
            }
        }
    }

    /// Save `text` as the note for `subject_id`.
    pub fn save(&self, subject_id: &str, text: &str) -> PersistOutcome {
        match self.backend.set(&note_key(subject_id), text) {
            Ok(()) => {
                debug!(subject_id, bytes = text.len(), "note saved");
                PersistOutcome::Stored
            }
            Err(error) => {
                warn!(
                    subject_id,
                    backend = self.backend.name(),
                    %error,
                    "note write failed, edit kept for this session only"
                );
                PersistOutcome::Ignored
            }
        }
    }

    /// Delete the note for `subject_id`.
    pub fn clear(&self, subject_id: &str) -> PersistOutcome {
        match self.backend.remove(&note_key(subject_id)) {
            Ok(()) => {
                debug!(subject_id, "note cleared");
                PersistOutcome::Stored
            }
            Err(error) => {
                warn!(
                    subject_id,
                    backend = self.backend.name(),
                    %error,
                    "note delete failed"
                );
                PersistOutcome::Ignored
            }
        }
    }
}

impl fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_runtime::kv_store::{DisabledStore, MemoryStore};

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(note_key("SUBJECT_001"), "casefile_console_v1:SUBJECT_001");
    }

    #[test]
    fn save_load_clear_round_trip() {
        let backend = Arc::new(MemoryStore::new());
        let notes = NoteStore::new(backend.clone());

        assert_eq!(notes.load("S1"), None);
        assert_eq!(notes.save("S1", "hello\nworld"), PersistOutcome::Stored);
        assert_eq!(notes.load("S1").as_deref(), Some("hello\nworld"));
        assert_eq!(backend.keys(), vec![note_key("S1")]);

        assert_eq!(notes.clear("S1"), PersistOutcome::Stored);
        assert_eq!(notes.load("S1"), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn unrelated_keys_are_untouched() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("S1", "foreign data").unwrap();
        let notes = NoteStore::new(backend.clone());

        assert_eq!(notes.load("S1"), None);
        notes.save("S1", "mine");
        notes.clear("S1");
        assert_eq!(backend.get("S1").unwrap().as_deref(), Some("foreign data"));
    }

    #[test]
    fn failures_are_absorbed() {
        let notes = NoteStore::new(Arc::new(DisabledStore::new("blocked")));
        assert_eq!(notes.load("S1"), None);
        assert_eq!(notes.save("S1", "text"), PersistOutcome::Ignored);
        assert_eq!(notes.clear("S1"), PersistOutcome::Ignored);
        assert!(!PersistOutcome::Ignored.is_stored());
        assert_eq!(notes.backend_name(), "DisabledStore");
    }
}
