//! Note Persistence E2E Tests
//!
//! Notes written through one console session must be visible to a later
//! session on the same file, and a damaged file must never stop the console
//! from showing subjects.
//!
//! ```sh
//! cargo test -p casefile-console --test persistence_e2e
//! ```
//!
//! # Invariants
//!
//! 1. **Restart durability**: a saved note survives a new store instance
//! 2. **Reset durability**: a reset note stays gone after restart
//! 3. **Graceful degradation**: a corrupt file reads as "nothing saved"

use std::fs;
use std::sync::Arc;

use casefile_console::catalog::Catalog;
use casefile_console::notes::{NoteStore, PersistOutcome};
use casefile_console::render::render_default;
use casefile_console::session::{ConsoleSession, SessionOptions, Transition};
use casefile_runtime::kv_store::FileStore;

fn log_jsonl(event: &str, case: &str, passed: bool) {
    eprintln!(r#"{{"event":"{event}","case":"{case}","passed":{passed}}}"#);
}

fn session_on(path: &std::path::Path) -> ConsoleSession {
    ConsoleSession::new(
        Catalog::demo(),
        NoteStore::new(Arc::new(FileStore::new(path))),
        SessionOptions::default(),
    )
}

#[test]
fn note_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");

    let mut first = session_on(&path);
    first.navigate(1);
    first.enter_edit();
    first.set_display_text("second subject, durable");
    assert_eq!(
        first.save(),
        Transition::Saved {
            outcome: PersistOutcome::Stored
        }
    );
    drop(first);

    let mut second = session_on(&path);
    assert_eq!(second.display_text(), render_default(second.current_subject()));
    second.navigate(1);
    assert_eq!(second.display_text(), "second subject, durable");
    log_jsonl("persist", "note_survives_restart", true);
}

#[test]
fn reset_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");

    let mut first = session_on(&path);
    first.enter_edit();
    first.set_display_text("short lived");
    first.save();
    first.enter_edit();
    first.reset();

    let second = session_on(&path);
    assert_eq!(second.notes().load("SUBJECT_001"), None);
    assert_eq!(second.display_text(), render_default(second.current_subject()));
    log_jsonl("persist", "reset_survives_restart", true);
}

#[test]
fn notes_for_each_subject_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let mut session = session_on(&path);

    session.enter_edit();
    session.set_display_text("one");
    session.save();
    session.navigate(1);
    session.enter_edit();
    session.set_display_text("two");
    session.save();

    let notes = NoteStore::new(Arc::new(FileStore::new(&path)));
    assert_eq!(notes.load("SUBJECT_001").as_deref(), Some("one"));
    assert_eq!(notes.load("SUBJECT_002").as_deref(), Some("two"));
}

#[test]
fn corrupt_file_degrades_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    fs::write(&path, "{ not json").unwrap();

    let mut session = session_on(&path);
    assert_eq!(session.display_text(), render_default(session.current_subject()));

    session.navigate(1);
    assert_eq!(session.display_text(), render_default(session.current_subject()));
    log_jsonl("persist", "corrupt_file_degrades_to_defaults", true);
}

#[test]
fn unwritable_location_keeps_session_text() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes every write fail.
    let path = dir.path().join("notes.json");
    fs::create_dir(&path).unwrap();

    let mut session = session_on(&path);
    session.enter_edit();
    session.set_display_text("kept in memory");
    assert_eq!(
        session.save(),
        Transition::Saved {
            outcome: PersistOutcome::Ignored
        }
    );
    assert_eq!(session.display_text(), "kept in memory");
    assert!(!session.is_editing());
}
