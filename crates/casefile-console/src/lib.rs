#![forbid(unsafe_code)]

//! Case-file console.
//!
//! Browse a fixed catalog of fictional subject records one at a time and
//! keep an editable, persisted note per subject.
//!
//! - [`catalog`]: subject records and the boot-time catalog.
//! - [`render`]: default console text for a subject.
//! - [`notes`]: fail-soft note persistence.
//! - [`session`]: the viewing/editing state machine.
//! - [`editor`]: the edit buffer behind the console surface.
//! - [`input`]: key bindings and button hit-testing.
//! - [`app`]: all of the above as a runtime `Model`.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod editor;
pub mod input;
pub mod logging;
pub mod notes;
pub mod render;
pub mod session;

pub use app::{AppMsg, CaseFileApp};
pub use catalog::{Catalog, CatalogError, SubjectRecord};
pub use notes::{NoteStore, PersistOutcome};
pub use session::{ConsoleSession, Mode, SessionOptions, Transition};
