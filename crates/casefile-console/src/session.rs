#![forbid(unsafe_code)]

//! Console state machine.
//!
//! [`ConsoleSession`] owns the current subject index, the viewing/editing
//! mode, and the text shown on the console surface. Every operation runs to
//! completion synchronously and reports what happened as a [`Transition`].
//!
//! # Transitions
//!
//! | From | Trigger | Effect | To |
//! |---|---|---|---|
//! | Viewing | `navigate(delta)` | index wraps modulo N, text reloaded | Viewing |
//! | Viewing | `enter_edit` | surface writable | Editing |
//! | Editing | `toggle_edit` / `lock` | save (or keep text, see [`SessionOptions`]) | Viewing |
//! | Editing | `navigate(delta)` | rejected | Editing |
//! | Editing | `save` | note stored | Viewing |
//! | Editing | `reset` | note deleted, default text | Viewing |
//! | Editing | `cancel_edit` | edits discarded, text reloaded | Viewing |
//!
//! Save, reset and cancel are rejected while viewing. Navigation is the only
//! operation rejected while editing: switching subjects mid-edit would
//! silently drop the unsaved buffer.

use tracing::debug;

use crate::catalog::{Catalog, SubjectRecord};
use crate::notes::{NoteStore, PersistOutcome};
use crate::render::render_default;

/// Whether the surface is read-only or writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read-only; navigation allowed.
    #[default]
    Viewing,
    /// Writable; navigation blocked.
    Editing,
}

impl Mode {
    /// Short label for status displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Mode::Viewing => "VIEW",
            Mode::Editing => "EDIT",
        }
    }
}

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Navigation attempted while editing.
    NavigationLocked,
    /// Save, reset, cancel or lock attempted while viewing.
    NotEditing,
    /// Edit mode entered twice.
    AlreadyEditing,
}

/// Observable result of a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved to the subject at `index`.
    Navigated {
        /// New current index.
        index: usize,
    },
    /// Edit mode entered.
    EnteredEdit,
    /// Note saved and edit mode left.
    Saved {
        /// Whether the write reached storage.
        outcome: PersistOutcome,
    },
    /// Edit mode left without saving; edited text stays on screen.
    Locked,
    /// Note deleted, default text restored, edit mode left.
    Reset {
        /// Whether the delete reached storage.
        outcome: PersistOutcome,
    },
    /// Edits discarded, saved-or-default text restored, edit mode left.
    Cancelled,
    /// Nothing changed.
    Rejected(RejectReason),
}

impl Transition {
    /// Whether the operation changed anything.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Transition::Rejected(_))
    }
}

/// Tunables for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// When `true`, Lock behaves exactly like Save. When `false`, Lock only
    /// leaves edit mode: the edited text stays visible but is not stored,
    /// and the next reload of the subject shows the last saved note again.
    pub lock_saves: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { lock_saves: true }
    }
}

/// The single console session: current subject, mode, and surface text.
#[derive(Debug)]
pub struct ConsoleSession {
    catalog: Catalog,
    notes: NoteStore,
    options: SessionOptions,
    current_index: usize,
    mode: Mode,
    display_text: String,
}

impl ConsoleSession {
    /// Start at subject 0 in viewing mode.
    pub fn new(catalog: Catalog, notes: NoteStore, options: SessionOptions) -> Self {
        Self::starting_at(catalog, notes, options, 0)
    }

    /// Start at `index` (taken modulo the catalog size) in viewing mode.
    pub fn starting_at(
        catalog: Catalog,
        notes: NoteStore,
        options: SessionOptions,
        index: usize,
    ) -> Self {
        let current_index = index % catalog.len();
        let mut session = Self {
            catalog,
            notes,
            options,
            current_index,
            mode: Mode::Viewing,
            display_text: String::new(),
        };
        session.load_console_for_current();
        session
    }

    /// Index of the current subject.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current subject.
    #[must_use]
    pub fn current_subject(&self) -> &SubjectRecord {
        self.catalog.at_wrapped(self.current_index)
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the surface is writable.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing)
    }

    /// Text currently on the surface.
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// The catalog being browsed.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The note store.
    #[must_use]
    pub const fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> SessionOptions {
        self.options
    }

    /// Replace the live edit buffer. Ignored (returns `false`) unless editing.
    pub fn set_display_text(&mut self, text: impl Into<String>) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.display_text = text.into();
        true
    }

    /// Move by `delta` subjects, wrapping at both ends.
    pub fn navigate(&mut self, delta: isize) -> Transition {
        if self.is_editing() {
            return self.log(Transition::Rejected(RejectReason::NavigationLocked));
        }
        let len = self.catalog.len() as i128;
        let next = (self.current_index as i128 + delta as i128).rem_euclid(len);
        self.current_index = next as usize;
        self.load_console_for_current();
        self.log(Transition::Navigated {
            index: self.current_index,
        })
    }

    /// Make the surface writable.
    pub fn enter_edit(&mut self) -> Transition {
        if self.is_editing() {
            return self.log(Transition::Rejected(RejectReason::AlreadyEditing));
        }
        self.mode = Mode::Editing;
        self.log(Transition::EnteredEdit)
    }

    /// Enter edit mode when viewing, lock when editing.
    pub fn toggle_edit(&mut self) -> Transition {
        if self.is_editing() {
            self.lock()
        } else {
            self.enter_edit()
        }
    }

    /// Leave edit mode through the lock control.
    pub fn lock(&mut self) -> Transition {
        if !self.is_editing() {
            return self.log(Transition::Rejected(RejectReason::NotEditing));
        }
        if self.options.lock_saves {
            return self.save();
        }
        self.mode = Mode::Viewing;
        self.log(Transition::Locked)
    }

    /// Persist the surface text for the current subject and leave edit mode.
    pub fn save(&mut self) -> Transition {
        if !self.is_editing() {
            return self.log(Transition::Rejected(RejectReason::NotEditing));
        }
        let outcome = self
            .notes
            .save(&self.current_subject().subject_id, &self.display_text);
        self.mode = Mode::Viewing;
        self.log(Transition::Saved { outcome })
    }

    /// Delete the current subject's note, restore the default text, and
    /// leave edit mode.
    pub fn reset(&mut self) -> Transition {
        if !self.is_editing() {
            return self.log(Transition::Rejected(RejectReason::NotEditing));
        }
        let subject = self.catalog.at_wrapped(self.current_index);
        let outcome = self.notes.clear(&subject.subject_id);
        self.display_text = render_default(subject);
        self.mode = Mode::Viewing;
        self.log(Transition::Reset { outcome })
    }

    /// Discard the edit buffer and leave edit mode without touching storage.
    pub fn cancel_edit(&mut self) -> Transition {
        if !self.is_editing() {
            return self.log(Transition::Rejected(RejectReason::NotEditing));
        }
        self.mode = Mode::Viewing;
        self.load_console_for_current();
        self.log(Transition::Cancelled)
    }

    /// Text the surface shows for the current subject when freshly loaded:
    /// the saved note if any, else the default render.
    #[must_use]
    pub fn saved_or_default(&self) -> String {
        let subject = self.current_subject();
        self.notes
            .load(&subject.subject_id)
            .unwrap_or_else(|| render_default(subject))
    }

    fn load_console_for_current(&mut self) {
        self.display_text = self.saved_or_default();
    }

    fn log(&self, transition: Transition) -> Transition {
        debug!(
            subject_id = %self.current_subject().subject_id,
            index = self.current_index,
            mode = self.mode.label(),
            ?transition,
            "console transition"
        );
        transition
    }
}
