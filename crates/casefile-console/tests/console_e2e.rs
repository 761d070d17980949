//! Console E2E Tests
//!
//! Drives [`CaseFileApp`] through the runtime simulator with real key,
//! mouse, and paste events, checking both the session state and the
//! rendered frames.
//!
//! ```sh
//! cargo test -p casefile-console --test console_e2e
//! ```

use std::sync::Arc;

use casefile_console::app::ScreenLayout;
use casefile_console::catalog::Catalog;
use casefile_console::input::{Action, Button, ButtonBar};
use casefile_console::notes::{NoteStore, note_key};
use casefile_console::render::render_default;
use casefile_console::session::{ConsoleSession, Mode, SessionOptions};
use casefile_console::{AppMsg, CaseFileApp};
use casefile_core::event::{
    Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind, PasteEvent,
};
use casefile_runtime::kv_store::{DisabledStore, KeyValueStore, MemoryStore};
use casefile_runtime::simulator::{CmdRecord, ProgramSimulator};

const WIDTH: u16 = 80;
const HEIGHT: u16 = 24;

// ============================================================================
// Test Utilities
// ============================================================================

fn simulator_with(
    backend: Arc<dyn KeyValueStore>,
    options: SessionOptions,
) -> ProgramSimulator<CaseFileApp> {
    let session = ConsoleSession::new(Catalog::demo(), NoteStore::new(backend), options);
    let mut sim = ProgramSimulator::new(CaseFileApp::new(session).with_seed(42));
    sim.init();
    sim.inject_event(Event::Resize {
        width: WIDTH,
        height: HEIGHT,
    });
    sim
}

fn simulator() -> (ProgramSimulator<CaseFileApp>, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    (
        simulator_with(backend.clone(), SessionOptions::default()),
        backend,
    )
}

fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code))
}

fn ctrl(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL))
}

fn type_text(sim: &mut ProgramSimulator<CaseFileApp>, text: &str) {
    for ch in text.chars() {
        sim.inject_event(press(KeyCode::Char(ch)));
    }
}

fn click_button(sim: &mut ProgramSimulator<CaseFileApp>, button: Button) {
    let bar = ButtonBar::layout(ScreenLayout::compute(WIDTH, HEIGHT).buttons);
    let (_, rect) = bar
        .iter()
        .find(|(b, _)| *b == button)
        .expect("button laid out at 80 columns");
    sim.inject_event(Event::Mouse(MouseEvent::new(
        MouseEventKind::Down(MouseButton::Left),
        rect.x + 1,
        rect.y,
    )));
}

fn current_id(sim: &ProgramSimulator<CaseFileApp>) -> String {
    sim.model().session().current_subject().subject_id.clone()
}

fn default_for(index: usize) -> String {
    render_default(Catalog::demo().get(index).unwrap())
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn browse_edit_save_and_wrap() {
    let (mut sim, backend) = simulator();

    sim.send(AppMsg::Action(Action::Navigate(1)));
    assert_eq!(sim.model().session().current_index(), 1);
    sim.send(AppMsg::Action(Action::Navigate(1)));
    assert_eq!(sim.model().session().current_index(), 0);

    sim.send(AppMsg::Action(Action::ToggleEdit));
    assert_eq!(sim.model().session().mode(), Mode::Editing);
    // There is no select-all binding; clear the buffer key by key.
    let len = sim.model().session().display_text().chars().count();
    for _ in 0..len {
        sim.inject_event(press(KeyCode::Backspace));
    }
    assert_eq!(sim.model().session().display_text(), "");
    type_text(&mut sim, "X");
    sim.send(AppMsg::Action(Action::Save));

    assert_eq!(
        backend.get(&note_key("SUBJECT_001")).unwrap().as_deref(),
        Some("X")
    );
    assert!(!sim.model().session().is_editing());

    sim.send(AppMsg::Action(Action::Navigate(1)));
    assert_eq!(sim.model().session().current_index(), 1);
    assert_eq!(sim.model().session().display_text(), default_for(1));
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn arrows_navigate_and_wrap_while_viewing() {
    let (mut sim, _) = simulator();
    sim.inject_event(press(KeyCode::Left));
    assert_eq!(current_id(&sim), "SUBJECT_002");
    sim.inject_event(press(KeyCode::Right));
    assert_eq!(current_id(&sim), "SUBJECT_001");
}

#[test]
fn arrows_move_cursor_not_subject_while_editing() {
    let (mut sim, _) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(press(KeyCode::Right));
    sim.inject_event(press(KeyCode::Left));
    assert_eq!(current_id(&sim), "SUBJECT_001");
    assert!(sim.model().session().is_editing());
}

#[test]
fn ctrl_s_saves_typed_note() {
    let (mut sim, backend) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(press(KeyCode::Enter));
    type_text(&mut sim, "analyst: follow up");
    sim.inject_event(ctrl('s'));

    let saved = backend.get(&note_key("SUBJECT_001")).unwrap().unwrap();
    assert!(saved.starts_with("> INIT CASEFILE_DB :: OK"));
    assert!(saved.ends_with("STATUS: READY\nanalyst: follow up"));
    assert!(!sim.model().session().is_editing());

    // The note survives a round trip through another subject.
    sim.inject_event(press(KeyCode::Right));
    sim.inject_event(press(KeyCode::Left));
    assert_eq!(sim.model().session().display_text(), saved);
}

#[test]
fn ctrl_s_while_viewing_does_nothing() {
    let (mut sim, backend) = simulator();
    sim.inject_event(ctrl('s'));
    assert!(backend.is_empty());
    assert!(!sim.model().session().is_editing());
}

#[test]
fn escape_discards_edits() {
    let (mut sim, backend) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    type_text(&mut sim, "scratch");
    sim.inject_event(press(KeyCode::Escape));

    assert_eq!(sim.model().session().display_text(), default_for(0));
    assert_eq!(sim.model().editor().text(), default_for(0));
    assert!(backend.is_empty());
    assert_eq!(sim.model().status(), "REVERTED");
}

#[test]
fn ctrl_r_resets_saved_note() {
    let (mut sim, backend) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    type_text(&mut sim, "!");
    sim.inject_event(ctrl('s'));
    assert_eq!(backend.len(), 1);

    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(ctrl('r'));
    assert!(backend.is_empty());
    assert_eq!(sim.model().session().display_text(), default_for(0));
    assert!(!sim.model().session().is_editing());
}

#[test]
fn q_quits_only_while_viewing() {
    let (mut sim, _) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(press(KeyCode::Char('q')));
    assert!(sim.is_running());
    assert!(sim.model().session().display_text().ends_with('q'));

    sim.inject_event(press(KeyCode::Escape));
    sim.inject_event(press(KeyCode::Char('q')));
    assert!(!sim.is_running());
    assert!(matches!(sim.command_log().last(), Some(CmdRecord::Quit)));
}

#[test]
fn ctrl_c_quits_while_editing() {
    let (mut sim, _) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(ctrl('c'));
    assert!(!sim.is_running());
}

// ============================================================================
// Mouse
// ============================================================================

#[test]
fn buttons_drive_the_session() {
    let (mut sim, backend) = simulator();

    click_button(&mut sim, Button::Next);
    assert_eq!(current_id(&sim), "SUBJECT_002");
    click_button(&mut sim, Button::Prev);
    assert_eq!(current_id(&sim), "SUBJECT_001");

    click_button(&mut sim, Button::Edit);
    assert!(sim.model().session().is_editing());
    click_button(&mut sim, Button::Next);
    assert_eq!(current_id(&sim), "SUBJECT_001");

    type_text(&mut sim, "?");
    click_button(&mut sim, Button::Save);
    assert_eq!(backend.len(), 1);

    click_button(&mut sim, Button::Edit);
    click_button(&mut sim, Button::Reset);
    assert!(backend.is_empty());
    assert!(!sim.model().session().is_editing());
}

#[test]
fn disabled_buttons_ignore_clicks() {
    let (mut sim, backend) = simulator();
    click_button(&mut sim, Button::Save);
    click_button(&mut sim, Button::Reset);
    assert!(backend.is_empty());
    assert!(!sim.model().session().is_editing());
    assert_eq!(sim.model().session().display_text(), default_for(0));
}

#[test]
fn lock_button_saves_by_default() {
    let (mut sim, backend) = simulator();
    click_button(&mut sim, Button::Edit);
    type_text(&mut sim, "#");
    click_button(&mut sim, Button::Edit);
    assert!(!sim.model().session().is_editing());
    assert!(
        backend
            .get(&note_key("SUBJECT_001"))
            .unwrap()
            .is_some_and(|note| note.ends_with('#'))
    );
}

#[test]
fn non_saving_lock_keeps_text_until_reload() {
    let backend = Arc::new(MemoryStore::new());
    let mut sim = simulator_with(backend.clone(), SessionOptions { lock_saves: false });
    click_button(&mut sim, Button::Edit);
    type_text(&mut sim, "#");
    click_button(&mut sim, Button::Edit);

    assert!(backend.is_empty());
    assert!(sim.model().session().display_text().ends_with('#'));
    sim.inject_event(press(KeyCode::Right));
    sim.inject_event(press(KeyCode::Left));
    assert_eq!(sim.model().session().display_text(), default_for(0));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn frame_reflects_mode_and_subject() {
    let (mut sim, _) = simulator();
    let frame = sim.capture_frame(WIDTH, HEIGHT);
    assert!(frame.row_text(0).contains("SUBJECT_001"));
    assert!(frame.row_text(0).contains("01/02"));
    assert!(frame.row_text(0).contains("CF-0001"));
    assert!(frame.row_text(1).contains("img/rami.jpeg"));
    assert!(frame.row_text(2).contains("CONSOLE"));
    assert!(frame.row_text(4).contains("> LOAD SUBJECT     :: SUBJECT_001"));
    assert!(frame.row_text(HEIGHT - 1).contains("[ EDIT ]"));
    assert_eq!(sim.last_cursor(), None);

    sim.inject_event(press(KeyCode::Right));
    let frame = sim.capture_frame(WIDTH, HEIGHT);
    assert!(frame.row_text(0).contains("SUBJECT_002"));
    assert!(frame.row_text(0).contains("02/02"));

    sim.inject_event(press(KeyCode::Char('e')));
    let frame = sim.capture_frame(WIDTH, HEIGHT);
    assert!(frame.row_text(2).contains("CONSOLE :: EDITING"));
    assert!(frame.row_text(HEIGHT - 1).contains("[ LOCK ]"));
    assert!(sim.last_cursor().is_some());
}

#[test]
fn cursor_tracks_typing_at_end_of_text() {
    let (mut sim, _) = simulator();
    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(press(KeyCode::Enter));
    type_text(&mut sim, "abc");
    sim.capture_frame(WIDTH, HEIGHT);
    let (x, y) = sim.last_cursor().expect("cursor while editing");
    // Panel border at column 0, text starts at column 1.
    assert_eq!(x, 4);
    let frame = sim.last_frame().unwrap();
    assert_eq!(frame.row_text(y).trim_end_matches('│').trim_end(), "│abc");
}

#[test]
fn viewing_scroll_is_clamped() {
    let (mut sim, _) = simulator();
    sim.inject_event(Event::Resize {
        width: WIDTH,
        height: 10,
    });
    for _ in 0..10 {
        sim.inject_event(press(KeyCode::PageDown));
    }
    let lines = default_for(0).split('\n').count();
    let visible = usize::from(ScreenLayout::compute(WIDTH, 10).panel_inner().height);
    let max = lines - visible;
    assert!(max > 0);
    assert_eq!(sim.model().scroll(), max);

    let frame = sim.capture_frame(WIDTH, 10);
    let expected = default_for(0);
    let top_line = expected.split('\n').nth(max).unwrap();
    assert!(frame.row_text(3).contains(top_line));

    for _ in 0..3 {
        sim.inject_event(press(KeyCode::PageUp));
    }
    assert_eq!(sim.model().scroll(), 0);
}

#[test]
fn paste_inserts_at_cursor() {
    let (mut sim, _) = simulator();
    sim.inject_event(Event::Paste(PasteEvent::new("ignored while viewing")));
    assert_eq!(sim.model().session().display_text(), default_for(0));

    sim.inject_event(press(KeyCode::Char('e')));
    sim.inject_event(Event::Paste(PasteEvent::new("\r\nline one\r\nline two")));
    assert!(
        sim.model()
            .session()
            .display_text()
            .ends_with("STATUS: READY\nline one\nline two")
    );
}

#[test]
fn clock_refreshes_on_tick() {
    let (mut sim, _) = simulator();
    assert!(sim.tick_rate().is_some());
    sim.tick(3);
    assert!(sim.is_running());
    let frame = sim.capture_frame(WIDTH, HEIGHT);
    let header = frame.row_text(0);
    let clock = header.rsplit(' ').next().unwrap();
    assert_eq!(clock.len(), 8);
    assert_eq!(clock.matches(':').count(), 2);
}

// ============================================================================
// Persistence failure
// ============================================================================

#[test]
fn unavailable_storage_is_invisible_to_the_user() {
    let mut sim = simulator_with(
        Arc::new(DisabledStore::new("blocked")),
        SessionOptions::default(),
    );
    sim.inject_event(press(KeyCode::Char('e')));
    type_text(&mut sim, "!");
    sim.inject_event(ctrl('s'));

    assert!(!sim.model().session().is_editing());
    assert!(sim.model().session().display_text().ends_with('!'));
    assert_eq!(sim.model().status(), "SAVED");

    sim.inject_event(press(KeyCode::Right));
    sim.inject_event(press(KeyCode::Left));
    assert_eq!(sim.model().session().display_text(), default_for(0));
}

#[test]
fn saved_notes_show_on_startup() {
    let backend = Arc::new(MemoryStore::new());
    backend.set(&note_key("SUBJECT_001"), "from last time").unwrap();
    let mut sim = simulator_with(backend, SessionOptions::default());
    let frame = sim.capture_frame(WIDTH, HEIGHT);
    assert!(frame.row_text(3).contains("from last time"));
}
