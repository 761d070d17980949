#![forbid(unsafe_code)]

//! The console as a runtime [`Model`].
//!
//! [`CaseFileApp`] owns the [`ConsoleSession`] and the [`SurfaceEditor`]
//! and keeps them in step: while editing, every buffer change is pushed into
//! the session, and after every transition the editor is reloaded from the
//! session's text.
//!
//! Screen layout, top to bottom:
//!
//! ```text
//!  CASEFILE :: SUBJECT_001  01/02  CASE :: CF-0001  PKT :: 0x3F2A  12:04:55
//!  PORTRAIT :: img/rami.jpeg  ECHO :: OFF  MODE :: VIEW  READY
//! ┌ CONSOLE ─────────────────────────────────────────────────────────────┐
//! │> INIT CASEFILE_DB :: OK                                              │
//! │...                                                                   │
//! └──────────────────────────────────────────────────────────────────────┘
//!  [ PREV ]  [ NEXT ]  [ EDIT ]  [ SAVE ]  [ RESET ]
//! ```

use std::time::{Duration, Instant};

use casefile_core::event::{Event, MouseEvent, MouseEventKind};
use casefile_core::geometry::Rect;
use casefile_runtime::frame::{Frame, StyleFlags};
use casefile_runtime::{Cmd, Model};
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::clock::Clock;
use crate::editor::SurfaceEditor;
use crate::input::{Action, Button, ButtonBar, EditOp, resolve_key};
use crate::render::{Lcg, PacketId, subject_counter};
use crate::session::{ConsoleSession, Mode, RejectReason, Transition};

/// How often the header clock refreshes.
pub const CLOCK_TICK: Duration = Duration::from_millis(250);

/// Size assumed until the runtime reports the real one.
pub const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Messages understood by [`CaseFileApp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMsg {
    /// A raw terminal event.
    Input(Event),
    /// An already-resolved action, bypassing key bindings.
    Action(Action),
    /// Periodic clock tick.
    Tick,
    /// Terminal resize.
    Resize {
        /// New terminal width.
        width: u16,
        /// New terminal height.
        height: u16,
    },
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Tick => Self::Tick,
            other => Self::Input(other),
        }
    }
}

/// Screen regions for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Subject, counter, case, packet, clock.
    pub header: Rect,
    /// Portrait, echo, mode, status.
    pub info: Rect,
    /// Bordered console panel.
    pub panel: Rect,
    /// Button row.
    pub buttons: Rect,
}

impl ScreenLayout {
    /// Split a `width` x `height` screen.
    #[must_use]
    pub fn compute(width: u16, height: u16) -> Self {
        let header = Rect::new(1, 0, width.saturating_sub(1), height.min(1));
        let info = Rect::new(1, 1, width.saturating_sub(1), height.saturating_sub(1).min(1));
        let panel = Rect::new(0, 2, width, height.saturating_sub(3));
        let buttons = Rect::new(
            1,
            height.saturating_sub(1),
            width.saturating_sub(1),
            u16::from(height >= 4),
        );
        Self {
            header,
            info,
            panel,
            buttons,
        }
    }

    /// Text area inside the panel border.
    #[must_use]
    pub fn panel_inner(&self) -> Rect {
        self.panel.inner(1)
    }
}

/// The case-file console application.
pub struct CaseFileApp {
    session: ConsoleSession,
    editor: SurfaceEditor,
    clock: Clock,
    clock_text: String,
    rng: Lcg,
    packet: PacketId,
    size: (u16, u16),
    /// First visible line of the surface.
    scroll: usize,
    /// First visible display column while editing.
    hscroll: usize,
    status: &'static str,
    exit_after: Option<Duration>,
    started: Instant,
}

impl CaseFileApp {
    /// Wrap a session. The clock shows UTC until [`with_clock`](Self::with_clock).
    pub fn new(session: ConsoleSession) -> Self {
        let mut rng = Lcg::from_clock();
        let packet = PacketId::roll(&mut rng);
        let clock = Clock::default();
        let editor = SurfaceEditor::with_text(session.display_text());
        Self {
            session,
            editor,
            clock,
            clock_text: clock.now(),
            rng,
            packet,
            size: DEFAULT_SIZE,
            scroll: 0,
            hscroll: 0,
            status: "READY",
            exit_after: None,
            started: Instant::now(),
        }
    }

    /// Use `clock` for the header.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.clock_text = clock.now();
        self
    }

    /// Seed packet ids deterministically.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Lcg::new(seed);
        self.packet = PacketId::roll(&mut self.rng);
        self
    }

    /// Quit on the first tick after `after` has elapsed.
    #[must_use]
    pub fn with_exit_after(mut self, after: Option<Duration>) -> Self {
        self.exit_after = after;
        self
    }

    /// The console session.
    #[must_use]
    pub const fn session(&self) -> &ConsoleSession {
        &self.session
    }

    /// The edit buffer.
    #[must_use]
    pub const fn editor(&self) -> &SurfaceEditor {
        &self.editor
    }

    /// Packet id currently shown.
    #[must_use]
    pub const fn packet(&self) -> PacketId {
        self.packet
    }

    /// First visible surface line.
    #[must_use]
    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    /// Status word shown on the info row.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        self.status
    }

    fn layout(&self) -> ScreenLayout {
        ScreenLayout::compute(self.size.0, self.size.1)
    }

    fn handle_input(&mut self, event: Event) -> Cmd<AppMsg> {
        match event {
            Event::Key(key) => match resolve_key(&key, self.session.mode()) {
                Some(action) => self.apply(action),
                None => Cmd::none(),
            },
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(paste) => {
                if self.session.is_editing() {
                    self.editor.insert_text(&paste.text);
                    self.push_edit();
                }
                Cmd::none()
            }
            Event::Focus(_) | Event::Resize { .. } | Event::Tick => Cmd::none(),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Cmd<AppMsg> {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.apply(Action::Scroll(-3)),
            MouseEventKind::ScrollDown => self.apply(Action::Scroll(3)),
            _ if mouse.is_left_click() => {
                let bar = ButtonBar::layout(self.layout().buttons);
                match bar.click(mouse.x, mouse.y, self.session.mode()) {
                    Some(action) => self.apply(action),
                    None => Cmd::none(),
                }
            }
            _ => Cmd::none(),
        }
    }

    fn apply(&mut self, action: Action) -> Cmd<AppMsg> {
        let transition = match action {
            Action::Quit => {
                info!(subject = %self.session.current_subject().subject_id, "quit requested");
                return Cmd::quit();
            }
            Action::Scroll(delta) => {
                if !self.session.is_editing() {
                    self.scroll_by(delta);
                }
                return Cmd::none();
            }
            Action::Edit(op) => {
                if self.session.is_editing() {
                    self.apply_edit(op);
                }
                return Cmd::none();
            }
            Action::Navigate(delta) => self.session.navigate(delta),
            Action::ToggleEdit => self.session.toggle_edit(),
            Action::Save => self.session.save(),
            Action::Reset => self.session.reset(),
            Action::Cancel => self.session.cancel_edit(),
        };
        self.after_transition(transition);
        Cmd::none()
    }

    fn after_transition(&mut self, transition: Transition) {
        self.status = match transition {
            Transition::Navigated { .. } => {
                self.packet = PacketId::roll(&mut self.rng);
                self.scroll = 0;
                "READY"
            }
            Transition::EnteredEdit => "EDITING",
            Transition::Saved { .. } => "SAVED",
            Transition::Locked => "LOCKED",
            Transition::Reset { .. } => "RESTORED",
            Transition::Cancelled => "REVERTED",
            Transition::Rejected(reason) => {
                if reason == RejectReason::NavigationLocked {
                    self.status = "NAV LOCKED";
                }
                return;
            }
        };
        self.editor.set_text(self.session.display_text());
        self.hscroll = 0;
        if self.session.is_editing() {
            self.follow_cursor();
        } else {
            self.scroll_by(0);
        }
    }

    fn apply_edit(&mut self, op: EditOp) {
        let changed = match op {
            EditOp::Insert(ch) => {
                self.editor.insert_char(ch);
                true
            }
            EditOp::Newline => {
                self.editor.insert_newline();
                true
            }
            EditOp::Backspace => self.editor.delete_backward(),
            EditOp::Delete => self.editor.delete_forward(),
            EditOp::Left => {
                self.editor.move_left();
                false
            }
            EditOp::Right => {
                self.editor.move_right();
                false
            }
            EditOp::Up => {
                self.editor.move_up();
                false
            }
            EditOp::Down => {
                self.editor.move_down();
                false
            }
            EditOp::Home => {
                self.editor.move_to_line_start();
                false
            }
            EditOp::End => {
                self.editor.move_to_line_end();
                false
            }
        };
        if changed {
            self.push_edit();
        } else {
            self.follow_cursor();
        }
    }

    fn push_edit(&mut self) {
        self.session.set_display_text(self.editor.text());
        self.follow_cursor();
    }

    fn visible_rows(&self) -> usize {
        usize::from(self.layout().panel_inner().height).max(1)
    }

    fn visible_cols(&self) -> usize {
        usize::from(self.layout().panel_inner().width).max(1)
    }

    fn scroll_by(&mut self, delta: isize) {
        let lines = self.session.display_text().split('\n').count();
        let max = lines.saturating_sub(self.visible_rows());
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    fn follow_cursor(&mut self) {
        let (line, col) = self.editor.cursor_position();
        let rows = self.visible_rows();
        let cols = self.visible_cols();
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + rows {
            self.scroll = line + 1 - rows;
        }
        if col < self.hscroll {
            self.hscroll = col;
        } else if col >= self.hscroll + cols {
            self.hscroll = col + 1 - cols;
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let subject = self.session.current_subject();
        let counter = subject_counter(self.session.current_index(), self.session.catalog().len());
        let dim = StyleFlags::DIM;
        let mut x = area.x;
        x = frame.print(x, area.y, "CASEFILE :: ", dim);
        x = frame.print(x, area.y, &subject.subject_id, StyleFlags::BOLD);
        x = frame.print(x + 2, area.y, &counter, StyleFlags::empty());
        x = frame.print(x + 2, area.y, "CASE :: ", dim);
        x = frame.print(x, area.y, &subject.case_id, StyleFlags::empty());
        x = frame.print(x + 2, area.y, "PKT :: ", dim);
        x = frame.print(x, area.y, &self.packet.to_string(), StyleFlags::empty());
        frame.print(x + 2, area.y, &self.clock_text, StyleFlags::empty());
    }

    fn draw_info(&self, frame: &mut Frame, area: Rect) {
        if area.is_empty() {
            return;
        }
        let subject = self.session.current_subject();
        let editing = self.session.is_editing();
        let dim = StyleFlags::DIM;
        let mut x = area.x;
        x = frame.print(x, area.y, "PORTRAIT :: ", dim);
        x = frame.print(x, area.y, &subject.portrait, StyleFlags::empty());
        x = frame.print(x + 2, area.y, "ECHO :: ", dim);
        x = frame.print(x, area.y, if editing { "ON" } else { "OFF" }, StyleFlags::BOLD);
        x = frame.print(x + 2, area.y, "MODE :: ", dim);
        x = frame.print(x, area.y, self.session.mode().label(), StyleFlags::empty());
        frame.print(x + 2, area.y, self.status, StyleFlags::BOLD);
    }

    fn draw_panel(&self, frame: &mut Frame, layout: &ScreenLayout) {
        let editing = self.session.is_editing();
        let (title, border) = if editing {
            ("CONSOLE :: EDITING", StyleFlags::BOLD)
        } else {
            ("CONSOLE", StyleFlags::empty())
        };
        frame.draw_border(layout.panel, Some(title), border);

        let inner = layout.panel_inner();
        if inner.is_empty() {
            return;
        }
        let hscroll = if editing { self.hscroll } else { 0 };
        let text = self.session.display_text();
        for (row, line) in text
            .split('\n')
            .skip(self.scroll)
            .take(usize::from(inner.height))
            .enumerate()
        {
            frame.print_in(inner, row as u16, skip_columns(line, hscroll), StyleFlags::empty());
        }

        if editing {
            let (line, col) = self.editor.cursor_position();
            let row = line.saturating_sub(self.scroll);
            let col = col.saturating_sub(hscroll);
            if row < usize::from(inner.height) && col < usize::from(inner.width) {
                frame.set_cursor(Some((inner.x + col as u16, inner.y + row as u16)));
            }
        }
    }

    fn draw_buttons(&self, frame: &mut Frame, area: Rect) {
        let mode = self.session.mode();
        for (button, rect) in ButtonBar::layout(area).iter() {
            let mut flags = StyleFlags::empty();
            if !button.is_enabled(mode) {
                flags |= StyleFlags::DIM;
            }
            if button == Button::Edit && mode == Mode::Editing {
                flags |= StyleFlags::REVERSE;
            }
            frame.print(rect.x, rect.y, button.label(mode), flags);
        }
    }
}

impl Model for CaseFileApp {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        info!(
            subjects = self.session.catalog().len(),
            start = %self.session.current_subject().subject_id,
            store = self.session.notes().backend_name(),
            "console ready"
        );
        Cmd::tick(CLOCK_TICK)
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::Input(event) => self.handle_input(event),
            AppMsg::Action(action) => self.apply(action),
            AppMsg::Tick => {
                self.clock_text = self.clock.now();
                if let Some(limit) = self.exit_after
                    && self.started.elapsed() >= limit
                {
                    info!(?limit, "exit timer elapsed");
                    return Cmd::quit();
                }
                Cmd::none()
            }
            AppMsg::Resize { width, height } => {
                debug!(width, height, "console resized");
                self.size = (width.max(1), height.max(1));
                if self.session.is_editing() {
                    self.follow_cursor();
                } else {
                    self.scroll_by(0);
                }
                Cmd::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        let layout = ScreenLayout::compute(frame.width(), frame.height());
        self.draw_header(frame, layout.header);
        self.draw_info(frame, layout.info);
        self.draw_panel(frame, &layout);
        self.draw_buttons(frame, layout.buttons);
    }
}

/// `line` with its first `columns` display columns removed.
fn skip_columns(line: &str, columns: usize) -> &str {
    if columns == 0 {
        return line;
    }
    let mut width = 0;
    for (i, g) in line.grapheme_indices(true) {
        if width >= columns {
            return &line[i..];
        }
        width += g.width();
    }
    ""
}
