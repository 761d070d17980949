#![forbid(unsafe_code)]

//! Key bindings and the clickable button bar.
//!
//! Both halves are pure: [`resolve_key`] maps a key press to an [`Action`]
//! given the current [`Mode`], and [`ButtonBar`] maps a click position to a
//! [`Button`]. Neither touches the session; the app applies the result.

use casefile_core::event::{KeyCode, KeyEvent};
use casefile_core::geometry::Rect;

use crate::session::Mode;

/// Lines scrolled by PageUp / PageDown while viewing.
pub const PAGE_SCROLL: isize = 10;

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move by this many subjects.
    Navigate(isize),
    /// Enter edit mode, or lock when editing.
    ToggleEdit,
    /// Save and leave edit mode.
    Save,
    /// Delete the note and restore the default text.
    Reset,
    /// Discard edits.
    Cancel,
    /// Exit the program.
    Quit,
    /// Scroll the read-only surface by this many lines.
    Scroll(isize),
    /// Change the edit buffer.
    Edit(EditOp),
}

/// A single change to the edit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Map a key event to an action.
///
/// Release events and unbound keys yield `None`.
#[must_use]
pub fn resolve_key(key: &KeyEvent, mode: Mode) -> Option<Action> {
    if !key.is_actionable() {
        return None;
    }
    if key.ctrl() && key.is_char_ignore_case('c') {
        return Some(Action::Quit);
    }
    match mode {
        Mode::Viewing => resolve_viewing(key),
        Mode::Editing => resolve_editing(key),
    }
}

fn resolve_viewing(key: &KeyEvent) -> Option<Action> {
    if key.ctrl() || key.alt() || key.super_key() {
        return None;
    }
    match key.code {
        KeyCode::Left => Some(Action::Navigate(-1)),
        KeyCode::Right => Some(Action::Navigate(1)),
        KeyCode::Up => Some(Action::Scroll(-1)),
        KeyCode::Down => Some(Action::Scroll(1)),
        KeyCode::PageUp => Some(Action::Scroll(-PAGE_SCROLL)),
        KeyCode::PageDown => Some(Action::Scroll(PAGE_SCROLL)),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&'e') => Some(Action::ToggleEdit),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&'q') => Some(Action::Quit),
        _ => None,
    }
}

fn resolve_editing(key: &KeyEvent) -> Option<Action> {
    if (key.ctrl() || key.super_key()) && key.is_char_ignore_case('s') {
        return Some(Action::Save);
    }
    if key.ctrl() && key.is_char_ignore_case('r') {
        return Some(Action::Reset);
    }
    let op = match key.code {
        KeyCode::Escape => return Some(Action::Cancel),
        KeyCode::Enter => EditOp::Newline,
        KeyCode::Backspace => EditOp::Backspace,
        KeyCode::Delete => EditOp::Delete,
        KeyCode::Left => EditOp::Left,
        KeyCode::Right => EditOp::Right,
        KeyCode::Up => EditOp::Up,
        KeyCode::Down => EditOp::Down,
        KeyCode::Home => EditOp::Home,
        KeyCode::End => EditOp::End,
        KeyCode::Tab => EditOp::Insert('\t'),
        KeyCode::Char(c) if !key.ctrl() && !key.alt() && !key.super_key() => EditOp::Insert(c),
        _ => return None,
    };
    Some(Action::Edit(op))
}

/// The five console buttons, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Prev,
    Next,
    Edit,
    Save,
    Reset,
}

impl Button {
    /// All buttons in display order.
    pub const ALL: [Button; 5] = [
        Button::Prev,
        Button::Next,
        Button::Edit,
        Button::Save,
        Button::Reset,
    ];

    /// Label as drawn. The edit button reads LOCK while editing.
    #[must_use]
    pub const fn label(self, mode: Mode) -> &'static str {
        match (self, mode) {
            (Button::Prev, _) => "[ PREV ]",
            (Button::Next, _) => "[ NEXT ]",
            (Button::Edit, Mode::Viewing) => "[ EDIT ]",
            (Button::Edit, Mode::Editing) => "[ LOCK ]",
            (Button::Save, _) => "[ SAVE ]",
            (Button::Reset, _) => "[ RESET ]",
        }
    }

    /// Whether clicks do anything in `mode`.
    #[must_use]
    pub const fn is_enabled(self, mode: Mode) -> bool {
        match self {
            Button::Prev | Button::Next => matches!(mode, Mode::Viewing),
            Button::Edit => true,
            Button::Save | Button::Reset => matches!(mode, Mode::Editing),
        }
    }

    /// Action a click triggers.
    #[must_use]
    pub const fn action(self) -> Action {
        match self {
            Button::Prev => Action::Navigate(-1),
            Button::Next => Action::Navigate(1),
            Button::Edit => Action::ToggleEdit,
            Button::Save => Action::Save,
            Button::Reset => Action::Reset,
        }
    }
}

/// Positions of the buttons on one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonBar {
    slots: Vec<(Button, Rect)>,
}

impl ButtonBar {
    /// Gap between adjacent buttons.
    pub const GAP: u16 = 2;

    /// Lay the buttons out left to right on the first row of `area`.
    ///
    /// Buttons that do not fit entirely are left out.
    #[must_use]
    pub fn layout(area: Rect) -> Self {
        let mut slots = Vec::with_capacity(Button::ALL.len());
        if area.is_empty() {
            return Self { slots };
        }
        let mut x = area.x;
        for button in Button::ALL {
            // EDIT and LOCK have the same width.
            let width = button.label(Mode::Viewing).len() as u16;
            if x.saturating_add(width) > area.right() {
                break;
            }
            slots.push((button, Rect::new(x, area.y, width, 1)));
            x = x.saturating_add(width + Self::GAP);
        }
        Self { slots }
    }

    /// Button under `(x, y)`, enabled or not.
    #[must_use]
    pub fn hit(&self, x: u16, y: u16) -> Option<Button> {
        self.slots
            .iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(button, _)| *button)
    }

    /// Action for a click at `(x, y)`, or `None` when it misses or lands
    /// on a disabled button.
    #[must_use]
    pub fn click(&self, x: u16, y: u16, mode: Mode) -> Option<Action> {
        self.hit(x, y)
            .filter(|button| button.is_enabled(mode))
            .map(Button::action)
    }

    /// Laid-out buttons with their areas.
    pub fn iter(&self) -> impl Iterator<Item = (Button, Rect)> + '_ {
        self.slots.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::event::{KeyEventKind, Modifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL)
    }

    #[test]
    fn arrows_navigate_only_while_viewing() {
        assert_eq!(
            resolve_key(&key(KeyCode::Left), Mode::Viewing),
            Some(Action::Navigate(-1))
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Right), Mode::Viewing),
            Some(Action::Navigate(1))
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Left), Mode::Editing),
            Some(Action::Edit(EditOp::Left))
        );
    }

    #[test]
    fn save_shortcut_only_while_editing() {
        assert_eq!(resolve_key(&ctrl('s'), Mode::Editing), Some(Action::Save));
        assert_eq!(resolve_key(&ctrl('S'), Mode::Editing), Some(Action::Save));
        let cmd_s = KeyEvent::new(KeyCode::Char('s')).with_modifiers(Modifiers::SUPER);
        assert_eq!(resolve_key(&cmd_s, Mode::Editing), Some(Action::Save));
        assert_eq!(resolve_key(&ctrl('s'), Mode::Viewing), None);
    }

    #[test]
    fn reset_and_cancel_only_while_editing() {
        assert_eq!(resolve_key(&ctrl('r'), Mode::Editing), Some(Action::Reset));
        assert_eq!(resolve_key(&ctrl('r'), Mode::Viewing), None);
        assert_eq!(
            resolve_key(&key(KeyCode::Escape), Mode::Editing),
            Some(Action::Cancel)
        );
        assert_eq!(resolve_key(&key(KeyCode::Escape), Mode::Viewing), None);
    }

    #[test]
    fn quit_bindings() {
        assert_eq!(
            resolve_key(&key(KeyCode::Char('q')), Mode::Viewing),
            Some(Action::Quit)
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Char('q')), Mode::Editing),
            Some(Action::Edit(EditOp::Insert('q')))
        );
        assert_eq!(resolve_key(&ctrl('c'), Mode::Editing), Some(Action::Quit));
        assert_eq!(resolve_key(&ctrl('c'), Mode::Viewing), Some(Action::Quit));
    }

    #[test]
    fn e_toggles_only_while_viewing() {
        assert_eq!(
            resolve_key(&key(KeyCode::Char('e')), Mode::Viewing),
            Some(Action::ToggleEdit)
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Char('e')), Mode::Editing),
            Some(Action::Edit(EditOp::Insert('e')))
        );
    }

    #[test]
    fn editing_keys_map_to_edit_ops() {
        let cases = [
            (KeyCode::Enter, EditOp::Newline),
            (KeyCode::Backspace, EditOp::Backspace),
            (KeyCode::Delete, EditOp::Delete),
            (KeyCode::Home, EditOp::Home),
            (KeyCode::End, EditOp::End),
            (KeyCode::Up, EditOp::Up),
            (KeyCode::Down, EditOp::Down),
            (KeyCode::Tab, EditOp::Insert('\t')),
        ];
        for (code, op) in cases {
            assert_eq!(resolve_key(&key(code), Mode::Editing), Some(Action::Edit(op)));
        }
        assert_eq!(resolve_key(&ctrl('x'), Mode::Editing), None);
    }

    #[test]
    fn viewing_scroll_keys() {
        assert_eq!(
            resolve_key(&key(KeyCode::PageDown), Mode::Viewing),
            Some(Action::Scroll(PAGE_SCROLL))
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Up), Mode::Viewing),
            Some(Action::Scroll(-1))
        );
    }

    #[test]
    fn releases_are_ignored() {
        let release = key(KeyCode::Right).with_kind(KeyEventKind::Release);
        assert_eq!(resolve_key(&release, Mode::Viewing), None);
        let repeat = key(KeyCode::Right).with_kind(KeyEventKind::Repeat);
        assert_eq!(resolve_key(&repeat, Mode::Viewing), Some(Action::Navigate(1)));
    }

    #[test]
    fn layout_places_buttons_left_to_right() {
        let bar = ButtonBar::layout(Rect::new(2, 10, 60, 1));
        let slots: Vec<_> = bar.iter().collect();
        assert_eq!(slots.len(), 5);
        assert_eq!(slots[0], (Button::Prev, Rect::new(2, 10, 8, 1)));
        assert_eq!(slots[1], (Button::Next, Rect::new(12, 10, 8, 1)));
        assert_eq!(slots[4].0, Button::Reset);
        assert_eq!(slots[4].1.width, 9);
    }

    #[test]
    fn narrow_area_drops_trailing_buttons() {
        let bar = ButtonBar::layout(Rect::new(0, 0, 20, 1));
        assert_eq!(bar.iter().count(), 2);
        assert!(ButtonBar::layout(Rect::new(0, 0, 0, 0)).iter().next().is_none());
    }

    #[test]
    fn hit_testing() {
        let bar = ButtonBar::layout(Rect::new(0, 5, 80, 1));
        assert_eq!(bar.hit(0, 5), Some(Button::Prev));
        assert_eq!(bar.hit(7, 5), Some(Button::Prev));
        assert_eq!(bar.hit(8, 5), None);
        assert_eq!(bar.hit(10, 5), Some(Button::Next));
        assert_eq!(bar.hit(0, 4), None);
    }

    #[test]
    fn clicks_on_disabled_buttons_do_nothing() {
        let bar = ButtonBar::layout(Rect::new(0, 0, 80, 1));
        let (_, save) = bar.iter().find(|(b, _)| *b == Button::Save).unwrap();
        let (_, prev) = bar.iter().find(|(b, _)| *b == Button::Prev).unwrap();

        assert_eq!(bar.click(save.x, save.y, Mode::Viewing), None);
        assert_eq!(bar.click(save.x, save.y, Mode::Editing), Some(Action::Save));
        assert_eq!(bar.click(prev.x, prev.y, Mode::Editing), None);
        assert_eq!(
            bar.click(prev.x, prev.y, Mode::Viewing),
            Some(Action::Navigate(-1))
        );
    }

    #[test]
    fn edit_button_label_follows_mode() {
        assert_eq!(Button::Edit.label(Mode::Viewing), "[ EDIT ]");
        assert_eq!(Button::Edit.label(Mode::Editing), "[ LOCK ]");
        assert!(Button::Edit.is_enabled(Mode::Editing));
    }
}
