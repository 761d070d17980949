#![forbid(unsafe_code)]

//! Editing buffer behind the console surface.
//!
//! [`SurfaceEditor`] stores the text as lines plus a `(line, byte)` cursor
//! that always sits on a grapheme boundary. Horizontal movement steps one
//! grapheme cluster; vertical movement keeps the display column the cursor
//! had when vertical movement started.
//!
//! ```
//! use casefile_console::editor::SurfaceEditor;
//!
//! let mut ed = SurfaceEditor::new();
//! ed.insert_text("hello");
//! ed.insert_newline();
//! ed.insert_text("world");
//! ed.move_up();
//! ed.delete_backward();
//! assert_eq!(ed.text(), "hell\nworld");
//! ```

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Line-oriented text buffer with a grapheme-aware cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEditor {
    lines: Vec<String>,
    line: usize,
    byte: usize,
    /// Display column remembered across consecutive vertical moves.
    goal_column: Option<usize>,
}

impl Default for SurfaceEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceEditor {
    /// Empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            line: 0,
            byte: 0,
            goal_column: None,
        }
    }

    /// Buffer holding `text`, cursor at the end.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut ed = Self::new();
        ed.set_text(text);
        ed
    }

    /// Replace the whole buffer and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        let normalized = normalize_newlines(text);
        self.lines = normalized.split('\n').map(str::to_string).collect();
        self.move_to_document_end();
    }

    /// Full buffer contents, lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of lines (at least 1).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `index`.
    #[must_use]
    pub fn line_text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Cursor as `(line, display column)`.
    #[must_use]
    pub fn cursor_position(&self) -> (usize, usize) {
        (self.line, self.current_column())
    }

    /// Insert one character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        if ch.is_control() && ch != '\t' {
            return;
        }
        let mut buf = [0u8; 4];
        self.insert_segment(ch.encode_utf8(&mut buf));
    }

    /// Insert arbitrary text, which may span lines.
    pub fn insert_text(&mut self, text: &str) {
        let normalized = normalize_newlines(text);
        for (i, segment) in normalized.split('\n').enumerate() {
            if i > 0 {
                self.insert_newline();
            }
            let clean: String = segment
                .chars()
                .filter(|c| !c.is_control() || *c == '\t')
                .collect();
            self.insert_segment(&clean);
        }
    }

    /// Split the current line at the cursor.
    pub fn insert_newline(&mut self) {
        let tail = self.lines[self.line].split_off(self.byte);
        self.line += 1;
        self.lines.insert(self.line, tail);
        self.byte = 0;
        self.goal_column = None;
    }

    /// Delete the grapheme before the cursor, joining lines at column 0.
    /// Returns `false` at the start of the buffer.
    pub fn delete_backward(&mut self) -> bool {
        self.goal_column = None;
        if self.byte > 0 {
            let start = self.prev_boundary();
            self.lines[self.line].replace_range(start..self.byte, "");
            self.byte = start;
            return true;
        }
        if self.line == 0 {
            return false;
        }
        let current = self.lines.remove(self.line);
        self.line -= 1;
        self.byte = self.lines[self.line].len();
        self.lines[self.line].push_str(&current);
        true
    }

    /// Delete the grapheme after the cursor, joining lines at line end.
    /// Returns `false` at the end of the buffer.
    pub fn delete_forward(&mut self) -> bool {
        self.goal_column = None;
        let len = self.lines[self.line].len();
        if self.byte < len {
            let end = self.next_boundary();
            self.lines[self.line].replace_range(self.byte..end, "");
            return true;
        }
        if self.line + 1 >= self.lines.len() {
            return false;
        }
        let next = self.lines.remove(self.line + 1);
        self.lines[self.line].push_str(&next);
        true
    }

    /// One grapheme left, wrapping to the end of the previous line.
    pub fn move_left(&mut self) {
        self.goal_column = None;
        if self.byte > 0 {
            self.byte = self.prev_boundary();
        } else if self.line > 0 {
            self.line -= 1;
            self.byte = self.lines[self.line].len();
        }
    }

    /// One grapheme right, wrapping to the start of the next line.
    pub fn move_right(&mut self) {
        self.goal_column = None;
        if self.byte < self.lines[self.line].len() {
            self.byte = self.next_boundary();
        } else if self.line + 1 < self.lines.len() {
            self.line += 1;
            self.byte = 0;
        }
    }

    /// One line up, keeping the display column where possible.
    pub fn move_up(&mut self) {
        if self.line == 0 {
            self.move_to_line_start();
            return;
        }
        let goal = self.goal_column.unwrap_or_else(|| self.current_column());
        self.line -= 1;
        self.byte = byte_at_column(&self.lines[self.line], goal);
        self.goal_column = Some(goal);
    }

    /// One line down, keeping the display column where possible.
    pub fn move_down(&mut self) {
        if self.line + 1 >= self.lines.len() {
            self.move_to_line_end();
            return;
        }
        let goal = self.goal_column.unwrap_or_else(|| self.current_column());
        self.line += 1;
        self.byte = byte_at_column(&self.lines[self.line], goal);
        self.goal_column = Some(goal);
    }

    /// Start of the current line.
    pub fn move_to_line_start(&mut self) {
        self.goal_column = None;
        self.byte = 0;
    }

    /// End of the current line.
    pub fn move_to_line_end(&mut self) {
        self.goal_column = None;
        self.byte = self.lines[self.line].len();
    }

    /// End of the buffer.
    pub fn move_to_document_end(&mut self) {
        self.goal_column = None;
        self.line = self.lines.len() - 1;
        self.byte = self.lines[self.line].len();
    }

    fn insert_segment(&mut self, segment: &str) {
        if segment.is_empty() {
            return;
        }
        self.goal_column = None;
        self.lines[self.line].insert_str(self.byte, segment);
        self.byte += segment.len();
        // A combining mark can merge with the preceding cluster; keep the
        // cursor on a boundary.
        self.byte = snap_to_boundary(&self.lines[self.line], self.byte);
    }

    fn current_column(&self) -> usize {
        self.lines[self.line][..self.byte].width()
    }

    fn prev_boundary(&self) -> usize {
        let line = &self.lines[self.line];
        line[..self.byte]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        let line = &self.lines[self.line];
        line[self.byte..]
            .graphemes(true)
            .next()
            .map_or(line.len(), |g| self.byte + g.len())
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Largest grapheme boundary whose prefix is no wider than `column`.
fn byte_at_column(line: &str, column: usize) -> usize {
    let mut width = 0;
    for (i, g) in line.grapheme_indices(true) {
        let w = g.width();
        if width + w > column {
            return i;
        }
        width += w;
    }
    line.len()
}

/// Smallest grapheme boundary at or after `byte`.
fn snap_to_boundary(line: &str, byte: usize) -> usize {
    line.grapheme_indices(true)
        .map(|(i, _)| i)
        .find(|&i| i >= byte)
        .unwrap_or(line.len())
}
