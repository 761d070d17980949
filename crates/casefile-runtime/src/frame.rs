#![forbid(unsafe_code)]

//! Frame = Buffer + cursor for a render pass.
//!
//! `Model::view()` draws into a [`Frame`]. The [`Buffer`] is a plain grid of
//! [`Cell`]s; wide characters occupy their leading cell plus one
//! continuation cell so that columns stay aligned with the terminal.
//!
//! ```
//! use casefile_runtime::frame::{Frame, StyleFlags};
//!
//! let mut frame = Frame::new(20, 2);
//! frame.print(0, 0, "READY", StyleFlags::BOLD);
//! assert_eq!(frame.buffer.row_text(0), "READY");
//! ```

use bitflags::bitflags;
use casefile_core::geometry::Rect;
use unicode_width::UnicodeWidthChar;

bitflags! {
    /// Text attributes carried per cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0001;
        const DIM       = 0b0010;
        const UNDERLINE = 0b0100;
        const REVERSE   = 0b1000;
    }
}

/// Marker stored in the trailing cell of a wide character.
const CONTINUATION: char = '\0';

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character in the cell (`'\0'` for a wide-char continuation).
    pub ch: char,
    /// Attributes applied to the cell.
    pub flags: StyleFlags,
}

impl Cell {
    /// A blank, unstyled cell.
    pub const EMPTY: Cell = Cell {
        ch: ' ',
        flags: StyleFlags::empty(),
    };

    /// Create an unstyled cell.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        Self {
            ch,
            flags: StyleFlags::empty(),
        }
    }

    /// Set the cell attributes.
    #[must_use]
    pub const fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether this cell is the trailing half of a wide character.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A 2D grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a blank buffer. Zero dimensions are clamped to 1.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Get a cell, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Set a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Cells of a single row.
    #[must_use]
    pub fn row_cells(&self, y: u16) -> &[Cell] {
        match self.index(0, y) {
            Some(start) => &self.cells[start..start + usize::from(self.width)],
            None => &[],
        }
    }

    /// Text of a row with trailing blanks removed.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let text: String = self
            .row_cells(y)
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect();
        text.trim_end().to_string()
    }

    /// All rows joined with `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render target handed to `Model::view()`.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The cell grid being drawn.
    pub buffer: Buffer,
    cursor: Option<(u16, u16)>,
}

impl Frame {
    /// Create a blank frame.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            cursor: None,
        }
    }

    /// Frame width.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.buffer.width()
    }

    /// Frame height.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// The full frame area.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.buffer.width(), self.buffer.height())
    }

    /// Place (or hide, with `None`) the terminal cursor.
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor = position;
    }

    /// Requested cursor position, if visible.
    #[must_use]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Draw `text` starting at `(x, y)`, clipped to the frame width.
    ///
    /// Returns the column after the last drawn character.
    pub fn print(&mut self, x: u16, y: u16, text: &str, flags: StyleFlags) -> u16 {
        let max_x = self.width();
        self.print_clipped(x, y, text, flags, max_x)
    }

    /// Draw `text` inside `area` on the given row offset, clipped to the area.
    pub fn print_in(&mut self, area: Rect, row: u16, text: &str, flags: StyleFlags) -> u16 {
        if row >= area.height || area.is_empty() {
            return area.x;
        }
        self.print_clipped(area.x, area.y + row, text, flags, area.right())
    }

    fn print_clipped(&mut self, x: u16, y: u16, text: &str, flags: StyleFlags, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width());
        let mut col = x;
        for ch in text.chars() {
            let ch = if ch == '\t' { ' ' } else { ch };
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > max_x {
                break;
            }
            self.buffer.set(col, y, Cell::from_char(ch).with_flags(flags));
            if w == 2 {
                self.buffer
                    .set(col + 1, y, Cell::from_char(CONTINUATION).with_flags(flags));
            }
            col += w;
        }
        col
    }

    /// Draw a single-line box border around `area` with an optional title.
    pub fn draw_border(&mut self, area: Rect, title: Option<&str>, flags: StyleFlags) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;
        for x in area.x + 1..right {
            self.buffer.set(x, area.y, Cell::from_char('─').with_flags(flags));
            self.buffer.set(x, bottom, Cell::from_char('─').with_flags(flags));
        }
        for y in area.y + 1..bottom {
            self.buffer.set(area.x, y, Cell::from_char('│').with_flags(flags));
            self.buffer.set(right, y, Cell::from_char('│').with_flags(flags));
        }
        self.buffer.set(area.x, area.y, Cell::from_char('┌').with_flags(flags));
        self.buffer.set(right, area.y, Cell::from_char('┐').with_flags(flags));
        self.buffer.set(area.x, bottom, Cell::from_char('└').with_flags(flags));
        self.buffer.set(right, bottom, Cell::from_char('┘').with_flags(flags));
        if let Some(title) = title {
            let title_area = Rect::new(area.x + 2, area.y, area.width.saturating_sub(4), 1);
            self.print_in(title_area, 0, &format!(" {title} "), flags | StyleFlags::BOLD);
        }
    }
}
