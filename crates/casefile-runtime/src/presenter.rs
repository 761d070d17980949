#![forbid(unsafe_code)]

//! Presenter: row-diffed ANSI emission.
//!
//! The presenter compares the next buffer with the previously presented one
//! and rewrites only the rows that changed. Output is buffered and flushed
//! once per frame.

use std::io::{self, BufWriter, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use crate::frame::{Buffer, Cell, StyleFlags};

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// Writes frames to a terminal.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    previous: Option<Buffer>,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter over a writer (usually stdout).
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
        }
    }

    /// Forget the last presented frame so the next present repaints fully.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Present `next`, then place or hide the cursor.
    pub fn present(&mut self, next: &Buffer, cursor: Option<(u16, u16)>) -> io::Result<()> {
        let full = match &self.previous {
            Some(prev) => prev.width() != next.width() || prev.height() != next.height(),
            None => true,
        };
        if full {
            queue!(self.writer, Clear(ClearType::All))?;
        }

        let mut rows_written = 0usize;
        for y in 0..next.height() {
            let changed = match &self.previous {
                Some(prev) if !full => prev.row_cells(y) != next.row_cells(y),
                _ => true,
            };
            if changed {
                self.write_row(y, next.row_cells(y))?;
                rows_written += 1;
            }
        }

        match cursor {
            Some((x, y)) => queue!(self.writer, MoveTo(x, y), Show)?,
            None => queue!(self.writer, Hide)?,
        }
        self.writer.flush()?;

        tracing::trace!(rows_written, full, "presented frame");
        self.previous = Some(next.clone());
        Ok(())
    }

    fn write_row(&mut self, y: u16, cells: &[Cell]) -> io::Result<()> {
        queue!(self.writer, MoveTo(0, y), SetAttribute(Attribute::Reset))?;
        let mut current = StyleFlags::empty();
        for cell in cells {
            if cell.is_continuation() {
                continue;
            }
            if cell.flags != current {
                apply_flags(&mut self.writer, cell.flags)?;
                current = cell.flags;
            }
            queue!(self.writer, Print(cell.ch))?;
        }
        queue!(self.writer, SetAttribute(Attribute::Reset))
    }

    /// Access the underlying writer (for tests).
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }
}

fn apply_flags(writer: &mut impl Write, flags: StyleFlags) -> io::Result<()> {
    queue!(writer, SetAttribute(Attribute::Reset))?;
    if flags.contains(StyleFlags::BOLD) {
        queue!(writer, SetAttribute(Attribute::Bold))?;
    }
    if flags.contains(StyleFlags::DIM) {
        queue!(writer, SetAttribute(Attribute::Dim))?;
    }
    if flags.contains(StyleFlags::UNDERLINE) {
        queue!(writer, SetAttribute(Attribute::Underlined))?;
    }
    if flags.contains(StyleFlags::REVERSE) {
        queue!(writer, SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}
