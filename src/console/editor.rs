//! Line editor: cursor movement, in-place edits and history recall.
//!
//! Consumes one byte at a time and answers with what the terminal has to
//! redraw. The redraw is abstract ([`Redraw`]) and rendered to VT100
//! escape sequences separately, so the editing logic stays testable on
//! the byte level without a terminal.

use core::fmt::Write;

use super::history::History;
use super::line_buffer::LineBuffer;
use crate::console::PROMPT;

const ESC: u8 = 0x1B;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const ENTER: u8 = b'\r';

/// Columns moved left before redrawing a recalled line.
const REDRAW_HOME_COLUMNS: usize = 50;

/// Escape sequence state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeState {
    Idle,
    /// Got ESC
    SawEscape,
    /// Got ESC [
    SawBracket,
}

/// Terminal update for one edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redraw<'a> {
    /// Print a character appended at the end of the line.
    Echo(u8),
    /// Erase the last character of the line.
    EraseLast,
    /// A character was inserted mid-line: redraw from the cursor
    /// (`tail` starts with the new character) and step past it.
    InsertTail(&'a [u8]),
    /// A character left of the cursor was deleted mid-line: step back
    /// and redraw `tail`.
    DeleteTail(&'a [u8]),
    CursorForward,
    CursorBack,
    /// Replace the whole line (prompt included) with a recalled entry.
    ReplaceLine(&'a [u8]),
}

impl Redraw<'_> {
    /// Emit the VT100 sequences for this update.
    pub fn render(&self, out: &mut dyn Write) {
        match *self {
            Redraw::Echo(c) => {
                let _ = out.write_char(c as char);
            }
            Redraw::EraseLast => {
                let _ = out.write_str("\x08 \x08");
            }
            Redraw::InsertTail(tail) => {
                let _ = out.write_str("\x1b[s\x1b[K");
                write_bytes(out, tail);
                let _ = out.write_str("\x1b[u\x1b[C");
            }
            Redraw::DeleteTail(tail) => {
                let _ = out.write_str("\x1b[D\x1b[s\x1b[K");
                write_bytes(out, tail);
                let _ = out.write_str("\x1b[u");
            }
            Redraw::CursorForward => {
                let _ = out.write_str("\x1b[C");
            }
            Redraw::CursorBack => {
                let _ = out.write_str("\x1b[D");
            }
            Redraw::ReplaceLine(line) => {
                let _ = write!(out, "\x1b[2K\x1b[{}D{}", REDRAW_HOME_COLUMNS, PROMPT);
                write_bytes(out, line);
            }
        }
    }
}

fn write_bytes(out: &mut dyn Write, bytes: &[u8]) {
    // Lines hold printable ASCII only.
    let _ = out.write_str(core::str::from_utf8(bytes).unwrap_or(""));
}

/// Result of feeding one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEvent<'a> {
    None,
    Redraw(Redraw<'a>),
    /// Enter pressed; the line is ready for dispatch.
    Complete,
}

/// Line editor state machine
pub struct LineEditor {
    history: History,
    /// Cursor offset into the active line, 0..=len
    pos: usize,
    escape_state: EscapeState,
    /// Next byte starts a new line
    fresh: bool,
}

impl LineEditor {
    /// Create new editor
    pub const fn new() -> Self {
        Self {
            history: History::new(),
            pos: 0,
            escape_state: EscapeState::Idle,
            fresh: true,
        }
    }

    /// Arm a new line. The history rotates on the next byte.
    pub fn restart(&mut self) {
        self.fresh = true;
    }

    /// Forget history and the current line.
    pub fn reset(&mut self) {
        self.history.reset();
        self.pos = 0;
        self.escape_state = EscapeState::Idle;
        self.fresh = true;
    }

    /// Current line (valid after `Complete` until the next line starts).
    pub fn line(&self) -> &LineBuffer {
        self.history.active_line()
    }

    pub fn cursor(&self) -> usize {
        self.pos
    }

    pub fn escape_state(&self) -> EscapeState {
        self.escape_state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Process a single input byte
    pub fn feed(&mut self, byte: u8) -> LineEvent<'_> {
        if self.fresh {
            self.fresh = false;
            self.history.begin_line();
            self.pos = 0;
            self.escape_state = EscapeState::Idle;
        }

        match self.escape_state {
            EscapeState::SawEscape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::SawBracket
                } else {
                    EscapeState::Idle
                };
                LineEvent::None
            }
            EscapeState::SawBracket => {
                self.escape_state = EscapeState::Idle;
                self.process_arrow(byte)
            }
            EscapeState::Idle => self.process_normal(byte),
        }
    }

    fn process_arrow(&mut self, byte: u8) -> LineEvent<'_> {
        match byte {
            // Up arrow
            b'A' => {
                if self.history.older() {
                    return self.recall();
                }
            }
            // Down arrow
            b'B' => {
                if self.history.newer() {
                    return self.recall();
                }
            }
            // Right arrow
            b'C' => {
                if self.pos < self.history.active_line().len() {
                    self.pos += 1;
                    return LineEvent::Redraw(Redraw::CursorForward);
                }
            }
            // Left arrow
            b'D' => {
                if self.pos > 0 {
                    self.pos -= 1;
                    return LineEvent::Redraw(Redraw::CursorBack);
                }
            }
            _ => {}
        }
        LineEvent::None
    }

    fn recall(&mut self) -> LineEvent<'_> {
        let line = self.history.active_line();
        self.pos = line.len();
        LineEvent::Redraw(Redraw::ReplaceLine(line.as_bytes()))
    }

    fn process_normal(&mut self, byte: u8) -> LineEvent<'_> {
        match byte {
            DELETE | BACKSPACE => {
                if self.pos == 0 {
                    return LineEvent::None;
                }
                self.pos -= 1;
                let line = self.history.active_line_mut();
                line.remove(self.pos);
                if self.pos == line.len() {
                    LineEvent::Redraw(Redraw::EraseLast)
                } else {
                    LineEvent::Redraw(Redraw::DeleteTail(line.tail(self.pos)))
                }
            }

            ESC => {
                self.escape_state = EscapeState::SawEscape;
                LineEvent::None
            }

            ENTER => LineEvent::Complete,

            0x20..=0x7E => {
                let pos = self.pos;
                let line = self.history.active_line_mut();
                let at_end = pos == line.len();
                if !line.insert(pos, byte) {
                    return LineEvent::None;
                }
                self.pos += 1;
                if at_end {
                    LineEvent::Redraw(Redraw::Echo(byte))
                } else {
                    LineEvent::Redraw(Redraw::InsertTail(line.tail(pos)))
                }
            }

            _ => LineEvent::None,
        }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
