//! Line buffer for console input

use super::history::LINE_SIZE;

/// One command line: bounded buffer, NUL terminated at `len`.
///
/// At most `LINE_SIZE - 1` characters are stored so the terminator
/// always fits.
#[derive(Clone, Copy)]
pub struct LineBuffer {
    buf: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    /// Maximum number of characters.
    pub const MAX_LEN: usize = LINE_SIZE - 1;

    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
        }
    }

    /// Insert a character at `pos`, shifting the tail right.
    ///
    /// Returns `false` (buffer untouched) if the line is full or `pos`
    /// is past the end.
    pub fn insert(&mut self, pos: usize, c: u8) -> bool {
        if self.len >= Self::MAX_LEN || pos > self.len {
            return false;
        }
        self.buf.copy_within(pos..self.len, pos + 1);
        self.buf[pos] = c;
        self.len += 1;
        self.buf[self.len] = 0;
        true
    }

    /// Append a character at the end.
    pub fn push(&mut self, c: u8) -> bool {
        self.insert(self.len, c)
    }

    /// Remove the character at `pos`, shifting the tail left.
    pub fn remove(&mut self, pos: usize) -> bool {
        if pos >= self.len {
            return false;
        }
        self.buf.copy_within(pos + 1..self.len, pos);
        self.len -= 1;
        self.buf[self.len] = 0;
        true
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.len = 0;
        self.buf[0] = 0;
    }

    /// Set buffer contents from string, truncated to `MAX_LEN`
    pub fn set(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let copy_len = bytes.len().min(Self::MAX_LEN);
        self.buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.len = copy_len;
        self.buf[self.len] = 0;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Characters from `pos` to the end of the line.
    pub fn tail(&self, pos: usize) -> &[u8] {
        &self.buf[pos.min(self.len)..self.len]
    }

    /// Byte at `pos`, `0` at or beyond the terminator.
    pub fn byte_at(&self, pos: usize) -> u8 {
        if pos < self.len {
            self.buf[pos]
        } else {
            0
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
