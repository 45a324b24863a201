//! Lawicel line encoding and decoding.
//!
//! Hex digits are decoded without validation: `a..` and `A..` map from
//! ten upwards, everything else is taken relative to `'0'`. Hosts only
//! ever send valid digits, and garbage in gives garbage out rather than
//! an error.

use core::fmt::{self, Write};

use super::LawicelError;
use crate::can::{ErrorCounters, Frame};

/// Longest encoded line: `T` + 8 id + dlc + 16 data + 4 timestamp + CR.
pub const LINE_BUF_SIZE: usize = 32;

/// Fixed-size output line.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LineBuf {
    buf: [u8; LINE_BUF_SIZE],
    len: usize,
}

impl LineBuf {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_BUF_SIZE],
            len: 0,
        }
    }

    /// Append a byte. Silently dropped when full.
    pub fn push(&mut self, byte: u8) {
        if self.len < LINE_BUF_SIZE {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for LineBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for LineBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &b in s.as_bytes() {
            self.push(b);
        }
        Ok(())
    }
}

impl fmt::Debug for LineBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineBuf({:?})", self.as_str())
    }
}

/// One hex digit, unvalidated.
#[inline]
pub fn nibble(c: u8) -> u8 {
    if c >= b'a' {
        c.wrapping_sub(b'a').wrapping_add(10)
    } else if c >= b'A' {
        c.wrapping_sub(b'A').wrapping_add(10)
    } else {
        c.wrapping_sub(b'0')
    }
}

/// Two hex digits starting at `at`. Caller checks the bounds.
#[inline]
fn byte_at(line: &[u8], at: usize) -> u8 {
    (nibble(line[at]) << 4) | nibble(line[at + 1])
}

/// Decode a `t`/`T`/`r`/`R` command line into a frame.
///
/// Standard ids are one nibble plus one byte (`nibble << 8 | byte`),
/// extended ids four bytes. The line length must match the length code
/// exactly.
pub fn decode_frame(line: &[u8]) -> Result<Frame, LawicelError> {
    let (extended, rtr) = match line.first() {
        Some(b't') => (false, false),
        Some(b'T') => (true, false),
        Some(b'r') => (false, true),
        Some(b'R') => (true, true),
        _ => return Err(LawicelError::UnknownCommand),
    };
    let dlc_pos = if extended { 9 } else { 4 };

    if line.len() < dlc_pos + 1 {
        return Err(LawicelError::Malformed);
    }

    let length = line[dlc_pos].wrapping_sub(b'0');
    if length > 8 {
        return Err(LawicelError::DlcTooLarge);
    }

    let expected = if rtr {
        dlc_pos + 1
    } else {
        length as usize * 2 + dlc_pos + 1
    };
    if line.len() != expected {
        return Err(LawicelError::Malformed);
    }

    let id = if extended {
        (byte_at(line, 1) as u32) << 24
            | (byte_at(line, 3) as u32) << 16
            | (byte_at(line, 5) as u32) << 8
            | byte_at(line, 7) as u32
    } else {
        (nibble(line[1]) as u32) << 8 | byte_at(line, 2) as u32
    };

    let frame = if rtr {
        Frame::new_remote(id, extended, length)
    } else {
        let mut data = [0u8; 8];
        for (i, d) in data.iter_mut().take(length as usize).enumerate() {
            *d = byte_at(line, dlc_pos + 1 + i * 2);
        }
        Frame::new_data(id, extended, &data[..length as usize])
    };

    frame.ok_or(LawicelError::DlcTooLarge)
}

/// Encode a received frame, CR included.
///
/// The id is lowercase hex, data bytes uppercase; the optional
/// timestamp is four lowercase digits.
pub fn encode_frame(frame: &Frame, timestamps: bool) -> LineBuf {
    let mut line = LineBuf::new();

    let verb = match (frame.extended, frame.rtr) {
        (false, false) => 't',
        (true, false) => 'T',
        (false, true) => 'r',
        (true, true) => 'R',
    };

    if frame.extended {
        let _ = write!(line, "{}{:08x}", verb, frame.id);
    } else {
        let _ = write!(line, "{}{:03x}", verb, frame.id as u16);
    }
    line.push(b'0' + frame.length.min(8));

    for b in frame.payload() {
        let _ = write!(line, "{:02X}", b);
    }

    if timestamps {
        let _ = write!(line, "{:04x}", frame.timestamp);
    }
    line.push(b'\r');
    line
}

/// `E<rx><tx>\r`, two lowercase hex digits each.
pub fn encode_error_counters(counters: ErrorCounters) -> LineBuf {
    let mut line = LineBuf::new();
    let _ = write!(line, "E{:02x}{:02x}\r", counters.rx, counters.tx);
    line
}
