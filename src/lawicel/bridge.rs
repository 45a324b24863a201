//! Bridge poll step.

use super::codec::encode_frame;
use super::session::{LawicelSession, Response};
use crate::can::CanBus;
use crate::transport::ByteTransport;
use crate::{log_debug, log_info};

/// Input line capacity. A line reaching it is dropped.
pub const LINE_CAPACITY: usize = 40;

/// Collects bytes up to the CR.
pub struct LineAccumulator {
    buf: [u8; LINE_CAPACITY],
    len: usize,
}

impl LineAccumulator {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            len: 0,
        }
    }

    /// Add one byte. Returns the line (without CR) once it is complete.
    ///
    /// Overlong input resets the buffer without notice; the tail then
    /// arrives as a short garbage line that the verb table rejects.
    pub fn feed(&mut self, byte: u8) -> Option<&[u8]> {
        if byte == b'\r' {
            let len = self.len;
            self.len = 0;
            return Some(&self.buf[..len]);
        }

        self.buf[self.len] = byte;
        self.len += 1;
        if self.len >= LINE_CAPACITY {
            self.len = 0;
        }
        None
    }

    /// Bytes collected so far.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for LineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lawicel bridge: session plus input line.
pub struct Bridge {
    session: LawicelSession,
    input: LineAccumulator,
}

impl Bridge {
    pub const fn new() -> Self {
        Self {
            session: LawicelSession::new(),
            input: LineAccumulator::new(),
        }
    }

    /// Back to a closed channel with no bitrate and no pending input.
    pub fn reset(&mut self) {
        self.session = LawicelSession::new();
        self.input.clear();
    }

    pub fn session(&self) -> &LawicelSession {
        &self.session
    }

    /// Run one step: one received frame, one input byte, one error
    /// counter check.
    pub fn poll(&mut self, now_us: i64, io: &mut dyn ByteTransport, can: &mut dyn CanBus) {
        // Always drain the receive queue, even with the channel closed.
        if let Some(frame) = can.poll_received() {
            if self.session.channel_open {
                io.write_bytes(encode_frame(&frame, self.session.use_timestamps).as_bytes());
            }
        }

        if io.has_byte() {
            let byte = io.read_byte();
            if let Some(line) = self.input.feed(byte) {
                let response = match self.session.try_execute(line, can) {
                    Ok(response) => {
                        log_command(now_us, line, &self.session);
                        response
                    }
                    Err(err) => {
                        log_debug!(now_us, "lawicel {:?} rejected: {}", line.first().map(|&c| c as char), err);
                        Response::Error
                    }
                };
                io.write_bytes(response.as_bytes());
            }
        }

        let counters = can.read_error_counters();
        if let Some(line) = self.session.error_report(counters) {
            io.write_bytes(line.as_bytes());
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

fn log_command(now_us: i64, line: &[u8], session: &LawicelSession) {
    match line.first() {
        Some(b'S') => log_info!(now_us, "lawicel bitrate S{}", line[1] as char),
        Some(b'O') => log_info!(now_us, "lawicel channel open"),
        Some(b'L') => log_info!(now_us, "lawicel channel open (listen only)"),
        Some(b'C') => log_info!(now_us, "lawicel channel closed"),
        Some(b'Z') => log_info!(now_us, "lawicel timestamps {}", session.use_timestamps),
        _ => {}
    }
}
