//! Raw byte transport to the host.
//!
//! No framing, no blocking: "no byte available" is a normal poll result.

use core::fmt;

/// Byte source/sink (USB FIFO, UART, ...).
pub trait ByteTransport {
    /// True if `read_byte` has data to return.
    fn has_byte(&mut self) -> bool;

    /// Read one byte. Only meaningful after `has_byte` returned true.
    fn read_byte(&mut self) -> u8;

    fn write_byte(&mut self, byte: u8);

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }
}

/// Text output on a transport.
///
/// Every `\n` goes out as `\r\n`, which is what the serial terminal
/// expects. Protocol output that must stay byte-exact (Lawicel) writes to
/// the transport directly instead.
pub struct Terminal<'a> {
    io: &'a mut dyn ByteTransport,
}

impl<'a> Terminal<'a> {
    pub fn new(io: &'a mut dyn ByteTransport) -> Self {
        Self { io }
    }

    /// Write a byte without newline translation.
    pub fn raw(&mut self, byte: u8) {
        self.io.write_byte(byte);
    }
}

impl fmt::Write for Terminal<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &b in s.as_bytes() {
            if b == b'\n' {
                self.io.write_byte(b'\r');
            }
            self.io.write_byte(b);
        }
        Ok(())
    }
}
