//! Received-frame printer for the shell.

use core::fmt::Write;

use crate::can::Frame;

/// One line per frame: `timestamp: id length [> data | rtr]`.
pub fn format_received(frame: &Frame, out: &mut dyn Write) {
    if frame.extended {
        let _ = write!(out, "{:6}: {:08x} {}", frame.timestamp, frame.id, frame.length);
    } else {
        let _ = write!(out, "{:6}: {:8x} {}", frame.timestamp, frame.id, frame.length);
    }

    if frame.rtr {
        let _ = out.write_str(" rtr");
    } else if frame.length > 0 {
        let _ = out.write_str(" >");
        for b in frame.payload() {
            let _ = write!(out, " {:02X}", b);
        }
    }
    let _ = out.write_str("\n");
}
