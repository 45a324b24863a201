//! Lawicel session state and command execution.

use core::fmt::Write;

use super::codec::{decode_frame, encode_error_counters, LineBuf};
use super::LawicelError;
use crate::can::{Bitrate, CanBus, CanMode, ErrorCounters, Filter};
use crate::config::{version_bytes, BRIDGE_FILTERS};

/// Answer to one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Nothing is sent (empty line).
    None,
    /// `\r`
    Ack,
    /// BEL
    Error,
    /// Reply line, CR included.
    Reply(LineBuf),
}

impl Response {
    /// Bytes to put on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Response::None => b"",
            Response::Ack => b"\r",
            Response::Error => b"\x07",
            Response::Reply(line) => line.as_bytes(),
        }
    }
}

/// Per-connection protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LawicelSession {
    /// An `S` command succeeded; required before opening.
    pub bitrate_set: bool,
    /// Frames flow to the host.
    pub channel_open: bool,
    /// Append the receive timestamp to frames.
    pub use_timestamps: bool,
    /// Counters last reported with `E`.
    pub last_error: ErrorCounters,
}

impl LawicelSession {
    pub const fn new() -> Self {
        Self {
            bitrate_set: false,
            channel_open: false,
            use_timestamps: false,
            last_error: ErrorCounters { rx: 0, tx: 0 },
        }
    }

    /// Execute one line, errors folded into [`Response::Error`].
    pub fn execute(&mut self, line: &[u8], can: &mut dyn CanBus) -> Response {
        self.try_execute(line, can).unwrap_or(Response::Error)
    }

    /// Execute one line.
    pub fn try_execute(
        &mut self,
        line: &[u8],
        can: &mut dyn CanBus,
    ) -> Result<Response, LawicelError> {
        let Some(&verb) = line.first() else {
            return Ok(Response::None);
        };

        match verb {
            // Set bitrate: S0..S6, S8. S7 (800 kbps) is not available and
            // S8 takes the 1 Mbps slot.
            b'S' => {
                if self.channel_open {
                    return Err(LawicelError::ChannelOpen);
                }
                if line.len() != 2 {
                    return Err(LawicelError::Malformed);
                }
                let index = match line[1].wrapping_sub(b'0') {
                    d @ 0..=6 => d,
                    8 => 7,
                    _ => return Err(LawicelError::InvalidBitrate),
                };
                let bitrate = Bitrate::from_index(index).ok_or(LawicelError::InvalidBitrate)?;
                can.set_bitrate(bitrate);
                self.bitrate_set = true;
            }

            b't' | b'T' | b'r' | b'R' => {
                if !self.channel_open {
                    return Err(LawicelError::ChannelClosed);
                }
                let frame = decode_frame(line)?;
                if !can.send(&frame) {
                    return Err(LawicelError::SendFailed);
                }
            }

            // Acceptance code/mask and BTR registers
            b'M' | b'm' | b's' => return Err(LawicelError::Unsupported),

            b'O' => {
                self.check_can_open()?;
                can.set_mode(CanMode::Normal);
                // The bitrate change cleared all filters.
                for i in BRIDGE_FILTERS {
                    can.set_filter(i, &Filter::RECEIVE_ALL);
                }
                self.channel_open = true;
            }

            b'L' => {
                self.check_can_open()?;
                can.set_mode(CanMode::ListenOnly);
                self.channel_open = true;
            }

            b'C' => {
                if !self.channel_open {
                    return Err(LawicelError::ChannelClosed);
                }
                self.channel_open = false;
            }

            b'Z' => {
                if self.channel_open {
                    return Err(LawicelError::ChannelOpen);
                }
                if line.len() != 2 {
                    return Err(LawicelError::Malformed);
                }
                self.use_timestamps = match line[1] {
                    b'0' => false,
                    b'1' => true,
                    _ => return Err(LawicelError::InvalidArgument),
                };
                can.reset_timestamp();
            }

            // Status flags
            b'F' => return Ok(reply(format_args!("F{:02X}\r", 0))),

            // Serial number
            b'N' => return Ok(reply(format_args!("N{:02X}{:02X}\r", 0, 0))),

            b'V' => {
                let (hw, sw) = version_bytes();
                return Ok(reply(format_args!("V{:02X}{:02X}\r", hw, sw)));
            }

            _ => return Err(LawicelError::UnknownCommand),
        }

        Ok(Response::Ack)
    }

    fn check_can_open(&self) -> Result<(), LawicelError> {
        if self.channel_open {
            Err(LawicelError::ChannelOpen)
        } else if !self.bitrate_set {
            Err(LawicelError::BitrateNotSet)
        } else {
            Ok(())
        }
    }

    /// `E` line if the counters changed since the last report.
    pub fn error_report(&mut self, counters: ErrorCounters) -> Option<LineBuf> {
        if counters == self.last_error {
            return None;
        }
        self.last_error = counters;
        Some(encode_error_counters(counters))
    }
}

impl Default for LawicelSession {
    fn default() -> Self {
        Self::new()
    }
}

fn reply(args: core::fmt::Arguments<'_>) -> Response {
    let mut line = LineBuf::new();
    let _ = line.write_fmt(args);
    Response::Reply(line)
}
