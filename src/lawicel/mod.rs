//! Lawicel (SLCAN) ASCII bridge.
//!
//! Line oriented: the host sends CR terminated commands, the bridge
//! answers with CR (ok), BEL (error) or a reply line. Received frames
//! and error counter changes are pushed to the host unsolicited.
//!
//! - [`codec`]: frame and reply encoding, command-frame decoding
//! - [`session`]: channel state and the verb table
//! - [`bridge`]: input accumulation and the poll step

pub mod bridge;
pub mod codec;
pub mod session;

pub use bridge::{Bridge, LineAccumulator, LINE_CAPACITY};
pub use codec::{decode_frame, encode_error_counters, encode_frame, LineBuf};
pub use session::{LawicelSession, Response};

/// Why a command was answered with BEL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LawicelError {
    /// First character is not a known verb
    UnknownCommand,
    /// Verb recognised but not supported (`M`, `m`, `s`)
    Unsupported,
    /// Command not allowed while the channel is open
    ChannelOpen,
    /// Command needs an open channel
    ChannelClosed,
    /// `O`/`L` before a bitrate was set
    BitrateNotSet,
    InvalidBitrate,
    /// Argument outside its allowed values
    InvalidArgument,
    /// Line length does not fit the command
    Malformed,
    /// Data length code above 8
    DlcTooLarge,
    /// CAN driver refused the frame
    SendFailed,
}

impl LawicelError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::Unsupported => "unsupported command",
            Self::ChannelOpen => "channel open",
            Self::ChannelClosed => "channel closed",
            Self::BitrateNotSet => "bitrate not set",
            Self::InvalidBitrate => "invalid bitrate",
            Self::InvalidArgument => "invalid argument",
            Self::Malformed => "malformed line",
            Self::DlcTooLarge => "length code above 8",
            Self::SendFailed => "send failed",
        }
    }
}

impl core::fmt::Display for LawicelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
