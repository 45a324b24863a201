//! Shell error types
//!
//! Every error ends up as one `Error: <message>` line; none of them
//! stops the shell.

/// Shell error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    /// No command table entry matched
    UnknownCommand,
    /// Required argument(s) missing
    NoParameters,
    /// Generic syntax error in arguments
    WrongFormat,
    /// Identifier is not a hex number
    InvalidId,
    /// Identifier does not fit 11/29 bits
    IdOutOfRange,
    /// Length code not a single digit 0..8
    InvalidLength,
    /// Data token with an odd number of digits
    OddDataDigits,
    /// More than 8 data bytes
    DataTooLong,
    /// Data byte count differs from the length code
    LengthMismatch,
    /// CAN driver refused the frame
    SendFailed,
    InvalidBitrate,
    InvalidFilterNumber,
    /// Mask/id not hex numbers
    InvalidMaskOrId,
    SetFilterFailed,
    DisableFilterFailed,
    ReadFilterFailed,
    /// `set` sub-command not known
    NotImplemented,
    /// `set term` with something other than on/off
    UnknownOption,
    NoHelpPage,
}

impl ShellError {
    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::NoParameters => "no parameters",
            Self::WrongFormat => "Wrong format",
            Self::InvalidId => "Invalid characters in CAN-ID",
            Self::IdOutOfRange => "CAN-ID out of range",
            Self::InvalidLength => "Invalid length code",
            Self::OddDataDigits => "Only tuples of 2*n digits allowed in data segment",
            Self::DataTooLong => "Data segment too long",
            Self::LengthMismatch => "Given data length differs from length of data segment",
            Self::SendFailed => "Could not send message",
            Self::InvalidBitrate => "Invalid bitrate",
            Self::InvalidFilterNumber => "Invalid filter number",
            Self::InvalidMaskOrId => "Invalid characters in CAN-mask or id",
            Self::SetFilterFailed => "Could not set filter",
            Self::DisableFilterFailed => "Could not disable filter",
            Self::ReadFilterFailed => "could not read filter",
            Self::NotImplemented => "Command not yet implemented!",
            Self::UnknownOption => "Unknown option. Should be \"on\" or \"off\"",
            Self::NoHelpPage => "no help page available for this command",
        }
    }
}

impl core::fmt::Display for ShellError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}
