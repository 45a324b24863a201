//! Interactive shell on the serial line
//!
//! Polled from the main loop, one byte per poll.
//! Zero heap allocation - all static buffers.

pub mod commands;
pub mod editor;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod monitor;
pub mod parser;
pub mod shell;

/// Prompt printed before each input line.
pub const PROMPT: &str = "$ ";

pub use commands::{command_names, match_command, CommandId, Continuation, Invocation, COMMANDS};
pub use editor::{LineEditor, LineEvent, Redraw};
pub use error::ShellError;
pub use history::History;
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedCommand};
pub use shell::{Shell, ShellEvent, ShellState};
