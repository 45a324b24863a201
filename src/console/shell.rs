//! Shell session: prompt, line editing, dispatch and the receive monitor.

use core::fmt::Write;

use super::commands::{match_command, CommandId, Continuation, Invocation, ShellContext};
use super::editor::{LineEditor, LineEvent};
use super::monitor::format_received;
use super::{ShellError, PROMPT};
use crate::can::CanBus;
use crate::config::DebuggerConfig;
use crate::transport::{ByteTransport, Terminal};
use crate::{log_debug, log_warn};

/// Session state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellState {
    /// Prompt pending
    Init,
    /// Editing a line
    Running,
    /// A handler owns the keyboard
    Captured(CommandId),
}

/// Outcome of one poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellEvent {
    Idle,
    /// `restart`/`exit` ran; the caller should reset the device.
    RestartRequested,
}

/// Shell session
pub struct Shell {
    editor: LineEditor,
    state: ShellState,
}

impl Shell {
    pub const fn new() -> Self {
        Self {
            editor: LineEditor::new(),
            state: ShellState::Init,
        }
    }

    /// Drop history, pending input and any capture.
    pub fn reset(&mut self) {
        self.editor.reset();
        self.state = ShellState::Init;
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// Run one step: at most one input byte and one received frame.
    pub fn poll(
        &mut self,
        now_us: i64,
        io: &mut dyn ByteTransport,
        can: &mut dyn CanBus,
        config: &DebuggerConfig,
    ) -> ShellEvent {
        if self.state == ShellState::Init {
            let _ = Terminal::new(io).write_str(PROMPT);
            self.editor.restart();
            self.state = ShellState::Running;
        }

        let mut event = ShellEvent::Idle;

        if io.has_byte() {
            let byte = io.read_byte();
            let mut out = Terminal::new(io);

            match self.state {
                ShellState::Captured(id) => {
                    let mut ctx = ShellContext {
                        out: &mut out,
                        can: &mut *can,
                        config,
                        now_us,
                        restart_requested: false,
                    };
                    let result = id.run(&mut ctx, Invocation::Key(byte));
                    let restart = ctx.restart_requested;
                    event = self.finish(id, result, restart, &mut out, now_us);
                }
                _ => {
                    let complete = match self.editor.feed(byte) {
                        LineEvent::None => false,
                        LineEvent::Redraw(redraw) => {
                            redraw.render(&mut out);
                            false
                        }
                        LineEvent::Complete => true,
                    };
                    if complete {
                        event = self.dispatch(&mut out, can, config, now_us);
                    }
                }
            }
        }

        if let Some(frame) = can.poll_received() {
            if config.monitor_enabled() {
                format_received(&frame, &mut Terminal::new(io));
            }
        }

        event
    }

    fn dispatch(
        &mut self,
        out: &mut dyn Write,
        can: &mut dyn CanBus,
        config: &DebuggerConfig,
        now_us: i64,
    ) -> ShellEvent {
        self.state = ShellState::Init;
        let _ = out.write_str("\n");

        // The editor keeps the line until the next byte starts a new one.
        let line = *self.editor.line();
        let text = line.as_str();
        if text.is_empty() {
            return ShellEvent::Idle;
        }

        let Some(descriptor) = match_command(text) else {
            log_debug!(now_us, "unknown command");
            report(out, ShellError::UnknownCommand);
            return ShellEvent::Idle;
        };

        let mut ctx = ShellContext {
            out: &mut *out,
            can,
            config,
            now_us,
            restart_requested: false,
        };
        let result = descriptor.id.run(&mut ctx, Invocation::Line(text));
        let restart = ctx.restart_requested;
        self.finish(descriptor.id, result, restart, out, now_us)
    }

    fn finish(
        &mut self,
        id: CommandId,
        result: Result<Continuation, ShellError>,
        restart: bool,
        out: &mut dyn Write,
        now_us: i64,
    ) -> ShellEvent {
        self.state = match result {
            Ok(Continuation::Capture) => ShellState::Captured(id),
            Ok(Continuation::Done) => ShellState::Init,
            Err(err) => {
                log_warn!(now_us, "{:?}: {}", id, err);
                report(out, err);
                ShellState::Init
            }
        };

        if restart {
            ShellEvent::RestartRequested
        } else {
            ShellEvent::Idle
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

fn report(out: &mut dyn Write, err: ShellError) {
    let _ = writeln!(out, "Error: {}", err);
}
