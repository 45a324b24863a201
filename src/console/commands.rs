//! Command table and handlers
//!
//! Dispatch is first-match in table order. A prefix matches only if the
//! line continues with a blank or ends right after it, so `send` and its
//! short form `>` can share one handler.

use core::fmt::Write;

use super::parser::{is_blank, parse_hex_byte, parse_hex_u32, parse_int, parse_line, Args};
use super::ShellError;
use crate::can::{Bitrate, CanBus, Filter, FilterState, Frame, IdKind, RtrKind};
use crate::config::{self, DebuggerConfig, FILTER_COUNT};
use crate::{log_info, log_warn};

/// What a handler is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// Initial call with the full command line.
    Line(&'a str),
    /// Raw keystroke while the handler holds the input.
    Key(u8),
}

/// What the shell does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Back to the prompt.
    Done,
    /// Route the following keystrokes to this handler.
    Capture,
}

/// Everything a handler may touch.
pub struct ShellContext<'a> {
    pub out: &'a mut dyn Write,
    pub can: &'a mut dyn CanBus,
    pub config: &'a DebuggerConfig,
    pub now_us: i64,
    /// Set by `restart`/`exit`.
    pub restart_requested: bool,
}

/// Handler identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    Help,
    Restart,
    Hex,
    Clear,
    Send,
    Get,
    Set,
    Start,
    Stop,
    Version,
}

/// Command descriptor
pub struct CommandDescriptor {
    pub prefix: &'static str,
    /// One-line summary; empty for aliases (not listed by `help`)
    pub brief: &'static str,
    pub id: CommandId,
}

/// All available commands, in dispatch order
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { prefix: "?", brief: "", id: CommandId::Help },
    CommandDescriptor { prefix: "help", brief: "show this help", id: CommandId::Help },
    CommandDescriptor { prefix: "restart", brief: "restart the debugger", id: CommandId::Restart },
    CommandDescriptor { prefix: "exit", brief: "", id: CommandId::Restart },
    CommandDescriptor { prefix: "hex", brief: "print key codes, Ctrl+C ends", id: CommandId::Hex },
    CommandDescriptor { prefix: "clear", brief: "clear screen", id: CommandId::Clear },
    CommandDescriptor { prefix: "send", brief: "send a CAN packet", id: CommandId::Send },
    CommandDescriptor { prefix: ">", brief: "", id: CommandId::Send },
    CommandDescriptor { prefix: "get", brief: "get filter and other values", id: CommandId::Get },
    CommandDescriptor { prefix: "set", brief: "set filter, bitrate etc.", id: CommandId::Set },
    CommandDescriptor { prefix: "start", brief: "restarts output", id: CommandId::Start },
    CommandDescriptor { prefix: "stop", brief: "stops output immediately", id: CommandId::Stop },
    CommandDescriptor { prefix: "version", brief: "show firmware version", id: CommandId::Version },
];

/// Find the first table entry matching `line`.
pub fn match_command(line: &str) -> Option<&'static CommandDescriptor> {
    let bytes = line.as_bytes();
    COMMANDS.iter().find(|c| {
        let n = c.prefix.len();
        let boundary = bytes.get(n).map_or(true, |&b| is_blank(b));
        boundary && bytes.starts_with(c.prefix.as_bytes())
    })
}

/// Get all listed command names
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().filter(|c| !c.brief.is_empty()).map(|c| c.prefix)
}

impl CommandId {
    /// Run the handler.
    pub fn run(
        self,
        ctx: &mut ShellContext<'_>,
        input: Invocation<'_>,
    ) -> Result<Continuation, ShellError> {
        match (self, input) {
            (CommandId::Hex, input) => cmd_hex(ctx, input),
            // Only `hex` ever captures, other handlers ignore stray keys.
            (_, Invocation::Key(_)) => Ok(Continuation::Done),
            (CommandId::Help, Invocation::Line(line)) => cmd_help(ctx, line),
            (CommandId::Restart, Invocation::Line(_)) => cmd_restart(ctx),
            (CommandId::Clear, Invocation::Line(_)) => cmd_clear(ctx),
            (CommandId::Send, Invocation::Line(line)) => cmd_send(ctx, line),
            (CommandId::Get, Invocation::Line(line)) => cmd_get(ctx, line),
            (CommandId::Set, Invocation::Line(line)) => cmd_set(ctx, line),
            (CommandId::Start, Invocation::Line(_)) => {
                ctx.config.set_monitor_enabled(true);
                Ok(Continuation::Done)
            }
            (CommandId::Stop, Invocation::Line(_)) => {
                ctx.config.set_monitor_enabled(false);
                Ok(Continuation::Done)
            }
            (CommandId::Version, Invocation::Line(_)) => cmd_version(ctx),
        }
    }
}

// --- Command Implementations ---

fn bold(out: &mut dyn Write, text: &str) {
    let _ = write!(out, "\x1b[1m{}\x1b[0m", text);
}

fn cmd_help(ctx: &mut ShellContext<'_>, line: &str) -> Result<Continuation, ShellError> {
    let out = &mut *ctx.out;

    match parse_line(line).arg(0) {
        None => {
            for c in COMMANDS.iter().filter(|c| !c.brief.is_empty()) {
                let _ = writeln!(out, "{:<8}- {}", c.prefix, c.brief);
            }
            let _ = writeln!(
                out,
                "\nTo get more information about a specific command type \"help %name%\""
            );
        }
        Some("send") | Some(">") => {
            bold(out, "send id length [rtr|data]\n\n");
            let _ = out.write_str(
                "Example:\n\
                 If you want send a message with CAN Id 0x123 and four \
                 bytes of data you have to type:\n  $ send 123 4 abcd5678\n\
                 For better readability the arguments and the data tuples can \
                 be separated by optional whitespaces.\n\
                 Identifiers with more than three digits are sent as extended frames.\n",
            );
        }
        Some("get") => {
            bold(out, "get filter [number]\n\n");
            let _ = out.write_str(
                "Prints information about the specified filter. Without a given number \
                 the command generates a table with an overview of all filter.\n",
            );
        }
        Some("set") => {
            bold(out, "set bitrate|filter|term ...\n\n");
            let _ = out.write_str("1. ");
            bold(out, "set bitrate [10|20|50|100|125|250|500|1000]\n\n");
            let _ = out.write_str("Set a new bitrate for the CAN bus.\n\n2. ");
            bold(out, "set filter number [e|s] [r|nr] [disable|mask id]\n\n");
            let _ = out.write_str(
                "To receive all messages you simply have to type:\n  $ set filter n 0 0\n\
                 n is a one of the message-objects (0..14).\n\n3. ",
            );
            bold(out, "set term on|off\n\n");
            let _ = out.write_str("Activate/Deactivate a 120 Ohm terminating resistor.\n\n");
        }
        Some(_) => return Err(ShellError::NoHelpPage),
    }

    Ok(Continuation::Done)
}

fn cmd_restart(ctx: &mut ShellContext<'_>) -> Result<Continuation, ShellError> {
    let _ = writeln!(ctx.out, "shell restart");
    ctx.restart_requested = true;
    log_info!(ctx.now_us, "restart requested from shell");
    Ok(Continuation::Done)
}

fn cmd_hex(ctx: &mut ShellContext<'_>, input: Invocation<'_>) -> Result<Continuation, ShellError> {
    match input {
        Invocation::Line(_) => Ok(Continuation::Capture),
        // Ctrl+C
        Invocation::Key(0x03) => Ok(Continuation::Done),
        Invocation::Key(c) => {
            let shown = if c.is_ascii_graphic() || c == b' ' { c as char } else { '.' };
            let _ = writeln!(ctx.out, "{}: 0x{:02X}", shown, c);
            Ok(Continuation::Capture)
        }
    }
}

fn cmd_clear(ctx: &mut ShellContext<'_>) -> Result<Continuation, ShellError> {
    // Clear screen, cursor home
    let _ = ctx.out.write_str("\x1b[;H\x1b[2J\x1b[H");
    Ok(Continuation::Done)
}

/// `send id length [rtr|data]`
fn cmd_send(ctx: &mut ShellContext<'_>, line: &str) -> Result<Continuation, ShellError> {
    let frame = parse_frame(parse_line(line).args())?;

    if !ctx.can.send(&frame) {
        log_warn!(ctx.now_us, "send {:x} failed", frame.id);
        return Err(ShellError::SendFailed);
    }
    Ok(Continuation::Done)
}

/// Frame from the `send` arguments.
pub fn parse_frame(mut args: Args<'_>) -> Result<Frame, ShellError> {
    let id_tok = args.next().ok_or(ShellError::WrongFormat)?;
    if id_tok.len() > 8 {
        return Err(ShellError::WrongFormat);
    }
    let extended = id_tok.len() > 3;
    let id = parse_hex_u32(id_tok).ok_or(ShellError::InvalidId)?;

    let length = match args.next().map(str::as_bytes) {
        Some([d @ b'0'..=b'8']) => d - b'0',
        _ => return Err(ShellError::InvalidLength),
    };

    let frame = if args.clone().next() == Some("rtr") {
        Frame::new_remote(id, extended, length).ok_or(ShellError::InvalidLength)?
    } else {
        let mut data = [0u8; 8];
        let mut count = 0usize;

        for tok in args {
            if tok.len() % 2 != 0 {
                return Err(ShellError::OddDataDigits);
            }
            for pair in tok.as_bytes().chunks(2) {
                let byte = parse_hex_byte(pair).ok_or(ShellError::WrongFormat)?;
                if count == data.len() {
                    return Err(ShellError::DataTooLong);
                }
                data[count] = byte;
                count += 1;
            }
        }

        if count != length as usize {
            return Err(ShellError::LengthMismatch);
        }
        Frame::new_data(id, extended, &data[..count]).ok_or(ShellError::DataTooLong)?
    };

    if !frame.id_in_range() {
        return Err(ShellError::IdOutOfRange);
    }
    Ok(frame)
}

/// `get filter [number]`
fn cmd_get(ctx: &mut ShellContext<'_>, line: &str) -> Result<Continuation, ShellError> {
    let cmd = parse_line(line);
    let mut args = cmd.args();

    match args.next() {
        None => Ok(Continuation::Done),
        Some("filter") => {
            match args.next() {
                None => print_filter_table(ctx),
                Some(tok) => {
                    let number = parse_filter_number(tok)?;
                    print_filter(ctx, number)?;
                }
            }
            Ok(Continuation::Done)
        }
        Some(_) => Err(ShellError::NotImplemented),
    }
}

fn parse_filter_number(tok: &str) -> Result<u8, ShellError> {
    match parse_int(tok) {
        Some(n) if n < FILTER_COUNT as u32 => Ok(n as u8),
        _ => Err(ShellError::InvalidFilterNumber),
    }
}

fn print_filter_table(ctx: &mut ShellContext<'_>) {
    let _ = ctx.out.write_str(
        "   :     mask       id  options\n\
         ---:----------------------------\n",
    );

    for i in 0..FILTER_COUNT {
        let _ = write!(ctx.out, "{:2} : ", i);

        match ctx.can.get_filter(i) {
            FilterState::Error | FilterState::Unknown => {
                let _ = ctx.out.write_str("       *        *\n");
            }
            FilterState::Unused => {
                let _ = ctx.out.write_str("       -        -\n");
            }
            FilterState::Active(filter) => {
                let out = &mut *ctx.out;
                let _ = write!(out, "{:8x} {:8x} ", filter.mask, filter.id);

                let mut described = false;
                if filter.id_kind != IdKind::Any {
                    let _ = out.write_str(if filter.id_kind == IdKind::Standard {
                        " only standard"
                    } else {
                        " only extended"
                    });
                    described = true;
                    if filter.rtr != RtrKind::Any {
                        let _ = out.write_str(" and");
                    }
                } else if filter.rtr != RtrKind::Any {
                    described = true;
                }

                match filter.rtr {
                    RtrKind::DataOnly => {
                        let _ = out.write_str(" non-rtr");
                    }
                    RtrKind::RemoteOnly => {
                        let _ = out.write_str(" rtr");
                    }
                    RtrKind::Any => {}
                }

                if !described {
                    let _ = out.write_str("all");
                }
                let _ = out.write_str(" frames\n");
            }
        }
    }
}

fn print_filter(ctx: &mut ShellContext<'_>, number: u8) -> Result<(), ShellError> {
    let out = &mut *ctx.out;

    let filter = match ctx.can.get_filter(number) {
        FilterState::Error => return Err(ShellError::ReadFilterFailed),
        FilterState::Unused => {
            let _ = out.write_str("filter currently not used.\n");
            return Ok(());
        }
        FilterState::Unknown => {
            let _ = out.write_str("currently no statement possible.\n");
            return Ok(());
        }
        FilterState::Active(filter) => filter,
    };

    if filter.id_kind == IdKind::Standard {
        let _ = write!(out, "mask : {:4x}\n  id : {:4x}\n", filter.mask, filter.id);
    } else {
        let _ = write!(out, "mask : {:8x}\n  id : {:8x}\n", filter.mask, filter.id);
    }

    if filter.rtr == RtrKind::Any && filter.id_kind == IdKind::Any {
        let _ = out.write_str("all");
    } else {
        let _ = out.write_str("only ");
        match filter.id_kind {
            IdKind::Standard => {
                let _ = out.write_str("standard");
            }
            IdKind::Extended => {
                let _ = out.write_str("extended");
            }
            IdKind::Any => {}
        }
        if filter.id_kind != IdKind::Any && filter.rtr != RtrKind::Any {
            let _ = out.write_str(", ");
        }
        match filter.rtr {
            RtrKind::DataOnly => {
                let _ = out.write_str("non-rtr");
            }
            RtrKind::RemoteOnly => {
                let _ = out.write_str("rtr");
            }
            RtrKind::Any => {}
        }
    }
    let _ = out.write_str(" frames\n");
    Ok(())
}

/// `set bitrate|filter|term ...`
fn cmd_set(ctx: &mut ShellContext<'_>, line: &str) -> Result<Continuation, ShellError> {
    let cmd = parse_line(line);
    let mut args = cmd.args();

    match args.next() {
        Some("bitrate") => set_bitrate(ctx, args)?,
        Some("filter") => set_filter(ctx, args)?,
        Some("term") => match args.next() {
            Some("on") => ctx.config.set_termination(true),
            Some("off") => ctx.config.set_termination(false),
            _ => return Err(ShellError::UnknownOption),
        },
        _ => return Err(ShellError::NotImplemented),
    }
    Ok(Continuation::Done)
}

fn set_bitrate(ctx: &mut ShellContext<'_>, mut args: Args<'_>) -> Result<(), ShellError> {
    let tok = args.next().ok_or(ShellError::NoParameters)?;
    let bitrate = parse_int(tok)
        .and_then(Bitrate::from_kbps)
        .ok_or(ShellError::InvalidBitrate)?;

    ctx.can.set_bitrate(bitrate);
    log_info!(ctx.now_us, "bitrate {} kbps (shell)", bitrate.kbps());
    Ok(())
}

/// `set filter number [e|ext|extended|s|std|standard] [r|rtr|nr|non-rtr] [disable|mask id]`
fn set_filter(ctx: &mut ShellContext<'_>, mut args: Args<'_>) -> Result<(), ShellError> {
    let number = parse_filter_number(args.next().ok_or(ShellError::NoParameters)?)?;

    let mut next = args.next();

    let id_kind = match next {
        Some("e") | Some("ext") | Some("extended") => IdKind::Extended,
        Some("s") | Some("std") | Some("standard") => IdKind::Standard,
        _ => IdKind::Any,
    };
    if id_kind != IdKind::Any {
        next = args.next();
    }

    let rtr = match next {
        Some("r") | Some("rtr") => RtrKind::RemoteOnly,
        Some("nr") | Some("non-rtr") => RtrKind::DataOnly,
        _ => RtrKind::Any,
    };
    if rtr != RtrKind::Any {
        next = args.next();
    }

    if next == Some("disable") {
        if !ctx.can.disable_filter(number) {
            return Err(ShellError::DisableFilterFailed);
        }
        return Ok(());
    }

    let mask = next.and_then(parse_hex_prefixed);
    let id = args.next().and_then(parse_hex_prefixed);
    let (Some(mask), Some(id)) = (mask, id) else {
        return Err(ShellError::InvalidMaskOrId);
    };

    let filter = Filter { mask, id, id_kind, rtr };
    if !ctx.can.set_filter(number, &filter) {
        return Err(ShellError::SetFilterFailed);
    }
    Ok(())
}

/// Hex with optional `0x`, as `%lx` reads it.
fn parse_hex_prefixed(tok: &str) -> Option<u32> {
    let digits = tok
        .strip_prefix("0x")
        .or_else(|| tok.strip_prefix("0X"))
        .unwrap_or(tok);
    parse_hex_u32(digits)
}

fn cmd_version(ctx: &mut ShellContext<'_>) -> Result<Continuation, ShellError> {
    let out = &mut *ctx.out;
    let _ = writeln!(
        out,
        "Firmware Version: {}.{}   ({})",
        config::SOFTWARE_VERSION_MAJOR,
        config::SOFTWARE_VERSION_MINOR,
        config::VERSION
    );
    let _ = writeln!(
        out,
        "Hardware Version: {}.{}",
        config::HARDWARE_VERSION_MAJOR,
        config::HARDWARE_VERSION_MINOR
    );
    let _ = writeln!(out, "\nbuild with:");
    let _ = writeln!(out, "- {} messages rx buffer", config::CAN_RX_BUFFER_SIZE);
    let _ = writeln!(out, "- {} messages tx buffer", config::CAN_TX_BUFFER_SIZE);
    Ok(Continuation::Done)
}
