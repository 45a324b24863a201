//! Command table and handler tests

mod common;

use can_debugger::can::{Bitrate, CanBus, Filter, FilterState, IdKind, RtrKind};
use can_debugger::config::DebuggerConfig;
use can_debugger::console::commands::{
    match_command, CommandId, Continuation, Invocation, ShellContext, COMMANDS,
};
use can_debugger::console::ShellError;
use common::MockCan;

/// Run one command line through the table.
fn run(line: &str, can: &mut MockCan, config: &DebuggerConfig) -> (Result<Continuation, ShellError>, String) {
    let mut out = String::new();
    let id = match_command(line).map(|c| c.id).expect("command should match");
    let mut ctx = ShellContext {
        out: &mut out,
        can,
        config,
        now_us: 0,
        restart_requested: false,
    };
    let result = id.run(&mut ctx, Invocation::Line(line));
    (result, out)
}

fn run_ok(line: &str, can: &mut MockCan) -> String {
    let config = DebuggerConfig::new();
    let (result, out) = run(line, can, &config);
    assert_eq!(result, Ok(Continuation::Done), "{}", line);
    out
}

fn run_err(line: &str) -> ShellError {
    let mut can = MockCan::new();
    let config = DebuggerConfig::new();
    run(line, &mut can, &config).0.unwrap_err()
}

#[test]
fn test_command_table_order() {
    let prefixes: Vec<&str> = COMMANDS.iter().map(|c| c.prefix).collect();
    assert_eq!(
        prefixes,
        ["?", "help", "restart", "exit", "hex", "clear", "send", ">", "get", "set", "start", "stop", "version"]
    );
}

#[test]
fn test_match_requires_boundary() {
    assert_eq!(match_command("send 123 0").map(|c| c.prefix), Some("send"));
    assert_eq!(match_command("> 123 0").map(|c| c.prefix), Some(">"));
    assert_eq!(match_command("send\t1").map(|c| c.prefix), Some("send"));
    assert_eq!(match_command("stop").map(|c| c.prefix), Some("stop"));
    assert!(match_command("sendfoo").is_none());
    assert!(match_command(">123 0").is_none());
    assert!(match_command("Send").is_none());
    assert!(match_command("").is_none());
}

#[test]
fn test_aliases_share_handlers() {
    assert_eq!(match_command("?").map(|c| c.id), Some(CommandId::Help));
    assert_eq!(match_command("exit").map(|c| c.id), Some(CommandId::Restart));
    assert_eq!(match_command("> 1 0").map(|c| c.id), Some(CommandId::Send));
}

#[test]
fn test_send_standard_data_frame() {
    let mut can = MockCan::new();
    run_ok("send 123 4 abcd5678", &mut can);

    let frame = can.sent[0];
    assert_eq!(frame.id, 0x123);
    assert!(!frame.extended);
    assert!(!frame.rtr);
    assert_eq!(frame.payload(), &[0xAB, 0xCD, 0x56, 0x78]);
}

#[test]
fn test_send_split_data_and_short_form() {
    let mut can = MockCan::new();
    run_ok(">  7ff 3 01 02\t03", &mut can);

    assert_eq!(can.sent[0].id, 0x7FF);
    assert_eq!(can.sent[0].payload(), &[1, 2, 3]);
}

#[test]
fn test_send_extended_and_remote() {
    let mut can = MockCan::new();
    run_ok("send 1234 0", &mut can);
    run_ok("send 123 2 rtr", &mut can);

    assert!(can.sent[0].extended);
    assert_eq!(can.sent[0].id, 0x1234);
    assert!(can.sent[1].rtr);
    assert_eq!(can.sent[1].length, 2);
}

#[test]
fn test_send_errors() {
    assert_eq!(run_err("send"), ShellError::WrongFormat);
    assert_eq!(run_err("send 123456789 0"), ShellError::WrongFormat);
    assert_eq!(run_err("send xyz 1 00"), ShellError::InvalidId);
    assert_eq!(run_err("send 123"), ShellError::InvalidLength);
    assert_eq!(run_err("send 123 9"), ShellError::InvalidLength);
    assert_eq!(run_err("send 123 2 abc"), ShellError::OddDataDigits);
    assert_eq!(run_err("send 123 2 ab"), ShellError::LengthMismatch);
    assert_eq!(run_err("send 123 8 0011223344556677 88"), ShellError::DataTooLong);
    assert_eq!(run_err("send 123 1 zz"), ShellError::WrongFormat);
    assert_eq!(run_err("send 800 0"), ShellError::IdOutOfRange);
    assert_eq!(run_err("send 3fffffff 0"), ShellError::IdOutOfRange);
}

#[test]
fn test_send_failure_reported() {
    let mut can = MockCan::new();
    can.accept_send = false;
    let config = DebuggerConfig::new();

    let (result, _) = run("send 1 0", &mut can, &config);
    assert_eq!(result, Err(ShellError::SendFailed));
}

#[test]
fn test_set_bitrate() {
    let mut can = MockCan::new();
    run_ok("set bitrate 500", &mut can);
    assert_eq!(can.bitrate, Some(Bitrate::Kbps500));

    run_ok("set bitrate 0x7d", &mut can);
    assert_eq!(can.bitrate, Some(Bitrate::Kbps125));

    assert_eq!(run_err("set bitrate 800"), ShellError::InvalidBitrate);
    assert_eq!(run_err("set bitrate"), ShellError::NoParameters);
}

#[test]
fn test_set_filter_with_options() {
    let mut can = MockCan::new();
    run_ok("set filter 3 e r 7f0 0x120", &mut can);

    assert_eq!(
        can.get_filter(3),
        FilterState::Active(Filter {
            mask: 0x7F0,
            id: 0x120,
            id_kind: IdKind::Extended,
            rtr: RtrKind::RemoteOnly,
        })
    );

    run_ok("set filter 4 standard non-rtr 0 0", &mut can);
    match can.get_filter(4) {
        FilterState::Active(f) => {
            assert_eq!(f.id_kind, IdKind::Standard);
            assert_eq!(f.rtr, RtrKind::DataOnly);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_set_filter_disable() {
    let mut can = MockCan::new();
    run_ok("set filter 2 0 0", &mut can);
    run_ok("set filter 2 disable", &mut can);

    assert_eq!(can.get_filter(2), FilterState::Unused);
}

#[test]
fn test_set_filter_errors() {
    assert_eq!(run_err("set filter"), ShellError::NoParameters);
    assert_eq!(run_err("set filter 15 0 0"), ShellError::InvalidFilterNumber);
    assert_eq!(run_err("set filter x 0 0"), ShellError::InvalidFilterNumber);
    assert_eq!(run_err("set filter 2 zz 0"), ShellError::InvalidMaskOrId);
    assert_eq!(run_err("set filter 2 0"), ShellError::InvalidMaskOrId);
}

#[test]
fn test_set_term_and_unknown() {
    let mut can = MockCan::new();
    let config = DebuggerConfig::new();

    let (result, _) = run("set term on", &mut can, &config);
    assert_eq!(result, Ok(Continuation::Done));
    assert!(config.termination());

    let (result, _) = run("set term off", &mut can, &config);
    assert_eq!(result, Ok(Continuation::Done));
    assert!(!config.termination());

    assert_eq!(run_err("set term maybe"), ShellError::UnknownOption);
    assert_eq!(run_err("set foo"), ShellError::NotImplemented);
}

#[test]
fn test_get_filter_table() {
    let mut can = MockCan::new();
    run_ok("set filter 0 s nr 7ff 123", &mut can);
    can.set_filter(11, &Filter::RECEIVE_ALL);

    let out = run_ok("get filter", &mut can);

    assert!(out.starts_with("   :     mask       id  options\n---:----------------------------\n"));
    assert!(out.contains(" 0 :      7ff      123  only standard and non-rtr frames\n"));
    assert!(out.contains(" 1 :        -        -\n"));
    assert!(out.contains("11 :        0        0 all frames\n"));
    assert_eq!(out.lines().count(), 2 + 15);
}

#[test]
fn test_get_single_filter() {
    let mut can = MockCan::new();
    run_ok("set filter 0 s nr 7ff 123", &mut can);
    run_ok("set filter 1 abc 12345", &mut can);

    assert_eq!(
        run_ok("get filter 0", &mut can),
        "mask :  7ff\n  id :  123\nonly standard, non-rtr frames\n"
    );
    assert_eq!(
        run_ok("get filter 1", &mut can),
        "mask :      abc\n  id :    12345\nall frames\n"
    );
    assert_eq!(run_ok("get filter 5", &mut can), "filter currently not used.\n");
    assert_eq!(run_err("get filter 99"), ShellError::InvalidFilterNumber);
}

#[test]
fn test_help_pages() {
    let mut can = MockCan::new();

    let out = run_ok("help", &mut can);
    assert!(out.contains("send    - send a CAN packet\n"));
    assert!(out.contains("\"help %name%\""));
    assert!(!out.contains("exit"));

    assert!(run_ok("help send", &mut can).contains("\x1b[1msend id length [rtr|data]"));
    assert!(run_ok("? set", &mut can).contains("\x1b[1mset bitrate"));
    assert!(run_ok("help get", &mut can).contains("get filter [number]"));
    assert_eq!(run_err("help bogus"), ShellError::NoHelpPage);
}

#[test]
fn test_version_output() {
    let mut can = MockCan::new();
    let out = run_ok("version", &mut can);

    assert!(out.starts_with("Firmware Version: 1.3"));
    assert!(out.contains("Hardware Version: 1.3\n"));
    assert!(out.contains("- 32 messages rx buffer\n"));
    assert!(out.contains("- 64 messages tx buffer\n"));
}

#[test]
fn test_clear_screen() {
    let mut can = MockCan::new();
    assert_eq!(run_ok("clear", &mut can), "\x1b[;H\x1b[2J\x1b[H");
}

#[test]
fn test_start_stop_toggle_monitor() {
    let mut can = MockCan::new();
    let config = DebuggerConfig::new();

    run("stop", &mut can, &config);
    assert!(!config.monitor_enabled());
    run("start", &mut can, &config);
    assert!(config.monitor_enabled());
}

#[test]
fn test_restart_sets_flag() {
    let mut can = MockCan::new();
    let config = DebuggerConfig::new();
    let mut out = String::new();
    let mut ctx = ShellContext {
        out: &mut out,
        can: &mut can,
        config: &config,
        now_us: 0,
        restart_requested: false,
    };

    let result = CommandId::Restart.run(&mut ctx, Invocation::Line("exit"));
    assert_eq!(result, Ok(Continuation::Done));
    assert!(ctx.restart_requested);
    assert_eq!(out, "shell restart\n");
}

#[test]
fn test_hex_capture() {
    let mut can = MockCan::new();
    let config = DebuggerConfig::new();
    let mut out = String::new();
    let mut ctx = ShellContext {
        out: &mut out,
        can: &mut can,
        config: &config,
        now_us: 0,
        restart_requested: false,
    };

    assert_eq!(CommandId::Hex.run(&mut ctx, Invocation::Line("hex")), Ok(Continuation::Capture));
    assert_eq!(CommandId::Hex.run(&mut ctx, Invocation::Key(b'a')), Ok(Continuation::Capture));
    assert_eq!(CommandId::Hex.run(&mut ctx, Invocation::Key(0x1B)), Ok(Continuation::Capture));
    assert_eq!(CommandId::Hex.run(&mut ctx, Invocation::Key(0x03)), Ok(Continuation::Done));
    assert_eq!(out, "a: 0x61\n.: 0x1B\n");
}
