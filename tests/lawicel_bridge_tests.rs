//! Lawicel session and bridge poll tests

mod common;

use can_debugger::can::{Bitrate, CanBus, CanMode, ErrorCounters, Filter, FilterState};
use can_debugger::lawicel::{Bridge, LawicelError, LawicelSession, LineAccumulator, Response, LINE_CAPACITY};
use common::{rx_frame, MockCan, MockIo};

fn exec(session: &mut LawicelSession, can: &mut MockCan, line: &str) -> Response {
    session.execute(line.as_bytes(), can)
}

fn open_session(can: &mut MockCan) -> LawicelSession {
    let mut session = LawicelSession::new();
    assert_eq!(exec(&mut session, can, "S4"), Response::Ack);
    assert_eq!(exec(&mut session, can, "O"), Response::Ack);
    session
}

fn run(bridge: &mut Bridge, io: &mut MockIo, can: &mut MockCan, input: &[u8]) {
    io.feed(input);
    while !io.input.is_empty() {
        bridge.poll(0, io, can);
    }
}

#[test]
fn test_bitrate_digits() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();

    assert_eq!(exec(&mut session, &mut can, "S7"), Response::Error);
    assert_eq!(can.bitrate, None);
    assert!(!session.bitrate_set);

    assert_eq!(exec(&mut session, &mut can, "S8"), Response::Ack);
    assert_eq!(can.bitrate, Some(Bitrate::Mbps1));
    assert!(session.bitrate_set);

    assert_eq!(exec(&mut session, &mut can, "S0"), Response::Ack);
    assert_eq!(can.bitrate, Some(Bitrate::Kbps10));

    assert_eq!(exec(&mut session, &mut can, "S9"), Response::Error);
    assert_eq!(exec(&mut session, &mut can, "S"), Response::Error);
    assert_eq!(exec(&mut session, &mut can, "S44"), Response::Error);
}

#[test]
fn test_open_requires_bitrate() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();

    assert_eq!(
        session.try_execute(b"O", &mut can),
        Err(LawicelError::BitrateNotSet)
    );
    assert_eq!(exec(&mut session, &mut can, "L"), Response::Error);
    assert!(!session.channel_open);
}

#[test]
fn test_open_installs_receive_filters() {
    let mut can = MockCan::new();
    let session = open_session(&mut can);

    assert!(session.channel_open);
    assert_eq!(can.mode, Some(CanMode::Normal));
    for i in 11..15 {
        assert_eq!(can.get_filter(i), FilterState::Active(Filter::RECEIVE_ALL));
    }
    assert_eq!(can.get_filter(10), FilterState::Unused);
}

#[test]
fn test_listen_only_open() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();
    exec(&mut session, &mut can, "S6");

    assert_eq!(exec(&mut session, &mut can, "L"), Response::Ack);
    assert_eq!(can.mode, Some(CanMode::ListenOnly));
    assert!(session.channel_open);
}

#[test]
fn test_bitrate_locked_while_open() {
    let mut can = MockCan::new();
    let mut session = open_session(&mut can);

    for digit in 0..=9 {
        let line = format!("S{}", digit);
        assert_eq!(exec(&mut session, &mut can, &line), Response::Error);
    }
    assert_eq!(exec(&mut session, &mut can, "O"), Response::Error);

    assert_eq!(exec(&mut session, &mut can, "C"), Response::Ack);
    assert_eq!(exec(&mut session, &mut can, "S5"), Response::Ack);
    assert_eq!(can.bitrate, Some(Bitrate::Kbps250));
    assert_eq!(exec(&mut session, &mut can, "C"), Response::Error);
}

#[test]
fn test_send_needs_open_channel() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();

    assert_eq!(
        session.try_execute(b"t1230", &mut can),
        Err(LawicelError::ChannelClosed)
    );

    let mut session = open_session(&mut can);
    assert_eq!(exec(&mut session, &mut can, "t1232abcd"), Response::Ack);
    assert_eq!(exec(&mut session, &mut can, "R000000012"), Response::Ack);
    assert_eq!(exec(&mut session, &mut can, "t1232ab"), Response::Error);

    assert_eq!(can.sent.len(), 2);
    assert_eq!(can.sent[0].payload(), &[0xAB, 0xCD]);
    assert!(can.sent[1].rtr && can.sent[1].extended);
}

#[test]
fn test_send_failure_is_error() {
    let mut can = MockCan::new();
    let mut session = open_session(&mut can);
    can.accept_send = false;

    assert_eq!(
        session.try_execute(b"t1230", &mut can),
        Err(LawicelError::SendFailed)
    );
}

#[test]
fn test_timestamps_toggle() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();

    assert_eq!(exec(&mut session, &mut can, "Z1"), Response::Ack);
    assert!(session.use_timestamps);
    assert_eq!(can.timestamp_resets, 1);

    assert_eq!(exec(&mut session, &mut can, "Z0"), Response::Ack);
    assert!(!session.use_timestamps);

    assert_eq!(exec(&mut session, &mut can, "Z2"), Response::Error);
    assert_eq!(exec(&mut session, &mut can, "Z"), Response::Error);

    let mut session = open_session(&mut can);
    assert_eq!(exec(&mut session, &mut can, "Z1"), Response::Error);
}

#[test]
fn test_info_replies() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();

    assert_eq!(exec(&mut session, &mut can, "F").as_bytes(), b"F00\r");
    assert_eq!(exec(&mut session, &mut can, "N").as_bytes(), b"N0000\r");
    assert_eq!(exec(&mut session, &mut can, "V").as_bytes(), b"V1313\r");
}

#[test]
fn test_rejected_verbs() {
    let mut can = MockCan::new();
    let mut session = LawicelSession::new();

    for line in ["M00000000", "m00000000", "s0000", "X", "v"] {
        assert_eq!(exec(&mut session, &mut can, line), Response::Error, "{}", line);
    }
    assert_eq!(exec(&mut session, &mut can, ""), Response::None);
    assert_eq!(Response::Error.as_bytes(), b"\x07");
    assert_eq!(Response::Ack.as_bytes(), b"\r");
}

#[test]
fn test_accumulator_lines() {
    let mut acc = LineAccumulator::new();

    for &b in b"S4" {
        assert_eq!(acc.feed(b), None);
    }
    assert_eq!(acc.pending(), b"S4");
    assert_eq!(acc.feed(b'\r'), Some(&b"S4"[..]));
    assert_eq!(acc.pending(), b"");
}

#[test]
fn test_accumulator_overflow_resets() {
    let mut acc = LineAccumulator::new();

    for _ in 0..LINE_CAPACITY - 1 {
        acc.feed(b'x');
    }
    assert_eq!(acc.pending().len(), LINE_CAPACITY - 1);

    acc.feed(b'x');
    assert!(acc.pending().is_empty());

    acc.feed(b'V');
    assert_eq!(acc.feed(b'\r'), Some(&b"V"[..]));
}

#[test]
fn test_bridge_command_responses() {
    let mut bridge = Bridge::new();
    let mut io = MockIo::new();
    let mut can = MockCan::new();

    run(&mut bridge, &mut io, &mut can, b"S4\rO\rS4\rV\r");
    assert_eq!(io.take_output(), "\r\r\x07V1313\r");
    assert!(bridge.session().channel_open);
}

#[test]
fn test_bridge_overlong_line_dropped() {
    let mut bridge = Bridge::new();
    let mut io = MockIo::new();
    let mut can = MockCan::new();

    run(&mut bridge, &mut io, &mut can, &[b'x'; LINE_CAPACITY]);
    assert_eq!(io.take_output(), "");

    run(&mut bridge, &mut io, &mut can, b"V\r");
    assert_eq!(io.take_output(), "V1313\r");
}

#[test]
fn test_bridge_forwards_frames_only_when_open() {
    let mut bridge = Bridge::new();
    let mut io = MockIo::new();
    let mut can = MockCan::new();

    can.receive(rx_frame(0x123, false, &[0xAB], 0));
    bridge.poll(0, &mut io, &mut can);
    assert!(can.rx.is_empty());
    assert_eq!(io.take_output(), "");

    run(&mut bridge, &mut io, &mut can, b"Z1\rS4\rO\r");
    io.take_output();

    can.receive(rx_frame(0x123, false, &[0xAB], 0x0042));
    bridge.poll(0, &mut io, &mut can);
    assert_eq!(io.take_output(), "t1231AB0042\r");
}

#[test]
fn test_bridge_error_counters_reported_on_change() {
    let mut bridge = Bridge::new();
    let mut io = MockIo::new();
    let mut can = MockCan::new();

    bridge.poll(0, &mut io, &mut can);
    assert_eq!(io.take_output(), "");

    can.counters = ErrorCounters { rx: 1, tx: 0 };
    bridge.poll(0, &mut io, &mut can);
    assert_eq!(io.take_output(), "E0100\r");

    bridge.poll(0, &mut io, &mut can);
    bridge.poll(0, &mut io, &mut can);
    assert_eq!(io.take_output(), "");

    can.counters = ErrorCounters { rx: 1, tx: 0x20 };
    bridge.poll(0, &mut io, &mut can);
    assert_eq!(io.take_output(), "E0120\r");
}

#[test]
fn test_bridge_reset_closes_channel() {
    let mut bridge = Bridge::new();
    let mut io = MockIo::new();
    let mut can = MockCan::new();

    run(&mut bridge, &mut io, &mut can, b"S4\rO\rt12");
    bridge.reset();

    assert_eq!(*bridge.session(), LawicelSession::new());
}
