//! Host-side stand-ins for the CAN controller and the serial link.

#![allow(dead_code)]

use std::collections::VecDeque;

use can_debugger::can::{
    Bitrate, CanBus, CanMode, ErrorCounters, Filter, FilterBank, FilterState, Frame,
};
use can_debugger::transport::ByteTransport;

/// Serial link: scripted input, captured output.
#[derive(Default)]
pub struct MockIo {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
}

impl MockIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Output so far as text, cleared afterwards.
    pub fn take_output(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.output).into_owned();
        self.output.clear();
        out
    }
}

impl ByteTransport for MockIo {
    fn has_byte(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.input.pop_front().unwrap_or(0)
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }
}

/// CAN controller that records every call.
pub struct MockCan {
    pub sent: Vec<Frame>,
    pub rx: VecDeque<Frame>,
    pub filters: FilterBank,
    pub bitrate: Option<Bitrate>,
    pub mode: Option<CanMode>,
    pub counters: ErrorCounters,
    /// `send` result
    pub accept_send: bool,
    pub timestamp_resets: u32,
}

impl MockCan {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            rx: VecDeque::new(),
            filters: FilterBank::new(),
            bitrate: None,
            mode: None,
            counters: ErrorCounters::default(),
            accept_send: true,
            timestamp_resets: 0,
        }
    }

    pub fn receive(&mut self, frame: Frame) {
        self.rx.push_back(frame);
    }
}

impl CanBus for MockCan {
    fn send(&mut self, frame: &Frame) -> bool {
        if self.accept_send {
            self.sent.push(*frame);
        }
        self.accept_send
    }

    fn poll_received(&mut self) -> Option<Frame> {
        self.rx.pop_front()
    }

    fn set_filter(&mut self, index: u8, filter: &Filter) -> bool {
        self.filters.set(index, filter)
    }

    fn get_filter(&mut self, index: u8) -> FilterState {
        self.filters.get(index)
    }

    fn disable_filter(&mut self, index: u8) -> bool {
        self.filters.disable(index)
    }

    fn set_bitrate(&mut self, bitrate: Bitrate) {
        self.bitrate = Some(bitrate);
        self.filters.clear();
    }

    fn set_mode(&mut self, mode: CanMode) {
        self.mode = Some(mode);
    }

    fn read_error_counters(&mut self) -> ErrorCounters {
        self.counters
    }

    fn reset_timestamp(&mut self) {
        self.timestamp_resets += 1;
    }
}

/// Data frame with a receive timestamp.
pub fn rx_frame(id: u32, extended: bool, data: &[u8], timestamp: u16) -> Frame {
    let mut frame = Frame::new_data(id, extended, data).unwrap();
    frame.timestamp = timestamp;
    frame
}
