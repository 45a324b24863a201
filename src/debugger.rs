//! Top-level driver: runs the engine of the selected mode.
//!
//! The mode lives in [`DebuggerConfig`] and may change between any two
//! polls (mode button timer). It is re-read on every poll; a change is
//! applied before the new engine runs.

use crate::can::{CanBus, CanMode, Filter};
use crate::config::{DebuggerConfig, BRIDGE_FILTERS};
use crate::console::{Shell, ShellEvent};
use crate::lawicel::Bridge;
use crate::log_info;
use crate::mode::OperatingMode;
use crate::transport::ByteTransport;

/// Both engines and the mode they were last set up for.
pub struct Debugger {
    /// Mode the CAN setup currently matches; `None` before the first poll.
    applied: Option<OperatingMode>,
    shell: Shell,
    bridge: Bridge,
}

impl Debugger {
    pub const fn new() -> Self {
        Self {
            applied: None,
            shell: Shell::new(),
            bridge: Bridge::new(),
        }
    }

    pub fn mode(&self) -> Option<OperatingMode> {
        self.applied
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// One poll of the active engine.
    pub fn poll(
        &mut self,
        now_us: i64,
        io: &mut dyn ByteTransport,
        can: &mut dyn CanBus,
        config: &DebuggerConfig,
    ) -> ShellEvent {
        let mode = config.mode();
        if self.applied != Some(mode) {
            self.apply(mode, can, now_us);
        }

        match mode {
            OperatingMode::Shell => self.shell.poll(now_us, io, can, config),
            OperatingMode::Bridge => {
                self.bridge.poll(now_us, io, can);
                ShellEvent::Idle
            }
            OperatingMode::Unknown => ShellEvent::Idle,
        }
    }

    fn apply(&mut self, mode: OperatingMode, can: &mut dyn CanBus, now_us: i64) {
        match mode {
            OperatingMode::Shell => {
                can.set_mode(CanMode::Normal);
                can.disable_all_filters();
                self.shell.reset();
            }
            OperatingMode::Bridge => {
                can.set_mode(CanMode::Normal);
                for i in BRIDGE_FILTERS {
                    can.set_filter(i, &Filter::RECEIVE_ALL);
                }
                self.bridge.reset();
            }
            OperatingMode::Unknown => {}
        }
        log_info!(now_us, "mode {:?}", mode);
        self.applied = Some(mode);
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new()
    }
}
