//! Module: config
//!
//! Purpose: Build constants and runtime settings for the CAN debugger.
//!
//! Architecture:
//! - Constants: versions, queue sizes, filter layout (fixed at build time)
//! - CONFIG: runtime settings shared with the timer context
//! - All runtime config atomically accessible (lock-free)
//!
//! Safety: The mode-select timer writes `CONFIG.mode` between polls, so
//! readers must load it fresh on every poll and never cache it.

use core::ops::Range;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::can::Bitrate;
use crate::mode::OperatingMode;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

pub const HARDWARE_VERSION_MAJOR: u8 = 1;
pub const HARDWARE_VERSION_MINOR: u8 = 3;

pub const SOFTWARE_VERSION_MAJOR: u8 = 1;
pub const SOFTWARE_VERSION_MINOR: u8 = 3;

/// Receive queue depth of the CAN driver (messages).
pub const CAN_RX_BUFFER_SIZE: usize = 32;

/// Transmit queue depth of the CAN driver (messages).
pub const CAN_TX_BUFFER_SIZE: usize = 64;

/// Number of acceptance filter slots.
pub const FILTER_COUNT: u8 = 15;

/// Slots reserved for the bridge's receive-all filters.
pub const BRIDGE_FILTERS: Range<u8> = 11..15;

/// Bitrate applied at power-up.
pub const DEFAULT_BITRATE: Bitrate = Bitrate::Kbps125;

/// Operating mode at power-up.
pub const DEFAULT_MODE: OperatingMode = OperatingMode::Bridge;

/// Hardware and software version, one nibble each for major/minor.
pub const fn version_bytes() -> (u8, u8) {
    (
        (HARDWARE_VERSION_MAJOR << 4) | HARDWARE_VERSION_MINOR,
        (SOFTWARE_VERSION_MAJOR << 4) | SOFTWARE_VERSION_MINOR,
    )
}

/// Runtime settings.
pub struct DebuggerConfig {
    /// Selected operating mode (written by the mode-select timer).
    mode: AtomicU8,
    /// 120 Ohm bus termination switched in.
    termination: AtomicBool,
    /// Shell prints received frames.
    monitor_enabled: AtomicBool,
}

impl DebuggerConfig {
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(DEFAULT_MODE as u8),
            termination: AtomicBool::new(false),
            monitor_enabled: AtomicBool::new(true),
        }
    }

    #[inline]
    pub fn mode(&self) -> OperatingMode {
        OperatingMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_mode(&self, mode: OperatingMode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    #[inline]
    pub fn termination(&self) -> bool {
        self.termination.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_termination(&self, on: bool) {
        self.termination.store(on, Ordering::Release);
    }

    #[inline]
    pub fn monitor_enabled(&self) -> bool {
        self.monitor_enabled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_monitor_enabled(&self, on: bool) {
        self.monitor_enabled.store(on, Ordering::Relaxed);
    }
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Global runtime configuration.
pub static CONFIG: DebuggerConfig = DebuggerConfig::new();
