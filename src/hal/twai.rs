//! TWAI (CAN) controller driver.
//!
//! Raw `twai_*` calls from ESP-IDF. Bitrate and mode live in the driver
//! configuration, so changing either stops, uninstalls and reinstalls the
//! driver. The hardware filter accepts everything; the per-slot filters
//! are applied in software by a [`FilterBank`].

use esp_idf_svc::sys::{
    esp_timer_get_time, twai_driver_install, twai_driver_uninstall, twai_filter_config_t,
    twai_general_config_t, twai_get_status_info, twai_message_t, twai_mode_t,
    twai_mode_t_TWAI_MODE_LISTEN_ONLY, twai_mode_t_TWAI_MODE_NORMAL, twai_receive, twai_start,
    twai_status_info_t, twai_stop, twai_timing_config_t, twai_transmit, EspError,
};

use crate::can::{Bitrate, CanBus, CanMode, ErrorCounters, Filter, FilterBank, FilterState, Frame};
use crate::config::{CAN_RX_BUFFER_SIZE, CAN_TX_BUFFER_SIZE, DEFAULT_BITRATE};

const TWAI_MSG_FLAG_EXTD: u32 = 0x01;
const TWAI_MSG_FLAG_RTR: u32 = 0x02;

/// Transmit queue wait, in RTOS ticks.
const TX_WAIT_TICKS: u32 = 0;

/// Timing for the 80 MHz APB clock: 20 quanta per bit, sample at 80%.
fn timing(bitrate: Bitrate) -> twai_timing_config_t {
    let brp = match bitrate {
        Bitrate::Kbps10 => 400,
        Bitrate::Kbps20 => 200,
        Bitrate::Kbps50 => 80,
        Bitrate::Kbps100 => 40,
        Bitrate::Kbps125 => 32,
        Bitrate::Kbps250 => 16,
        Bitrate::Kbps500 => 8,
        Bitrate::Mbps1 => 4,
    };
    twai_timing_config_t {
        brp,
        tseg_1: 15,
        tseg_2: 4,
        sjw: 3,
        triple_sampling: false,
        ..Default::default()
    }
}

/// CAN bus on the on-chip TWAI controller.
pub struct TwaiBus {
    tx_pin: i32,
    rx_pin: i32,
    bitrate: Bitrate,
    mode: CanMode,
    filters: FilterBank,
    installed: bool,
    /// Timestamp zero, microseconds since boot.
    epoch_us: i64,
}

impl TwaiBus {
    /// Install and start the driver at the default bitrate.
    pub fn new(tx_pin: i32, rx_pin: i32) -> Result<Self, EspError> {
        let mut bus = Self {
            tx_pin,
            rx_pin,
            bitrate: DEFAULT_BITRATE,
            mode: CanMode::Normal,
            filters: FilterBank::new(),
            installed: false,
            epoch_us: now_us(),
        };
        bus.install()?;
        Ok(bus)
    }

    pub fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    fn install(&mut self) -> Result<(), EspError> {
        let mode: twai_mode_t = match self.mode {
            CanMode::Normal => twai_mode_t_TWAI_MODE_NORMAL,
            CanMode::ListenOnly => twai_mode_t_TWAI_MODE_LISTEN_ONLY,
        };
        let general = twai_general_config_t {
            mode,
            tx_io: self.tx_pin,
            rx_io: self.rx_pin,
            clkout_io: -1,
            bus_off_io: -1,
            tx_queue_len: CAN_TX_BUFFER_SIZE as u32,
            rx_queue_len: CAN_RX_BUFFER_SIZE as u32,
            ..Default::default()
        };
        let timing = timing(self.bitrate);
        let filter = twai_filter_config_t {
            acceptance_code: 0,
            acceptance_mask: 0xFFFF_FFFF,
            single_filter: true,
        };

        unsafe {
            EspError::convert(twai_driver_install(&general, &timing, &filter))?;
            self.installed = true;
            EspError::convert(twai_start())
        }
    }

    fn uninstall(&mut self) {
        if self.installed {
            unsafe {
                twai_stop();
                twai_driver_uninstall();
            }
            self.installed = false;
        }
    }

    fn reinstall(&mut self) {
        self.uninstall();
        if let Err(e) = self.install() {
            crate::log_error!(now_us(), "twai install failed: {}", e);
        }
    }
}

impl Drop for TwaiBus {
    fn drop(&mut self) {
        self.uninstall();
    }
}

fn now_us() -> i64 {
    unsafe { esp_timer_get_time() }
}

impl CanBus for TwaiBus {
    fn send(&mut self, frame: &Frame) -> bool {
        if !self.installed {
            return false;
        }

        let mut msg = twai_message_t::default();
        let mut flags = 0;
        if frame.extended {
            flags |= TWAI_MSG_FLAG_EXTD;
        }
        if frame.rtr {
            flags |= TWAI_MSG_FLAG_RTR;
        }
        msg.__bindgen_anon_1.flags = flags;
        msg.identifier = frame.id;
        msg.data_length_code = frame.length;
        msg.data = frame.data;

        EspError::convert(unsafe { twai_transmit(&msg, TX_WAIT_TICKS) }).is_ok()
    }

    fn poll_received(&mut self) -> Option<Frame> {
        if !self.installed {
            return None;
        }

        loop {
            let mut msg = twai_message_t::default();
            if EspError::convert(unsafe { twai_receive(&mut msg, 0) }).is_err() {
                return None;
            }

            let flags = unsafe { msg.__bindgen_anon_1.flags };
            let frame = Frame {
                id: msg.identifier,
                extended: flags & TWAI_MSG_FLAG_EXTD != 0,
                rtr: flags & TWAI_MSG_FLAG_RTR != 0,
                length: msg.data_length_code.min(8),
                data: msg.data,
                timestamp: ((now_us() - self.epoch_us) / 1000) as u16,
            };

            // Frames no slot accepts are dropped here.
            if self.filters.accepts(&frame) {
                return Some(frame);
            }
        }
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
        self.bitrate = bitrate;
        self.filters.clear();
        self.reinstall();
    }

    fn set_mode(&mut self, mode: CanMode) {
        if self.mode != mode || !self.installed {
            self.mode = mode;
            self.reinstall();
        }
    }

    fn reset_timestamp(&mut self) {
        self.epoch_us = now_us();
    }

    fn read_error_counters(&mut self) -> ErrorCounters {
        if !self.installed {
            return ErrorCounters::default();
        }

        let mut status = twai_status_info_t::default();
        if EspError::convert(unsafe { twai_get_status_info(&mut status) }).is_err() {
            return ErrorCounters::default();
        }
        ErrorCounters {
            rx: status.rx_error_counter.min(255) as u8,
            tx: status.tx_error_counter.min(255) as u8,
        }
    }
}
