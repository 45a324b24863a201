//! Log output on a dedicated TX-only UART.
//!
//! UART0 belongs to the host protocol, so diagnostics leave on UART1.
//! Requires an external USB-UART adapter (CH340, CP2102, etc).
//!
//! ```text
//! ESP32 GPIO (log TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```

use crate::logging::LogEntry;

#[cfg(target_os = "espidf")]
use crate::log_globals::LOG_STREAM;

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// Dropped-message report interval.
pub const DROPPED_REPORT_INTERVAL_US: i64 = 10_000_000;

/// Entries written per drain call, keeps the poll loop responsive.
pub const DRAIN_BATCH: usize = 4;

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 17,
        }
    }
}

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    crate::logging::format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Initialize UART1 TX-only for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Log drain state, owned by the main loop.
#[cfg(target_os = "espidf")]
pub struct UartLogger<'d> {
    uart: UartTxDriver<'d>,
    last_dropped_report: i64,
}

#[cfg(target_os = "espidf")]
impl<'d> UartLogger<'d> {
    pub fn new(uart: UartTxDriver<'d>) -> Self {
        Self {
            uart,
            last_dropped_report: 0,
        }
    }

    /// Write up to [`DRAIN_BATCH`] pending entries.
    pub fn drain(&mut self, now_us: i64) {
        let mut format_buf = [0u8; 128];

        for _ in 0..DRAIN_BATCH {
            let Some(entry) = LOG_STREAM.drain() else {
                break;
            };
            let len = format_log_entry(&entry, &mut format_buf);
            let _ = self.uart.write(&format_buf[..len]);
        }

        if now_us - self.last_dropped_report > DROPPED_REPORT_INTERVAL_US {
            let dropped = LOG_STREAM.dropped();
            if dropped > 0 {
                let len = crate::logging::format_to_buffer(
                    &mut format_buf,
                    format_args!("[WARN] Dropped: {}\n", dropped),
                );
                let _ = self.uart.write(&format_buf[..len]);
                LOG_STREAM.reset_dropped();
            }
            self.last_dropped_report = now_us;
        }
    }
}
