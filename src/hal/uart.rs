//! Host link on UART0.

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::sys::EspError;

use crate::transport::ByteTransport;

/// Host link baud rate.
pub const HOST_BAUD_RATE: u32 = 115_200;

/// Non-blocking byte transport on a UART.
///
/// `has_byte` reads ahead one byte; `read_byte` hands it out.
pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
    pending: Option<u8>,
}

impl<'d> UartTransport<'d> {
    pub fn new<U: uart::Uart>(
        uart: impl Peripheral<P = U> + 'd,
        tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
        rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'd,
    ) -> Result<Self, EspError> {
        let config = uart::config::Config::default()
            .baudrate(esp_idf_svc::hal::units::Hertz(HOST_BAUD_RATE));

        let uart = UartDriver::new(
            uart,
            tx_pin,
            rx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &config,
        )?;

        Ok(Self { uart, pending: None })
    }
}

impl ByteTransport for UartTransport<'_> {
    fn has_byte(&mut self) -> bool {
        if self.pending.is_none() {
            let mut buf = [0u8; 1];
            if let Ok(1) = self.uart.read(&mut buf, NON_BLOCK) {
                self.pending = Some(buf[0]);
            }
        }
        self.pending.is_some()
    }

    fn read_byte(&mut self) -> u8 {
        self.pending.take().unwrap_or(0)
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.uart.write(&[byte]);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let _ = self.uart.write(bytes);
    }
}
