//! Hardware Abstraction Layer for the CAN debugger.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Business logic stays in core modules, HAL is just I/O.

#[cfg(target_os = "espidf")]
pub mod twai;
#[cfg(target_os = "espidf")]
pub mod uart;

#[cfg(target_os = "espidf")]
pub use twai::TwaiBus;
#[cfg(target_os = "espidf")]
pub use uart::UartTransport;

/// Board pin assignment (GPIO numbers).
#[derive(Debug, Clone, Copy)]
pub struct PinConfig {
    pub can_tx: i32,
    pub can_rx: i32,
    /// Mode button, active low
    pub mode_button: i32,
    pub duo1_green: i32,
    pub duo1_red: i32,
    pub duo2_green: i32,
    pub duo2_red: i32,
    /// Switches the 120 Ohm bus termination
    pub termination: i32,
    /// Diagnostic log output (UART1 TX)
    pub log_tx: i32,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            can_tx: 5,
            can_rx: 4,
            mode_button: 0,
            duo1_green: 25,
            duo1_red: 26,
            duo2_green: 27,
            duo2_red: 14,
            termination: 13,
            log_tx: 17,
        }
    }
}
