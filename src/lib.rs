//! # CanDebugger
//!
//! Serial-to-CAN bridge firmware core with two personalities:
//! - an interactive shell with line editing and history
//! - a Lawicel (SLCAN) compatible ASCII bridge
//!
//! ## Architecture
//!
//! Both engines are plain state machines driven by [`Debugger::poll`]
//! from the main loop, one byte and one frame per poll. They only see
//! the hardware through [`can::CanBus`] and [`transport::ByteTransport`],
//! so everything above `hal` runs and tests on the host.

#![cfg_attr(not(test), no_std)]

pub mod can;
pub mod config;
pub mod console;
pub mod debugger;
pub mod hal;
pub mod lawicel;
pub mod log_globals;
pub mod logging;
pub mod mode;
pub mod transport;
pub mod uart_logger;

pub use can::{CanBus, Frame};
pub use config::CONFIG;
pub use console::{Shell, ShellEvent};
pub use debugger::Debugger;
pub use lawicel::{Bridge, LawicelSession};
pub use mode::{ModeSelector, OperatingMode};
pub use transport::ByteTransport;
