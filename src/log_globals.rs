//! Global log stream instance.
//!
//! Producers: the poll loop (shell, bridge, mode changes) and the
//! mode-select timer. Consumer: the log UART drain.

use crate::logging::LogStream;

/// Diagnostic log stream shared by every producer.
pub static LOG_STREAM: LogStream = LogStream::new();
