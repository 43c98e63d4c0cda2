//! Input/output devices reachable through the I/O side of the system bus.

/// Port-multiplexed monitor and keyboard.
pub mod iod;
/// Scrolling text monitor.
pub mod monitor;

pub use iod::{InputOutputDevices, KEYBOARD_PORT, MONITOR_PORT};
pub use monitor::{TextMonitor, MONITOR_COLUMNS, MONITOR_LINES};
