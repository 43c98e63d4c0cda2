use super::monitor::{TextMonitor, MONITOR_LINES};
use crate::bus::SystemBus;

/// Port address of the text monitor (write-only).
pub const MONITOR_PORT: u16 = 0;
/// Port address of the keyboard latch (read-only).
pub const KEYBOARD_PORT: u16 = 1;

/// Monitor and keyboard ports answering I/O bus transactions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputOutputDevices {
    monitor: TextMonitor,
    key: u8,
    sent: bool,
}

impl InputOutputDevices {
    /// Creates devices with a blank monitor and no pending key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches a key byte from the host. A non-zero key raises the
    /// data-available flag until it is read or tested.
    pub const fn input(&mut self, key: u8) {
        self.key = key;
        if key != 0 {
            self.sent = true;
        }
    }

    /// Answers the transaction currently latched on the bus.
    ///
    /// Ignored when the bus selects memory. A write to [`MONITOR_PORT`] prints
    /// the low data byte; a read of [`KEYBOARD_PORT`] returns the latched key
    /// and clears it. Every other port/direction is a no-op.
    #[allow(clippy::cast_possible_truncation)]
    pub fn operate(&mut self, bus: &mut SystemBus) {
        let control = bus.get_control();
        if control.memory_select {
            return;
        }

        match (bus.get_address(), control.read) {
            (MONITOR_PORT, false) => self.monitor.write_byte(bus.get_data() as u8),
            (KEYBOARD_PORT, true) => {
                bus.write_data(u16::from(self.key));
                self.key = 0;
                self.sent = false;
            }
            _ => {}
        }
    }

    /// Returns and clears the data-available flag.
    pub const fn take_sent(&mut self) -> bool {
        let sent = self.sent;
        self.sent = false;
        sent
    }

    /// Peeks the data-available flag.
    #[must_use]
    pub const fn get_sent(&self) -> bool {
        self.sent
    }

    /// Peeks the latched key without consuming it.
    #[must_use]
    pub const fn pending_key(&self) -> u8 {
        self.key
    }

    /// Whether `port` can accept output right now. Only the monitor can, and
    /// it is always ready.
    #[must_use]
    pub const fn output_ready(&self, port: u16) -> bool {
        port == MONITOR_PORT
    }

    /// Monitor lines, top first.
    #[must_use]
    pub const fn lines(&self) -> &[String; MONITOR_LINES] {
        self.monitor.lines()
    }

    /// Clears the monitor, the key latch and the data-available flag.
    pub fn reset(&mut self) {
        self.monitor.clear();
        self.key = 0;
        self.sent = false;
    }
}
