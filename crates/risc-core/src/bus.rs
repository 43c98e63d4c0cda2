//! Shared system bus connecting the CPU, central memory, and I/O devices.
//!
//! The bus is a set of latches: every write replaces the previous value and
//! every read is a non-destructive peek. Components never talk to each other
//! directly; the CPU drives the bus and then asks memory or the I/O devices
//! to `operate` on whatever transaction is currently latched.

/// Direction of a bus transaction (`R` line).
pub const READ: bool = true;
/// Direction of a bus transaction (`R` line).
pub const WRITE: bool = false;
/// Target selection (`M` line).
pub const MEMORY: bool = true;
/// Target selection (`M` line).
pub const INPUT_OUTPUT: bool = false;
/// Transfer width (`W` line).
pub const WORD: bool = true;
/// Transfer width (`W` line).
pub const BYTE: bool = false;

/// Control lines of the system bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControlSignal {
    /// `true` for a read, `false` for a write.
    pub read: bool,
    /// `true` when memory is addressed, `false` for the I/O devices.
    pub memory_select: bool,
    /// `true` for a 16-bit transfer, `false` for a single byte.
    pub word_width: bool,
}

impl ControlSignal {
    /// Builds a control word from its three lines.
    #[must_use]
    pub const fn new(read: bool, memory_select: bool, word_width: bool) -> Self {
        Self {
            read,
            memory_select,
            word_width,
        }
    }

    /// Memory read of the given width.
    #[must_use]
    pub const fn memory_read(word_width: bool) -> Self {
        Self::new(READ, MEMORY, word_width)
    }

    /// Memory write of the given width.
    #[must_use]
    pub const fn memory_write(word_width: bool) -> Self {
        Self::new(WRITE, MEMORY, word_width)
    }

    /// Byte read from an I/O port.
    #[must_use]
    pub const fn io_read() -> Self {
        Self::new(READ, INPUT_OUTPUT, BYTE)
    }

    /// Byte write to an I/O port.
    #[must_use]
    pub const fn io_write() -> Self {
        Self::new(WRITE, INPUT_OUTPUT, BYTE)
    }
}

/// Address, data, and control latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SystemBus {
    address: u16,
    data: u16,
    control: ControlSignal,
}

impl SystemBus {
    /// Creates an idle bus (all lines zero, control = byte write to I/O).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: 0,
            data: 0,
            control: ControlSignal::new(WRITE, INPUT_OUTPUT, BYTE),
        }
    }

    /// Latches a value on the address lines.
    pub const fn write_address(&mut self, address: u16) {
        self.address = address;
    }

    /// Latches a value on the data lines.
    pub const fn write_data(&mut self, data: u16) {
        self.data = data;
    }

    /// Latches the control lines.
    pub const fn write_control(&mut self, control: ControlSignal) {
        self.control = control;
    }

    /// Latches a complete transaction in one call.
    pub const fn issue(&mut self, address: u16, data: u16, control: ControlSignal) {
        self.address = address;
        self.data = data;
        self.control = control;
    }

    /// Current address lines.
    #[must_use]
    pub const fn get_address(&self) -> u16 {
        self.address
    }

    /// Current data lines.
    #[must_use]
    pub const fn get_data(&self) -> u16 {
        self.data
    }

    /// Current control lines.
    #[must_use]
    pub const fn get_control(&self) -> ControlSignal {
        self.control
    }

    /// Zeroes address and data and returns control to its idle state.
    pub const fn reset_bus(&mut self) {
        *self = Self::new();
    }
}
