/// Number of general-purpose registers (`R0..R15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;

/// CPU-side special registers.
///
/// `AR` and `DR` mirror the last address and data the CPU put on the bus and
/// exist for display only; nothing in the phase machine reads them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SpecialRegisters {
    pc: u16,
    sp: u16,
    ir: u16,
    ar: u16,
    dr: u16,
}

impl SpecialRegisters {
    /// Creates the register set seen right after a reset.
    #[must_use]
    pub const fn new(pc: u16, sp: u16) -> Self {
        Self {
            pc,
            sp,
            ir: 0,
            ar: 0,
            dr: 0,
        }
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Advances `PC` by `bytes`, wrapping at the end of the address space.
    pub const fn advance_pc(&mut self, bytes: u16) {
        self.pc = self.pc.wrapping_add(bytes);
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads the instruction register.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        self.ir
    }

    /// Writes the instruction register.
    pub const fn set_ir(&mut self, value: u16) {
        self.ir = value;
    }

    /// Reads the address register.
    #[must_use]
    pub const fn ar(&self) -> u16 {
        self.ar
    }

    /// Writes the address register.
    pub const fn set_ar(&mut self, value: u16) {
        self.ar = value;
    }

    /// Reads the data register.
    #[must_use]
    pub const fn dr(&self) -> u16 {
        self.dr
    }

    /// Writes the data register.
    pub const fn set_dr(&mut self, value: u16) {
        self.dr = value;
    }
}
