/// Micro-step of the instruction cycle, plus the two terminal sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Phase {
    /// Instruction fetch (`IF`).
    #[default]
    Fetch = 0x00,
    /// Instruction decode (`ID`).
    Decode = 0x01,
    /// Operand fetch (`OF`).
    OperandFetch = 0x02,
    /// Instruction execute (`IE`).
    Execute = 0x03,
    /// `HLT` retired; nothing advances until reset.
    Halted = 0xF0,
    /// Illegal instruction; nothing advances until reset.
    Fault = 0xFF,
}

impl Phase {
    /// Stable phase tag.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a phase tag back into a phase.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Fetch),
            0x01 => Some(Self::Decode),
            0x02 => Some(Self::OperandFetch),
            0x03 => Some(Self::Execute),
            0xF0 => Some(Self::Halted),
            0xFF => Some(Self::Fault),
            _ => None,
        }
    }

    /// Returns `true` for the `HALTED` and `FAULT` sentinels.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Halted | Self::Fault)
    }

    /// Two-letter label used by traces and the runner.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fetch => "IF",
            Self::Decode => "ID",
            Self::OperandFetch => "OF",
            Self::Execute => "IE",
            Self::Halted => "HALT",
            Self::Fault => "FAULT",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
