use thiserror::Error;

/// Execution fault latched by the CPU when it enters the `FAULT` phase.
///
/// The phase machine never returns this as an error; it is kept for display
/// and for drivers that want to explain why the machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// The `(group, addressing, opcode)` triple is not a legal instruction.
    #[error(
        "illegal instruction {word:#06x} (group {group}, addressing {addressing}, opcode {opcode:#x})"
    )]
    IllegalInstruction {
        /// Raw instruction register contents.
        word: u16,
        /// Group field (`w[15:14]`).
        group: u8,
        /// Addressing-mode field (`w[13:12]`).
        addressing: u8,
        /// Opcode field (`w[11:8]`).
        opcode: u8,
    },
}

impl Fault {
    /// Raw instruction word that caused the fault.
    #[must_use]
    pub const fn word(self) -> u16 {
        match self {
            Self::IllegalInstruction { word, .. } => word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Fault;

    #[test]
    fn illegal_instruction_message_names_the_fields() {
        let fault = Fault::IllegalInstruction {
            word: 0x0F00,
            group: 0,
            addressing: 0,
            opcode: 0xF,
        };
        assert_eq!(
            fault.to_string(),
            "illegal instruction 0x0f00 (group 0, addressing 0, opcode 0xf)"
        );
        assert_eq!(fault.word(), 0x0F00);
    }
}
