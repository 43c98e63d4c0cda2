//! Instruction decoder.
//!
//! Splits the instruction register into its fields and resolves the
//! `(group, addressing, opcode)` triple through the encoding table. Decoding
//! itself never stops the machine: an illegal triple yields
//! [`DecodedOrFault::Fault`] and the execute phase latches it.

#![allow(clippy::cast_possible_truncation)]

use crate::encoding::{classify, split_word, AddressingMode, InstructionGroup, Mnemonic};
use crate::fault::Fault;

/// Sentinel shown as the instruction name while an illegal word is decoded.
pub const ILLEGAL_MNEMONIC: &str = "ERR!";

/// Raw fields of an instruction word.
///
/// `ra`/`rb` are meaningful for the data, ALU and I/O groups; `offset` only
/// for the control group. All are extracted unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InstructionFields {
    /// `w[15:14]`.
    pub group: u8,
    /// `w[13:12]`.
    pub addressing: u8,
    /// `w[11:8]`.
    pub opcode: u8,
    /// `w[7:4]`.
    pub ra: u8,
    /// `w[3:0]`.
    pub rb: u8,
    /// `w[7:0]`.
    pub offset: u8,
}

impl InstructionFields {
    /// Splits an instruction word into its fields.
    #[must_use]
    pub const fn split(word: u16) -> Self {
        let (group, addressing, opcode) = split_word(word);
        Self {
            group,
            addressing,
            opcode,
            ra: ((word >> 4) & 0xF) as u8,
            rb: (word & 0xF) as u8,
            offset: (word & 0xFF) as u8,
        }
    }

    /// Typed group field.
    #[must_use]
    pub const fn group_kind(self) -> InstructionGroup {
        InstructionGroup::from_u2(self.group)
    }

    /// Typed addressing-mode field.
    #[must_use]
    pub const fn addressing_mode(self) -> AddressingMode {
        AddressingMode::from_u2(self.addressing)
    }
}

/// Legal instruction with all fields extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Raw instruction word.
    pub word: u16,
    /// Extracted fields.
    pub fields: InstructionFields,
    /// Resolved instruction.
    pub mnemonic: Mnemonic,
}

impl DecodedInstruction {
    /// Returns `true` when the operand-fetch phase must run before execute.
    ///
    /// That is every non-implicit addressing mode except the register-indirect
    /// stores, the whole I/O group, and the absolute control transfers.
    #[must_use]
    pub const fn needs_operand_fetch(&self) -> bool {
        if self.fields.addressing > 0 && !matches!(self.mnemonic, Mnemonic::Stwr | Mnemonic::Stbr)
        {
            return true;
        }
        matches!(self.fields.group_kind(), InstructionGroup::InputOutput)
            || matches!(self.mnemonic, Mnemonic::Br | Mnemonic::Call)
    }
}

/// Result of decoding an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedOrFault {
    /// Successfully decoded instruction.
    Instruction(DecodedInstruction),
    /// The word is not a legal instruction.
    Fault(Fault),
}

impl DecodedOrFault {
    /// Returns the decoded instruction if present.
    #[must_use]
    pub const fn instruction(self) -> Option<DecodedInstruction> {
        match self {
            Self::Instruction(i) => Some(i),
            Self::Fault(_) => None,
        }
    }

    /// Returns the fault if decoding failed.
    #[must_use]
    pub const fn fault(self) -> Option<Fault> {
        match self {
            Self::Instruction(_) => None,
            Self::Fault(f) => Some(f),
        }
    }

    /// Instruction name, or [`ILLEGAL_MNEMONIC`] for an illegal word.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Instruction(i) => i.mnemonic.name(),
            Self::Fault(_) => ILLEGAL_MNEMONIC,
        }
    }
}

/// Instruction decoder.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    #[must_use]
    pub fn decode(word: u16) -> DecodedOrFault {
        let fields = InstructionFields::split(word);

        match classify(fields.group, fields.addressing, fields.opcode) {
            Some(mnemonic) => DecodedOrFault::Instruction(DecodedInstruction {
                word,
                fields,
                mnemonic,
            }),
            None => DecodedOrFault::Fault(Fault::IllegalInstruction {
                word,
                group: fields.group,
                addressing: fields.addressing,
                opcode: fields.opcode,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::INSTRUCTION_TABLE;

    #[test]
    fn split_extracts_register_and_offset_fields() {
        let fields = InstructionFields::split(0x1234);
        assert_eq!(fields.group, 0);
        assert_eq!(fields.addressing, 1);
        assert_eq!(fields.opcode, 2);
        assert_eq!(fields.ra, 3);
        assert_eq!(fields.rb, 4);
        assert_eq!(fields.offset, 0x34);

        let fields = InstructionFields::split(0xC3FC);
        assert_eq!(fields.group_kind(), InstructionGroup::Control);
        assert_eq!(fields.addressing_mode(), AddressingMode::Implicit);
        assert_eq!(fields.opcode, 3);
        assert_eq!(fields.offset, 0xFC);
    }

    #[test]
    fn decode_ldwi() {
        let instruction = Decoder::decode(0x1000).instruction().expect("should decode");
        assert_eq!(instruction.mnemonic, Mnemonic::Ldwi);
        assert_eq!(instruction.fields.ra, 0);
        assert!(instruction.needs_operand_fetch());
    }

    #[test]
    fn unknown_triple_is_a_fault_with_error_sentinel() {
        let result = Decoder::decode(0x0F00);
        assert_eq!(
            result.fault(),
            Some(Fault::IllegalInstruction {
                word: 0x0F00,
                group: 0,
                addressing: 0,
                opcode: 0xF
            })
        );
        assert_eq!(result.display_name(), ILLEGAL_MNEMONIC);
        assert_eq!(Decoder::decode(0x0000).display_name(), ILLEGAL_MNEMONIC);
    }

    #[test]
    fn operand_fetch_requirements() {
        let needs = |word: u16| {
            Decoder::decode(word)
                .instruction()
                .expect("legal word")
                .needs_operand_fetch()
        };

        assert!(needs(Mnemonic::Ldbi.opcode_word()));
        assert!(needs(Mnemonic::Stwa.opcode_word()));
        assert!(needs(Mnemonic::Ldwr.opcode_word()));
        assert!(!needs(Mnemonic::Stwr.opcode_word()));
        assert!(!needs(Mnemonic::Stbr.opcode_word()));
        assert!(needs(Mnemonic::Tsti.opcode_word()));
        assert!(needs(Mnemonic::Outb.opcode_word()));
        assert!(needs(Mnemonic::Br.opcode_word()));
        assert!(needs(Mnemonic::Call.opcode_word()));
        assert!(!needs(Mnemonic::Jmpz.opcode_word()));
        assert!(!needs(Mnemonic::Ret.opcode_word()));
        assert!(!needs(Mnemonic::Add.opcode_word()));
        assert!(!needs(Mnemonic::Push.opcode_word()));
    }

    #[test]
    fn exhaustive_decode_agrees_with_table() {
        for word in 0u16..=u16::MAX {
            let (group, am, op) = split_word(word);
            let listed = INSTRUCTION_TABLE
                .iter()
                .any(|(g, a, o, _)| (*g, *a, *o) == (group, am, op));
            match Decoder::decode(word) {
                DecodedOrFault::Instruction(i) => {
                    assert!(listed, "{word:#06x} decoded but is not in the table");
                    assert_eq!(i.word, word);
                }
                DecodedOrFault::Fault(fault) => {
                    assert!(!listed, "{word:#06x} faulted but is in the table");
                    assert_eq!(fault.word(), word);
                }
            }
        }
    }
}
