//! Instruction-set encoding tables and field extraction.

#![allow(clippy::cast_possible_truncation)]

/// Instruction group (`w[15:14]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum InstructionGroup {
    DataTransfer = 0,
    ArithLogic = 1,
    InputOutput = 2,
    Control = 3,
}

impl InstructionGroup {
    /// Converts the low two bits of `bits` into a group.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::DataTransfer,
            1 => Self::ArithLogic,
            2 => Self::InputOutput,
            _ => Self::Control,
        }
    }
}

/// Addressing mode (`w[13:12]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum AddressingMode {
    /// Operands are registers or implied.
    Implicit = 0,
    /// Operand follows the instruction word.
    Immediate = 1,
    /// An address follows the instruction word.
    Absolute = 2,
    /// Address held in register `rb`.
    RegisterIndirect = 3,
}

impl AddressingMode {
    /// Converts the low two bits of `bits` into an addressing mode.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Implicit,
            1 => Self::Immediate,
            2 => Self::Absolute,
            _ => Self::RegisterIndirect,
        }
    }
}

/// Every legal instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Mnemonic {
    Mv,
    Push,
    Pop,
    Sprd,
    Spwr,
    Ldwi,
    Ldbi,
    Ldwa,
    Ldba,
    Stwa,
    Stba,
    Ldwr,
    Ldbr,
    Stwr,
    Stbr,
    Add,
    Sub,
    Not,
    And,
    Or,
    Xor,
    Inc,
    Dec,
    Lsh,
    Rsh,
    Inb,
    Outb,
    Tsti,
    Tsto,
    Br,
    Jmp,
    Jmpz,
    Jmpnz,
    Jmpn,
    Jmpnn,
    Jmpc,
    Jmpv,
    Call,
    Ret,
    Hlt,
}

/// Operand layout of an instruction, shared by the assembler and disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandShape {
    /// No operands.
    None,
    /// One register in the `ra` field.
    Ra,
    /// Registers in the `ra` and `rb` fields.
    RaRb,
    /// `ra` plus a 16-bit immediate word.
    RaImm16,
    /// `ra` plus an 8-bit immediate byte.
    RaImm8,
    /// `ra` plus an absolute address word.
    RaAddr,
    /// `ra` plus an I/O port word.
    RaPort,
    /// An I/O port word only.
    Port,
    /// An absolute target address word.
    Addr,
    /// A signed 8-bit relative offset in the low byte.
    Offset,
}

impl OperandShape {
    /// Encoded size in bytes, instruction word included.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::None | Self::Ra | Self::RaRb | Self::Offset => 2,
            Self::RaImm8 => 3,
            Self::RaImm16 | Self::RaAddr | Self::RaPort | Self::Port | Self::Addr => 4,
        }
    }
}

/// Single source-of-truth `(group, addressing, opcode)` table.
///
/// Any triple not present here is illegal by definition.
pub const INSTRUCTION_TABLE: &[(u8, u8, u8, Mnemonic)] = &[
    (0, 0, 0x4, Mnemonic::Mv),
    (0, 0, 0x8, Mnemonic::Push),
    (0, 0, 0x9, Mnemonic::Pop),
    (0, 0, 0xD, Mnemonic::Sprd),
    (0, 0, 0xE, Mnemonic::Spwr),
    (0, 1, 0x0, Mnemonic::Ldwi),
    (0, 1, 0x1, Mnemonic::Ldbi),
    (0, 2, 0x0, Mnemonic::Ldwa),
    (0, 2, 0x1, Mnemonic::Ldba),
    (0, 2, 0x2, Mnemonic::Stwa),
    (0, 2, 0x3, Mnemonic::Stba),
    (0, 3, 0x0, Mnemonic::Ldwr),
    (0, 3, 0x1, Mnemonic::Ldbr),
    (0, 3, 0x2, Mnemonic::Stwr),
    (0, 3, 0x3, Mnemonic::Stbr),
    (1, 0, 0x0, Mnemonic::Add),
    (1, 0, 0x1, Mnemonic::Sub),
    (1, 0, 0x2, Mnemonic::Not),
    (1, 0, 0x3, Mnemonic::And),
    (1, 0, 0x4, Mnemonic::Or),
    (1, 0, 0x5, Mnemonic::Xor),
    (1, 0, 0x8, Mnemonic::Inc),
    (1, 0, 0x9, Mnemonic::Dec),
    (1, 0, 0xA, Mnemonic::Lsh),
    (1, 0, 0xB, Mnemonic::Rsh),
    // Word-wide port transfers (INW at 0x0, OUTW at 0x2) are not part of
    // the instruction set. Those opcodes stay unassigned and fault.
    (2, 0, 0x1, Mnemonic::Inb),
    (2, 0, 0x3, Mnemonic::Outb),
    (2, 0, 0x4, Mnemonic::Tsti),
    (2, 0, 0x5, Mnemonic::Tsto),
    (3, 0, 0x0, Mnemonic::Br),
    (3, 0, 0x1, Mnemonic::Jmp),
    (3, 0, 0x2, Mnemonic::Jmpz),
    (3, 0, 0x3, Mnemonic::Jmpnz),
    (3, 0, 0x4, Mnemonic::Jmpn),
    (3, 0, 0x5, Mnemonic::Jmpnn),
    (3, 0, 0x6, Mnemonic::Jmpc),
    (3, 0, 0x7, Mnemonic::Jmpv),
    (3, 0, 0x8, Mnemonic::Call),
    (3, 0, 0x9, Mnemonic::Ret),
    (3, 0, 0xF, Mnemonic::Hlt),
];

impl Mnemonic {
    /// Upper-case assembly name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mv => "MV",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Sprd => "SPRD",
            Self::Spwr => "SPWR",
            Self::Ldwi => "LDWI",
            Self::Ldbi => "LDBI",
            Self::Ldwa => "LDWA",
            Self::Ldba => "LDBA",
            Self::Stwa => "STWA",
            Self::Stba => "STBA",
            Self::Ldwr => "LDWR",
            Self::Ldbr => "LDBR",
            Self::Stwr => "STWR",
            Self::Stbr => "STBR",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Lsh => "LSH",
            Self::Rsh => "RSH",
            Self::Inb => "INB",
            Self::Outb => "OUTB",
            Self::Tsti => "TSTI",
            Self::Tsto => "TSTO",
            Self::Br => "BR",
            Self::Jmp => "JMP",
            Self::Jmpz => "JMPZ",
            Self::Jmpnz => "JMPNZ",
            Self::Jmpn => "JMPN",
            Self::Jmpnn => "JMPNN",
            Self::Jmpc => "JMPC",
            Self::Jmpv => "JMPV",
            Self::Call => "CALL",
            Self::Ret => "RET",
            Self::Hlt => "HLT",
        }
    }

    /// Case-insensitive lookup by assembly name. `CP` is accepted for `MV`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("CP") {
            return Some(Self::Mv);
        }
        INSTRUCTION_TABLE
            .iter()
            .map(|(_, _, _, mnemonic)| *mnemonic)
            .find(|mnemonic| mnemonic.name().eq_ignore_ascii_case(name))
    }

    /// Operand layout of this instruction.
    #[must_use]
    pub const fn operands(self) -> OperandShape {
        match self {
            Self::Push
            | Self::Pop
            | Self::Sprd
            | Self::Spwr
            | Self::Not
            | Self::Inc
            | Self::Dec
            | Self::Lsh
            | Self::Rsh => OperandShape::Ra,
            Self::Mv
            | Self::Ldwr
            | Self::Ldbr
            | Self::Stwr
            | Self::Stbr
            | Self::Add
            | Self::Sub
            | Self::And
            | Self::Or
            | Self::Xor => OperandShape::RaRb,
            Self::Ldwi => OperandShape::RaImm16,
            Self::Ldbi => OperandShape::RaImm8,
            Self::Ldwa | Self::Ldba | Self::Stwa | Self::Stba => OperandShape::RaAddr,
            Self::Inb | Self::Outb => OperandShape::RaPort,
            Self::Tsti | Self::Tsto => OperandShape::Port,
            Self::Br | Self::Call => OperandShape::Addr,
            Self::Jmp
            | Self::Jmpz
            | Self::Jmpnz
            | Self::Jmpn
            | Self::Jmpnn
            | Self::Jmpc
            | Self::Jmpv => OperandShape::Offset,
            Self::Ret | Self::Hlt => OperandShape::None,
        }
    }

    /// Returns `true` for the relative jump family.
    #[must_use]
    pub const fn is_relative_jump(self) -> bool {
        matches!(self.operands(), OperandShape::Offset)
    }

    /// Returns the `(group, addressing, opcode)` triple of this instruction.
    #[must_use]
    pub fn encoding(self) -> (u8, u8, u8) {
        INSTRUCTION_TABLE
            .iter()
            .find_map(|(group, am, op, mnemonic)| (*mnemonic == self).then_some((*group, *am, *op)))
            .unwrap_or_default()
    }

    /// Instruction word with the group, addressing and opcode fields filled in.
    #[must_use]
    pub fn opcode_word(self) -> u16 {
        let (group, am, op) = self.encoding();
        (u16::from(group) << 14) | (u16::from(am) << 12) | (u16::from(op) << 8)
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the instruction for a `(group, addressing, opcode)` triple.
///
/// `None` means illegal encoding.
#[must_use]
pub fn classify(group: u8, addressing: u8, opcode: u8) -> Option<Mnemonic> {
    if group > 0x3 || addressing > 0x3 || opcode > 0xF {
        return None;
    }

    INSTRUCTION_TABLE
        .iter()
        .find_map(|(entry_group, entry_am, entry_op, mnemonic)| {
            (*entry_group == group && *entry_am == addressing && *entry_op == opcode)
                .then_some(*mnemonic)
        })
}

/// Extracts the `(group, addressing, opcode)` triple from an instruction word.
#[must_use]
pub const fn split_word(word: u16) -> (u8, u8, u8) {
    (
        ((word >> 14) & 0x3) as u8,
        ((word >> 12) & 0x3) as u8,
        ((word >> 8) & 0xF) as u8,
    )
}
