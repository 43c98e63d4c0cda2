//! Instruction disassembly.
//!
//! Converts instruction words (and their operand bytes) back into the
//! assembly syntax accepted by the assembler: register fields are written
//! in `ra, rb` order, addresses and immediates in hex, relative jump
//! offsets as signed decimals.

use crate::decoder::{DecodedInstruction, DecodedOrFault, Decoder, ILLEGAL_MNEMONIC};
use crate::encoding::OperandShape;
use crate::numeric::sign_extend_offset;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// The starting address of this instruction.
    pub addr_start: u16,
    /// Length in bytes (2, 3 or 4).
    pub len_bytes: u16,
    /// The instruction mnemonic (e.g., "ADD", "LDWI", "ERR!").
    pub mnemonic: String,
    /// The formatted operands (e.g., "R1, R0" or "R0, 0x1234").
    pub operands: String,
    /// Whether this instruction is an illegal encoding.
    pub is_illegal: bool,
}

impl DisassemblyRow {
    /// Mnemonic and operands joined as one line of assembly.
    #[must_use]
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Disassembles one instruction word.
///
/// `operand` is the word (or byte, for `LDBI`) following the instruction in
/// memory; it is ignored by instructions without one.
#[must_use]
pub fn disassemble(word: u16, operand: u16) -> String {
    match Decoder::decode(word) {
        DecodedOrFault::Fault(_) => format!("{ILLEGAL_MNEMONIC} 0x{word:04X}"),
        DecodedOrFault::Instruction(instruction) => {
            let operands = format_operands(&instruction, operand);
            if operands.is_empty() {
                instruction.mnemonic.name().to_owned()
            } else {
                format!("{} {operands}", instruction.mnemonic)
            }
        }
    }
}

/// Disassembles the instruction stored at `pc`.
///
/// Returns `None` when the instruction or its operand bytes run past the
/// end of `memory`.
#[must_use]
pub fn disassemble_one(pc: u16, memory: &[u8]) -> Option<DisassemblyRow> {
    let word = read_le(memory, pc, 2)?;

    match Decoder::decode(word) {
        DecodedOrFault::Fault(_) => Some(DisassemblyRow {
            addr_start: pc,
            len_bytes: 2,
            mnemonic: ILLEGAL_MNEMONIC.to_owned(),
            operands: format!("0x{word:04X}"),
            is_illegal: true,
        }),
        DecodedOrFault::Instruction(instruction) => {
            let shape = instruction.mnemonic.operands();
            let len_bytes = shape.size();
            let operand = match len_bytes {
                2 => 0,
                n => read_le(memory, pc.wrapping_add(2), usize::from(n - 2))?,
            };

            Some(DisassemblyRow {
                addr_start: pc,
                len_bytes,
                mnemonic: instruction.mnemonic.name().to_owned(),
                operands: format_operands(&instruction, operand),
                is_illegal: false,
            })
        }
    }
}

/// Disassembles consecutive instructions from `start` until `end` (exclusive)
/// or until memory runs out.
#[must_use]
pub fn disassemble_range(start: u16, end: u16, memory: &[u8]) -> Vec<DisassemblyRow> {
    let mut rows = Vec::new();
    let mut pc = start;

    while pc < end {
        let Some(row) = disassemble_one(pc, memory) else {
            break;
        };
        let Some(next) = pc.checked_add(row.len_bytes) else {
            rows.push(row);
            break;
        };
        rows.push(row);
        pc = next;
    }

    rows
}

fn read_le(memory: &[u8], address: u16, len: usize) -> Option<u16> {
    let start = usize::from(address);
    let bytes = memory.get(start..start + len)?;
    Some(match bytes {
        [low] => u16::from(*low),
        [low, high] => u16::from_le_bytes([*low, *high]),
        _ => return None,
    })
}

#[allow(clippy::cast_possible_wrap)]
fn format_operands(instruction: &DecodedInstruction, operand: u16) -> String {
    let ra = instruction.fields.ra;
    let rb = instruction.fields.rb;

    match instruction.mnemonic.operands() {
        OperandShape::None => String::new(),
        OperandShape::Ra => format!("R{ra}"),
        OperandShape::RaRb => format!("R{ra}, R{rb}"),
        OperandShape::RaImm16 | OperandShape::RaAddr | OperandShape::RaPort => {
            format!("R{ra}, 0x{operand:04X}")
        }
        OperandShape::RaImm8 => format!("R{ra}, 0x{:02X}", operand & 0x00FF),
        OperandShape::Port | OperandShape::Addr => format!("0x{operand:04X}"),
        OperandShape::Offset => {
            let offset = sign_extend_offset(instruction.fields.offset) as i16;
            offset.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{disassemble, disassemble_one, disassemble_range};

    #[test]
    fn formats_each_operand_shape() {
        assert_eq!(disassemble(0x1000, 0x1234), "LDWI R0, 0x1234");
        assert_eq!(disassemble(0x1130, 0x00FF), "LDBI R3, 0xFF");
        assert_eq!(disassemble(0x4010, 0), "ADD R1, R0");
        assert_eq!(disassemble(0x4850, 0), "INC R5");
        assert_eq!(disassemble(0x8110, 0x0001), "INB R1, 0x0001");
        assert_eq!(disassemble(0x8400, 0x0001), "TSTI 0x0001");
        assert_eq!(disassemble(0xC800, 0x0040), "CALL 0x0040");
        assert_eq!(disassemble(0xC3FC, 0), "JMPNZ -4");
        assert_eq!(disassemble(0xC105, 0), "JMP 5");
        assert_eq!(disassemble(0xCF00, 0xFFFF), "HLT");
    }

    #[test]
    fn illegal_words_show_the_raw_word() {
        assert_eq!(disassemble(0x0F00, 0), "ERR! 0x0F00");

        let row = disassemble_one(0, &[0x00, 0x0F]).expect("row");
        assert!(row.is_illegal);
        assert_eq!(row.len_bytes, 2);
        assert_eq!(row.text(), "ERR! 0x0F00");
    }

    #[test]
    fn rows_follow_instruction_lengths() {
        let memory = [
            0x00, 0x10, 0x34, 0x12, // LDWI R0, 0x1234
            0x10, 0x11, 0x7F, // LDBI R1, 0x7F
            0x10, 0x40, // ADD R1, R0
            0x00, 0xCF, // HLT
        ];
        let rows = disassemble_range(0, 11, &memory);
        let starts: Vec<u16> = rows.iter().map(|row| row.addr_start).collect();
        assert_eq!(starts, vec![0, 4, 7, 9]);
        assert_eq!(rows[1].text(), "LDBI R1, 0x7F");
        assert_eq!(rows[3].text(), "HLT");
    }

    #[test]
    fn truncated_operand_yields_no_row() {
        assert_eq!(disassemble_one(0, &[0x00, 0x10, 0x34]), None);
        assert_eq!(disassemble_one(0, &[0x00]), None);
    }
}
