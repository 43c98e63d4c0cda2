//! Instruction execute phase.

use tracing::debug;

use super::CentralProcessingUnit;
use crate::bus::{ControlSignal, BYTE, WORD};
use crate::decoder::DecodedOrFault;
use crate::encoding::Mnemonic;
use crate::machine::Board;
use crate::numeric::sign_extend_offset;
use crate::peripherals::KEYBOARD_PORT;
use crate::state::{Phase, StatusFlags};

impl CentralProcessingUnit {
    /// Instruction execute.
    ///
    /// Consumes the operand left on the bus data lines by the operand-fetch
    /// phase. Sets `phase_next` to `IF`, or to `HALTED` for `HLT`, or to
    /// `FAULT` (latching the fault) for an illegal instruction.
    pub fn execute_instruction(&mut self, board: &mut Board) {
        if self.is_stalled() {
            return;
        }

        let instruction = match self.decoded {
            DecodedOrFault::Instruction(instruction) => instruction,
            DecodedOrFault::Fault(fault) => {
                debug!(%fault, pc = self.regs.pc(), "illegal instruction");
                self.last_fault = Some(fault);
                self.enter(Phase::Execute, Phase::Fault);
                return;
            }
        };

        let ra = instruction.fields.ra;
        let rb = instruction.fields.rb;
        let operand = board.bus.get_data();
        let mut next = Phase::Fetch;

        match instruction.mnemonic {
            Mnemonic::Mv => self.alu.load(rb, self.alu.get(ra)),
            Mnemonic::Push => {
                let value = self.alu.get(ra);
                self.push(board, value);
            }
            Mnemonic::Pop => {
                let value = self.pop(board);
                self.alu.load(ra, value);
            }
            Mnemonic::Sprd => self.alu.load(ra, self.regs.sp()),
            Mnemonic::Spwr => self.regs.set_sp(self.alu.get(ra)),

            Mnemonic::Ldwi | Mnemonic::Ldwa | Mnemonic::Ldwr => self.load(ra, operand),
            Mnemonic::Ldbi | Mnemonic::Ldba | Mnemonic::Ldbr => self.load(ra, operand & 0x00FF),
            Mnemonic::Stwa => self.write_memory(board, operand, self.alu.get(ra), WORD),
            Mnemonic::Stba => self.write_memory(board, operand, self.alu.get(ra) & 0x00FF, BYTE),
            Mnemonic::Stwr => self.write_memory(board, self.alu.get(rb), self.alu.get(ra), WORD),
            Mnemonic::Stbr => {
                let value = self.alu.get(ra) & 0x00FF;
                self.write_memory(board, self.alu.get(rb), value, BYTE);
            }

            Mnemonic::Add
            | Mnemonic::Sub
            | Mnemonic::Not
            | Mnemonic::And
            | Mnemonic::Or
            | Mnemonic::Xor
            | Mnemonic::Inc
            | Mnemonic::Dec
            | Mnemonic::Lsh
            | Mnemonic::Rsh => {
                if let Some(flags) = self.alu_operation(instruction.mnemonic, ra, rb) {
                    self.flags = flags;
                }
            }

            Mnemonic::Inb => {
                self.regs.set_ar(operand);
                board.bus.issue(operand, 0, ControlSignal::io_read());
                board.iod.operate(&mut board.bus);
                let value = board.bus.get_data() & 0x00FF;
                self.regs.set_dr(value);
                self.load(ra, value);
            }
            Mnemonic::Outb => {
                let value = self.alu.get(ra) & 0x00FF;
                self.regs.set_ar(operand);
                self.regs.set_dr(value);
                board.bus.issue(operand, value, ControlSignal::io_write());
                board.iod.operate(&mut board.bus);
            }
            Mnemonic::Tsti => {
                let available = operand == KEYBOARD_PORT && board.iod.take_sent();
                self.flags.zero = !available;
            }
            Mnemonic::Tsto => self.flags.zero = !board.iod.output_ready(operand),

            Mnemonic::Br => self.regs.set_pc(operand),
            Mnemonic::Jmp
            | Mnemonic::Jmpz
            | Mnemonic::Jmpnz
            | Mnemonic::Jmpn
            | Mnemonic::Jmpnn
            | Mnemonic::Jmpc
            | Mnemonic::Jmpv => {
                if self.condition_holds(instruction.mnemonic) {
                    let target = self
                        .regs
                        .pc()
                        .wrapping_add(sign_extend_offset(instruction.fields.offset));
                    self.regs.set_pc(target);
                }
            }
            Mnemonic::Call => {
                let ret = self.regs.pc();
                self.push(board, ret);
                self.regs.set_pc(operand);
            }
            Mnemonic::Ret => {
                let target = self.pop(board);
                self.regs.set_pc(target);
            }
            Mnemonic::Hlt => {
                debug!(pc = self.regs.pc(), "halted");
                next = Phase::Halted;
            }
        }

        self.retired += 1;
        self.enter(Phase::Execute, next);
    }

    const fn condition_holds(&self, mnemonic: Mnemonic) -> bool {
        let f = self.flags;
        match mnemonic {
            Mnemonic::Jmpz => f.zero,
            Mnemonic::Jmpnz => !f.zero,
            Mnemonic::Jmpn => f.negative,
            Mnemonic::Jmpnn => !f.negative,
            Mnemonic::Jmpc => f.carry,
            Mnemonic::Jmpv => f.overflow,
            _ => true,
        }
    }

    const fn load(&mut self, reg: u8, value: u16) {
        self.alu.load(reg, value);
        self.flags.set_zero_negative(value);
    }

    /// Two-register operations compute `R[rb] ← R[rb] op R[ra]`; single
    /// register operations work on `R[ra]` in place.
    fn alu_operation(&mut self, mnemonic: Mnemonic, ra: u8, rb: u8) -> Option<StatusFlags> {
        let alu = &mut self.alu;
        match mnemonic {
            Mnemonic::Add => alu.add(rb, ra),
            Mnemonic::Sub => alu.sub(rb, ra),
            Mnemonic::Not => alu.bitwise_not(ra),
            Mnemonic::And => alu.bitwise_and(rb, ra),
            Mnemonic::Or => alu.bitwise_or(rb, ra),
            Mnemonic::Xor => alu.bitwise_xor(rb, ra),
            Mnemonic::Inc => alu.inc(ra),
            Mnemonic::Dec => alu.dec(ra),
            Mnemonic::Lsh => alu.left_shift(ra),
            Mnemonic::Rsh => alu.right_shift(ra),
            _ => None,
        }
    }

    /// `M16[SP] ← value; SP -= 2`.
    fn push(&mut self, board: &mut Board, value: u16) {
        let sp = self.regs.sp();
        self.write_memory(board, sp, value, WORD);
        self.regs.set_sp(sp.wrapping_sub(2));
    }

    /// `SP += 2; value ← M16[SP]`.
    fn pop(&mut self, board: &mut Board) -> u16 {
        let sp = self.regs.sp().wrapping_add(2);
        self.regs.set_sp(sp);
        self.read_memory(board, sp, WORD)
    }
}
