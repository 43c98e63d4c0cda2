//! Arithmetic-logic unit and its sixteen general-purpose registers.
//!
//! Register indices come straight from 4-bit instruction fields and are
//! validated on every call. An index outside `0..=15` turns the operation
//! into a no-op: nothing is written and `None` is returned so the caller
//! keeps its current flags.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use crate::numeric::twos_complement;
use crate::state::{StatusFlags, GENERAL_REGISTER_COUNT};

/// Register file plus flag-producing operations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArithmeticLogicUnit {
    registers: [u16; GENERAL_REGISTER_COUNT],
}

impl ArithmeticLogicUnit {
    /// Creates an ALU with every register zeroed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registers: [0; GENERAL_REGISTER_COUNT],
        }
    }

    /// Zeroes every register.
    pub const fn reset(&mut self) {
        self.registers = [0; GENERAL_REGISTER_COUNT];
    }

    /// Writes `value` into register `reg`; ignored for invalid indices.
    pub const fn load(&mut self, reg: u8, value: u16) {
        if (reg as usize) < GENERAL_REGISTER_COUNT {
            self.registers[reg as usize] = value;
        }
    }

    /// Reads register `reg`; invalid indices read as zero.
    #[must_use]
    pub const fn get(&self, reg: u8) -> u16 {
        if (reg as usize) < GENERAL_REGISTER_COUNT {
            self.registers[reg as usize]
        } else {
            0
        }
    }

    /// Read-only view of the whole register file.
    #[must_use]
    pub const fn registers(&self) -> &[u16; GENERAL_REGISTER_COUNT] {
        &self.registers
    }

    /// `R[dst] += R[src]`.
    pub fn add(&mut self, dst: u8, src: u8) -> Option<StatusFlags> {
        self.binary(dst, src, |a, b| {
            let sum = u32::from(a) + u32::from(b);
            let result = sum as u16;
            let signed = i32::from(a as i16) + i32::from(b as i16);
            (result, sum > 0xFFFF, signed != i32::from(result as i16))
        })
    }

    /// `R[dst] -= R[src]`.
    ///
    /// Carry is the carry out of `dst + twos_complement(src)` where the
    /// complement is taken as a signed quantity, so `0 - 1` sets it and
    /// `x - 0` never does.
    pub fn sub(&mut self, dst: u8, src: u8) -> Option<StatusFlags> {
        self.binary(dst, src, |a, b| {
            let complement = twos_complement(b) as i16 as i32 as u32;
            let wide = u32::from(a).wrapping_add(complement);
            let result = a.wrapping_sub(b);
            let signed = i32::from(a as i16) - i32::from(b as i16);
            (result, wide > 0xFFFF, signed != i32::from(result as i16))
        })
    }

    /// `R[reg] = !R[reg]`.
    pub fn bitwise_not(&mut self, reg: u8) -> Option<StatusFlags> {
        self.unary(reg, |a| (!a, false, false))
    }

    /// `R[dst] &= R[src]`.
    pub fn bitwise_and(&mut self, dst: u8, src: u8) -> Option<StatusFlags> {
        self.binary(dst, src, |a, b| (a & b, false, false))
    }

    /// `R[dst] |= R[src]`.
    pub fn bitwise_or(&mut self, dst: u8, src: u8) -> Option<StatusFlags> {
        self.binary(dst, src, |a, b| (a | b, false, false))
    }

    /// `R[dst] ^= R[src]`.
    pub fn bitwise_xor(&mut self, dst: u8, src: u8) -> Option<StatusFlags> {
        self.binary(dst, src, |a, b| (a ^ b, false, false))
    }

    /// `R[reg] += 1`; carry and overflow come from the boundary values.
    pub fn inc(&mut self, reg: u8) -> Option<StatusFlags> {
        self.unary(reg, |a| (a.wrapping_add(1), a == 0xFFFF, a == 0x7FFF))
    }

    /// `R[reg] -= 1`; carry is always set.
    pub fn dec(&mut self, reg: u8) -> Option<StatusFlags> {
        self.unary(reg, |a| (a.wrapping_sub(1), true, a == 0x8000))
    }

    /// `R[reg] <<= 1`; carry receives the bit shifted out of bit 15.
    pub fn left_shift(&mut self, reg: u8) -> Option<StatusFlags> {
        self.unary(reg, |a| (a << 1, a & 0x8000 != 0, false))
    }

    /// `R[reg] >>= 1`; carry receives the bit shifted out of bit 0.
    pub fn right_shift(&mut self, reg: u8) -> Option<StatusFlags> {
        self.unary(reg, |a| (a >> 1, a & 0x0001 != 0, false))
    }

    fn unary(
        &mut self,
        reg: u8,
        op: impl FnOnce(u16) -> (u16, bool, bool),
    ) -> Option<StatusFlags> {
        let slot = self.registers.get_mut(usize::from(reg))?;
        let (result, carry, overflow) = op(*slot);
        *slot = result;
        Some(StatusFlags::from_result(result, carry, overflow))
    }

    fn binary(
        &mut self,
        dst: u8,
        src: u8,
        op: impl FnOnce(u16, u16) -> (u16, bool, bool),
    ) -> Option<StatusFlags> {
        let rhs = *self.registers.get(usize::from(src))?;
        let slot = self.registers.get_mut(usize::from(dst))?;
        let (result, carry, overflow) = op(*slot, rhs);
        *slot = result;
        Some(StatusFlags::from_result(result, carry, overflow))
    }
}
