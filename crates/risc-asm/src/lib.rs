//! Two-pass assembler for the 16-bit RISC teaching machine.
//!
//! Produces flat images laid out from address `0x0000`, in the hex format the
//! simulator's program loader reads.

/// Top-level two-pass assembler pipeline.
pub mod assembler;
/// Instruction and directive encoding.
pub mod encoder;
/// Assembly parser for instructions, labels, and directives.
pub mod parser;
/// Symbol table and pass-1 address assignment.
pub mod symbols;

pub use assembler::{
    assemble_source, AssembleError, AssembleErrorKind, AssembledProgram, Assembler, ListingEntry,
    START_LABEL,
};
