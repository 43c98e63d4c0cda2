//! CPU state model primitives.

/// Status flag set and its packed bit layout.
pub mod flags;
/// Instruction-cycle phases and terminal sentinels.
pub mod phase;
/// General-purpose register identifiers and CPU special registers.
pub mod registers;

pub use flags::{StatusFlags, FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z};
pub use phase::Phase;
pub use registers::{SpecialRegisters, GENERAL_REGISTER_COUNT};
