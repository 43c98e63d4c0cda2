//! Central memory and the program loader.

/// Flat byte-addressable RAM answering bus transactions.
pub mod central;
/// Program image parsing and loading.
pub mod loader;

pub use central::CentralMemory;
pub use loader::{
    parse_image, read_program, to_hex_image, AssembledImage, LoadError, LoadReport, ProgramAssembler,
    ProgramImage,
};

/// Size in bytes of the flat 16-bit address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;
