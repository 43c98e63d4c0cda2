//! Phase-accurate core of a 16-bit RISC teaching machine.
//!
//! A CPU drives a shared system bus; central memory and a monitor/keyboard
//! device answer the transactions latched on it. Every instruction runs as
//! four separately invocable phases (`IF`, `ID`, `OF`, `IE`) so a host can
//! single-step below the instruction level and watch the bus in between.

/// Address, data and control latches shared by every component.
pub mod bus;
pub use bus::{ControlSignal, SystemBus, BYTE, INPUT_OUTPUT, MEMORY, READ, WORD, WRITE};

/// Numeric text conversions and two's-complement helpers.
pub mod numeric;
pub use numeric::{
    binstr_to_u8, hexstr_to_u16, hexstr_to_u8, is_negative, sign_extend_offset, twos_complement,
    u16_to_hexstr, u8_to_binstr, u8_to_hexstr,
};

/// Status flags, phases and special registers.
pub mod state;
pub use state::{
    Phase, SpecialRegisters, StatusFlags, FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z,
    GENERAL_REGISTER_COUNT,
};

/// General registers and flag-producing arithmetic.
pub mod alu;
pub use alu::ArithmeticLogicUnit;

/// Instruction groups, mnemonics and the encoding table.
pub mod encoding;
pub use encoding::{
    classify, split_word, AddressingMode, InstructionGroup, Mnemonic, OperandShape,
    INSTRUCTION_TABLE,
};

/// Execution faults latched by the CPU.
pub mod fault;
pub use fault::Fault;

/// Instruction word field extraction and classification.
pub mod decoder;
pub use decoder::{
    DecodedInstruction, DecodedOrFault, Decoder, InstructionFields, ILLEGAL_MNEMONIC,
};

/// Interpreter settings and program formats.
pub mod config;
pub use config::{
    InterpreterSettings, ProgramFormat, DEFAULT_BINARIES_ROOT, DEFAULT_RAM_SIZE, MAX_RAM_SIZE,
    MIN_RAM_SIZE,
};

/// Central memory and program loading.
pub mod memory;
pub use memory::{
    parse_image, read_program, to_hex_image, AssembledImage, CentralMemory, LoadError, LoadReport,
    ProgramAssembler, ProgramImage, ADDRESS_SPACE_BYTES,
};

/// Monitor and keyboard on the I/O side of the bus.
pub mod peripherals;
pub use peripherals::{
    InputOutputDevices, TextMonitor, KEYBOARD_PORT, MONITOR_COLUMNS, MONITOR_LINES, MONITOR_PORT,
};

/// The four-phase CPU.
pub mod cpu;
pub use cpu::{CentralProcessingUnit, FETCH_MNEMONIC};

/// CPU plus board composition and the reload sequence.
pub mod machine;
pub use machine::{Board, Machine};

/// Read-only state snapshots.
pub mod snapshot;
pub use snapshot::{CpuSnapshot, MachineSnapshot};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_one, disassemble_range, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
