//! Central processing unit: the four-phase instruction cycle.
//!
//! Each instruction runs as `IF → ID → [OF] → IE`. The CPU is the only bus
//! master: every phase latches a transaction on the system bus and then
//! asks memory or the I/O devices to answer it. Phases are invoked one at a
//! time by a driver; the CPU never advances on its own.
//!
//! Once `phase_next` is `HALTED` or `FAULT` every phase method is a no-op
//! until [`CentralProcessingUnit::reset`].

mod execute;

use tracing::trace;

use crate::alu::ArithmeticLogicUnit;
use crate::bus::{ControlSignal, BYTE, WORD};
use crate::config::InterpreterSettings;
use crate::decoder::{DecodedOrFault, Decoder};
use crate::encoding::Mnemonic;
use crate::fault::Fault;
use crate::machine::Board;
use crate::state::{Phase, SpecialRegisters, StatusFlags, GENERAL_REGISTER_COUNT};

/// Instruction name shown between fetch and decode.
pub const FETCH_MNEMONIC: &str = "-----";

/// CPU registers, flags and phase state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralProcessingUnit {
    alu: ArithmeticLogicUnit,
    regs: SpecialRegisters,
    flags: StatusFlags,
    phase_now: Phase,
    phase_next: Phase,
    decoded: DecodedOrFault,
    instruction_name: &'static str,
    last_fault: Option<Fault>,
    retired: u64,
}

impl CentralProcessingUnit {
    /// Creates a CPU reset from `settings`.
    #[must_use]
    pub fn new(settings: &InterpreterSettings) -> Self {
        Self {
            alu: ArithmeticLogicUnit::new(),
            regs: SpecialRegisters::new(settings.start, settings.initial_sp()),
            flags: StatusFlags::default(),
            phase_now: Phase::Execute,
            phase_next: Phase::Fetch,
            decoded: Decoder::decode(0),
            instruction_name: FETCH_MNEMONIC,
            last_fault: None,
            retired: 0,
        }
    }

    /// Reinitialises every register, flag and phase from `settings`.
    ///
    /// The machine looks as if an instruction just retired: `phase_now` is
    /// `IE` and `phase_next` is `IF`.
    pub fn reset(&mut self, settings: &InterpreterSettings) {
        *self = Self::new(settings);
    }

    /// `true` once `HLT` retired or an illegal instruction was executed.
    #[must_use]
    pub const fn is_stalled(&self) -> bool {
        self.phase_next.is_terminal()
    }

    /// Instruction fetch: `IR ← M16[PC]`, `PC += 2`.
    pub fn fetch_instruction(&mut self, board: &mut Board) {
        if self.is_stalled() {
            return;
        }
        board.bus.reset_bus();

        let pc = self.regs.pc();
        let word = self.read_memory(board, pc, WORD);
        self.regs.set_ir(word);
        self.regs.advance_pc(2);
        self.instruction_name = FETCH_MNEMONIC;
        self.enter(Phase::Fetch, Phase::Decode);
    }

    /// Instruction decode: splits `IR` and picks the next phase.
    pub fn decode_instruction(&mut self, board: &mut Board) {
        if self.is_stalled() {
            return;
        }
        board.bus.reset_bus();

        self.decoded = Decoder::decode(self.regs.ir());
        self.instruction_name = self.decoded.display_name();
        let next = match self.decoded {
            DecodedOrFault::Instruction(i) if i.needs_operand_fetch() => Phase::OperandFetch,
            DecodedOrFault::Instruction(_) | DecodedOrFault::Fault(_) => Phase::Execute,
        };
        self.enter(Phase::Decode, next);
    }

    /// Operand fetch: leaves the operand on the bus data lines for execute
    /// and advances `PC` past any operand bytes that follow the instruction.
    pub fn fetch_operand(&mut self, board: &mut Board) {
        if self.is_stalled() {
            return;
        }
        self.enter(Phase::OperandFetch, Phase::Execute);

        let Some(instruction) = self.decoded.instruction() else {
            return;
        };
        let pc = self.regs.pc();
        let rb = self.alu.get(instruction.fields.rb);

        match instruction.mnemonic {
            Mnemonic::Ldwi => {
                self.read_memory(board, pc, WORD);
                self.regs.advance_pc(2);
            }
            Mnemonic::Ldbi => {
                self.read_memory(board, pc, BYTE);
                self.regs.advance_pc(1);
            }
            Mnemonic::Ldwa | Mnemonic::Ldba => {
                let address = self.read_memory(board, pc, WORD);
                let width = instruction.mnemonic == Mnemonic::Ldwa;
                self.read_memory(board, address, width);
                self.regs.advance_pc(2);
            }
            Mnemonic::Ldwr => {
                self.read_memory(board, rb, WORD);
            }
            Mnemonic::Ldbr => {
                self.read_memory(board, rb, BYTE);
            }
            Mnemonic::Stwa
            | Mnemonic::Stba
            | Mnemonic::Inb
            | Mnemonic::Outb
            | Mnemonic::Tsti
            | Mnemonic::Tsto
            | Mnemonic::Br
            | Mnemonic::Call => {
                self.read_memory(board, pc, WORD);
                self.regs.advance_pc(2);
            }
            _ => {}
        }
    }

    fn enter(&mut self, now: Phase, next: Phase) {
        self.phase_now = now;
        self.phase_next = next;
        trace!(
            now = %now,
            next = %next,
            pc = self.regs.pc(),
            ir = self.regs.ir(),
            "phase"
        );
    }

    fn read_memory(&mut self, board: &mut Board, address: u16, word_width: bool) -> u16 {
        self.regs.set_ar(address);
        board
            .bus
            .issue(address, 0, ControlSignal::memory_read(word_width));
        board.memory.operate(&mut board.bus);
        let data = board.bus.get_data();
        self.regs.set_dr(data);
        data
    }

    fn write_memory(&mut self, board: &mut Board, address: u16, value: u16, word_width: bool) {
        self.regs.set_ar(address);
        self.regs.set_dr(value);
        board
            .bus
            .issue(address, value, ControlSignal::memory_write(word_width));
        board.memory.operate(&mut board.bus);
    }

    /// Program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.regs.pc()
    }

    /// Stack pointer.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.regs.sp()
    }

    /// Instruction register.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        self.regs.ir()
    }

    /// Address register (last address the CPU put on the bus).
    #[must_use]
    pub const fn ar(&self) -> u16 {
        self.regs.ar()
    }

    /// Data register (last data seen or driven on the bus).
    #[must_use]
    pub const fn dr(&self) -> u16 {
        self.regs.dr()
    }

    /// Status flags.
    #[must_use]
    pub const fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// General register `index`; invalid indices read as zero.
    #[must_use]
    pub const fn register(&self, index: u8) -> u16 {
        self.alu.get(index)
    }

    /// All general registers.
    #[must_use]
    pub const fn registers(&self) -> &[u16; GENERAL_REGISTER_COUNT] {
        self.alu.registers()
    }

    /// Name of the instruction in flight (`-----` after fetch, `ERR!` when illegal).
    #[must_use]
    pub const fn instruction_name(&self) -> &'static str {
        self.instruction_name
    }

    /// Result of the last decode.
    #[must_use]
    pub const fn decoded(&self) -> DecodedOrFault {
        self.decoded
    }

    /// `(phase_now, phase_next)`.
    #[must_use]
    pub const fn phases(&self) -> (Phase, Phase) {
        (self.phase_now, self.phase_next)
    }

    /// Phase that ran last.
    #[must_use]
    pub const fn phase_now(&self) -> Phase {
        self.phase_now
    }

    /// Phase the driver should run next.
    #[must_use]
    pub const fn phase_next(&self) -> Phase {
        self.phase_next
    }

    /// Fault latched by the last illegal instruction, if any.
    #[must_use]
    pub const fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    /// Instructions retired since the last reset.
    #[must_use]
    pub const fn retired(&self) -> u64 {
        self.retired
    }

    /// Direct register write for hosts and tests.
    pub const fn set_register(&mut self, index: u8, value: u16) {
        self.alu.load(index, value);
    }
}
