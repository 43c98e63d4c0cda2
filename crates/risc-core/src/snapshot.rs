//! Read-only copies of machine state for display and serialization.

use crate::bus::SystemBus;
use crate::cpu::CentralProcessingUnit;
use crate::fault::Fault;
use crate::machine::Board;
use crate::peripherals::MONITOR_LINES;
use crate::state::{Phase, StatusFlags, GENERAL_REGISTER_COUNT};

/// Everything a register panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuSnapshot {
    /// Program counter.
    pub pc: u16,
    /// Stack pointer.
    pub sp: u16,
    /// Instruction register.
    pub ir: u16,
    /// Address register.
    pub ar: u16,
    /// Data register.
    pub dr: u16,
    /// Status flags.
    pub flags: StatusFlags,
    /// General registers `R0..R15`.
    pub registers: [u16; GENERAL_REGISTER_COUNT],
    /// Name of the instruction in flight.
    pub instruction: String,
    /// Phase that ran last.
    pub phase_now: Phase,
    /// Phase to run next.
    pub phase_next: Phase,
    /// Latched illegal-instruction fault.
    pub fault: Option<Fault>,
    /// Instructions retired since reset.
    pub retired: u64,
}

impl CpuSnapshot {
    /// Copies the visible state of `cpu`.
    #[must_use]
    pub fn capture(cpu: &CentralProcessingUnit) -> Self {
        Self {
            pc: cpu.pc(),
            sp: cpu.sp(),
            ir: cpu.ir(),
            ar: cpu.ar(),
            dr: cpu.dr(),
            flags: cpu.flags(),
            registers: *cpu.registers(),
            instruction: cpu.instruction_name().to_owned(),
            phase_now: cpu.phase_now(),
            phase_next: cpu.phase_next(),
            fault: cpu.last_fault(),
            retired: cpu.retired(),
        }
    }
}

/// CPU, bus and device state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineSnapshot {
    /// CPU registers and phase.
    pub cpu: CpuSnapshot,
    /// Bus lines as the last phase left them.
    pub bus: SystemBus,
    /// Monitor lines, top first.
    pub monitor: [String; MONITOR_LINES],
    /// Key latched but not yet read.
    pub pending_key: u8,
    /// RAM size in bytes.
    pub ram_size: usize,
}

impl MachineSnapshot {
    /// Copies the visible state of `cpu` and `board`.
    #[must_use]
    pub fn capture(cpu: &CentralProcessingUnit, board: &Board) -> Self {
        Self {
            cpu: CpuSnapshot::capture(cpu),
            bus: board.bus,
            monitor: board.iod.lines().clone(),
            pending_key: board.iod.pending_key(),
            ram_size: board.memory.size(),
        }
    }
}
