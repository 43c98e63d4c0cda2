//! Phase, instruction and free-run cadences over a [`Machine`].
//!
//! The core only exposes the four phase calls; everything that decides how
//! often to call them lives here.

use std::collections::VecDeque;
use std::fmt;

use risc_core::{disassemble_one, Fault, Machine, Phase};
use tracing::{debug, trace};

/// Why a driver stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The CPU executed `HLT`.
    Halted,
    /// The CPU latched a fault.
    Faulted(Option<Fault>),
    /// The step budget ran out first.
    StepLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Halted => f.write_str("halted"),
            Self::Faulted(Some(fault)) => write!(f, "fault: {fault}"),
            Self::Faulted(None) => f.write_str("fault"),
            Self::StepLimit => f.write_str("step limit reached"),
        }
    }
}

/// Work done by one driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Phase calls that did something.
    pub phases: u64,
    /// Instructions that completed their execute phase.
    pub instructions: u64,
    /// Set when the machine is stalled or the budget is spent.
    pub stop: Option<StopReason>,
}

impl StepReport {
    /// Adds `other`'s counts and adopts its stop reason.
    pub const fn absorb(&mut self, other: Self) {
        self.phases += other.phases;
        self.instructions += other.instructions;
        self.stop = other.stop;
    }
}

/// Stop reason for a stalled CPU, `None` while it can still step.
#[must_use]
pub const fn stop_reason(machine: &Machine) -> Option<StopReason> {
    match machine.cpu().phase_next() {
        Phase::Halted => Some(StopReason::Halted),
        Phase::Fault => Some(StopReason::Faulted(machine.cpu().last_fault())),
        Phase::Fetch | Phase::Decode | Phase::OperandFetch | Phase::Execute => None,
    }
}

/// Runs the single phase selected by `phase_next`.
pub fn step_phase(machine: &mut Machine) -> StepReport {
    let phase = machine.cpu().phase_next();
    match phase {
        Phase::Fetch => machine.fetch_instruction(),
        Phase::Decode => machine.decode_instruction(),
        Phase::OperandFetch => machine.fetch_operand(),
        Phase::Execute => machine.execute_instruction(),
        Phase::Halted | Phase::Fault => {
            return StepReport {
                stop: stop_reason(machine),
                ..StepReport::default()
            };
        }
    }

    trace!(phase = phase.label(), pc = machine.cpu().pc(), "phase done");
    StepReport {
        phases: 1,
        instructions: u64::from(phase == Phase::Execute),
        stop: stop_reason(machine),
    }
}

/// Runs phases until the current instruction has executed.
///
/// From a fresh fetch this is IF, ID, OF when the instruction needs it, then
/// IE. Called mid-instruction it finishes the instruction in flight.
pub fn step_instruction(machine: &mut Machine) -> StepReport {
    if machine.cpu().phase_next() == Phase::Fetch {
        let pc = machine.cpu().pc();
        if let Some(row) = disassemble_one(pc, machine.board().memory.cells()) {
            trace!(pc, instruction = %row.text(), "instruction");
        }
    }

    let mut report = StepReport::default();
    loop {
        let step = step_phase(machine);
        report.absorb(step);
        if step.phases == 0 || step.instructions > 0 || step.stop.is_some() {
            return report;
        }
    }
}

/// Runs whole instructions until the machine stalls or `max_instructions`
/// have completed, feeding `keys` between instructions.
pub fn run(machine: &mut Machine, max_instructions: u64, keys: &mut KeyFeed) -> StepReport {
    let mut report = StepReport::default();
    while report.instructions < max_instructions {
        keys.feed(machine);
        report.absorb(step_instruction(machine));
        if report.stop.is_some() {
            debug!(
                instructions = report.instructions,
                phases = report.phases,
                "machine stopped"
            );
            return report;
        }
    }
    report.stop = stop_reason(machine).or(Some(StopReason::StepLimit));
    report
}

/// Queue of key codes typed into the machine one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFeed {
    pending: VecDeque<u8>,
}

impl KeyFeed {
    /// Queues `keys` in order.
    pub fn new(keys: impl IntoIterator<Item = u8>) -> Self {
        Self {
            pending: keys.into_iter().collect(),
        }
    }

    /// Keys not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Latches the next key once the program has read the previous one.
    pub fn feed(&mut self, machine: &mut Machine) -> Option<u8> {
        if machine.board().iod.pending_key() != 0 {
            return None;
        }
        let key = self.pending.pop_front()?;
        machine.input(key);
        debug!(key, "key fed");
        Some(key)
    }
}
