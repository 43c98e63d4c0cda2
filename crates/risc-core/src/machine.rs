//! Composition of the CPU with the devices it drives.
//!
//! [`Board`] owns everything on the far side of the system bus. [`Machine`]
//! pairs a board with a CPU and the settings they were reset from, and
//! performs the full reload sequence.

use std::fmt;

use crate::bus::SystemBus;
use crate::config::InterpreterSettings;
use crate::cpu::CentralProcessingUnit;
use crate::memory::{CentralMemory, LoadReport, ProgramAssembler};
use crate::peripherals::{InputOutputDevices, MONITOR_LINES};
use crate::snapshot::MachineSnapshot;

/// The bus and the two slaves hanging off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Shared address/data/control lines.
    pub bus: SystemBus,
    /// Main memory.
    pub memory: CentralMemory,
    /// Monitor and keyboard.
    pub iod: InputOutputDevices,
}

impl Board {
    /// Creates an idle bus, `ram_size` bytes of zeroed memory and blank devices.
    #[must_use]
    pub fn new(ram_size: usize) -> Self {
        Self {
            bus: SystemBus::new(),
            memory: CentralMemory::new(ram_size),
            iod: InputOutputDevices::new(),
        }
    }
}

/// CPU, board and the effective settings of the last reload.
pub struct Machine {
    cpu: CentralProcessingUnit,
    board: Board,
    settings: InterpreterSettings,
    assembler: Option<Box<dyn ProgramAssembler>>,
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("cpu", &self.cpu)
            .field("board", &self.board)
            .field("settings", &self.settings)
            .field("assembler", &self.assembler.is_some())
            .finish()
    }
}

impl Machine {
    /// Builds a machine without an assembler and loads `settings`.
    ///
    /// Assembly sources fail to load (and are logged) on such a machine.
    #[must_use]
    pub fn new(settings: InterpreterSettings) -> Self {
        Self::build(settings, None)
    }

    /// Builds a machine that can load assembly sources through `assembler`.
    #[must_use]
    pub fn with_assembler(
        settings: InterpreterSettings,
        assembler: Box<dyn ProgramAssembler>,
    ) -> Self {
        Self::build(settings, Some(assembler))
    }

    fn build(settings: InterpreterSettings, assembler: Option<Box<dyn ProgramAssembler>>) -> Self {
        let settings = settings.normalized();
        let mut machine = Self {
            cpu: CentralProcessingUnit::new(&settings),
            board: Board::new(ram_bytes(&settings)),
            settings: settings.clone(),
            assembler,
        };
        machine.reload(settings);
        machine
    }

    /// Reloads the program and resets every component.
    ///
    /// Never fails: when the program cannot be loaded the failure is logged
    /// and the machine comes up over zeroed memory. Returns what was loaded.
    pub fn reload(&mut self, settings: InterpreterSettings) -> Option<LoadReport> {
        let mut effective = settings.normalized();
        self.board.memory.reset(ram_bytes(&effective));

        let report = self
            .board
            .memory
            .load_program_or_warn(&effective, self.assembler.as_deref());
        if let Some(report) = &report {
            effective.ram_size = report.ram_size;
            effective.start = report.start;
            effective.format = report.format;
        }

        self.board.iod.reset();
        self.board.bus.reset_bus();
        self.cpu.reset(&effective);
        self.settings = effective;
        report
    }

    /// Runs instruction fetch.
    pub fn fetch_instruction(&mut self) {
        self.cpu.fetch_instruction(&mut self.board);
    }

    /// Runs instruction decode.
    pub fn decode_instruction(&mut self) {
        self.cpu.decode_instruction(&mut self.board);
    }

    /// Runs operand fetch.
    pub fn fetch_operand(&mut self) {
        self.cpu.fetch_operand(&mut self.board);
    }

    /// Runs instruction execute.
    pub fn execute_instruction(&mut self) {
        self.cpu.execute_instruction(&mut self.board);
    }

    /// Latches a key from the host keyboard.
    pub const fn input(&mut self, key: u8) {
        self.board.iod.input(key);
    }

    /// Monitor lines, top first.
    #[must_use]
    pub const fn lines(&self) -> &[String; MONITOR_LINES] {
        self.board.iod.lines()
    }

    /// The CPU.
    #[must_use]
    pub const fn cpu(&self) -> &CentralProcessingUnit {
        &self.cpu
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for hosts that poke memory directly.
    pub const fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Settings the machine was last reset from, after normalization and
    /// any adjustment made by the loader.
    #[must_use]
    pub const fn settings(&self) -> &InterpreterSettings {
        &self.settings
    }

    /// Copies the visible state for display.
    #[must_use]
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot::capture(&self.cpu, &self.board)
    }
}

fn ram_bytes(settings: &InterpreterSettings) -> usize {
    usize::try_from(settings.ram_size).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::Machine;
    use crate::config::{InterpreterSettings, ProgramFormat};
    use crate::memory::{AssembledImage, ProgramAssembler};
    use crate::state::Phase;

    fn settings_in(dir: &tempfile::TempDir, file: &str) -> InterpreterSettings {
        InterpreterSettings {
            binaries_root: dir.path().to_path_buf(),
            ram_size: 0x100,
            ..InterpreterSettings::for_file(file)
        }
    }

    #[test]
    fn missing_program_leaves_zeroed_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let machine = Machine::new(settings_in(&dir, "absent.hex"));
        assert_eq!(machine.board().memory.size(), 0x100);
        assert!(machine.board().memory.cells().iter().all(|&b| b == 0));
        assert_eq!(machine.cpu().phases(), (Phase::Execute, Phase::Fetch));
        assert_eq!(machine.cpu().sp(), 0xFE);
    }

    #[test]
    fn reload_resets_every_component() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("p.hex"), "00\n10\n41\n00\n00\nCF\n").expect("write");
        let mut machine = Machine::new(settings_in(&dir, "p.hex"));
        assert_eq!(machine.board().memory.get(2), 0x41);

        machine.input(b'k');
        machine.fetch_instruction();
        assert_eq!(machine.cpu().pc(), 2);

        let report = machine.reload(settings_in(&dir, "p.hex")).expect("loaded");
        assert_eq!(report.bytes, 6);
        assert_eq!(machine.cpu().pc(), 0);
        assert_eq!(machine.board().iod.pending_key(), 0);
        assert_eq!(machine.board().bus.get_data(), 0);
        assert_eq!(machine.settings().format, ProgramFormat::Hex);
    }

    struct FixedAssembler;

    impl ProgramAssembler for FixedAssembler {
        fn assemble(&self, _source: &str) -> Result<AssembledImage, String> {
            Ok(AssembledImage {
                bytes: vec![0x00, 0xCF],
                start: Some(0),
            })
        }
    }

    #[test]
    fn assembly_programs_go_through_the_assembler() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("p.asm"), "START: HLT\n").expect("write");

        let machine = Machine::with_assembler(settings_in(&dir, "p.asm"), Box::new(FixedAssembler));
        assert_eq!(machine.board().memory.get_word(0), 0xCF00);
        assert!(dir.path().join("p.hex").is_file());

        let plain = Machine::new(settings_in(&dir, "p.asm"));
        assert_eq!(plain.board().memory.get_word(0), 0);
    }

    #[test]
    fn settings_are_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = InterpreterSettings {
            ram_size: 7,
            start: 0x40,
            ..settings_in(&dir, "absent.hex")
        };
        let machine = Machine::new(settings);
        assert_eq!(machine.settings().ram_size, 6);
        assert_eq!(machine.settings().start, 0);
        assert_eq!(machine.cpu().sp(), 4);
    }
}
