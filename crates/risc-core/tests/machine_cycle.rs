//! Instruction-cycle behavior of a fully assembled machine, driven one
//! phase at a time the way a host would.

use std::fs;
use std::path::Path;

use proptest as _;
use risc_core::{
    to_hex_image, ControlSignal, InterpreterSettings, Machine, Mnemonic, Phase, SystemBus,
    KEYBOARD_PORT, MONITOR_PORT,
};
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use tempfile::TempDir;
use thiserror as _;
use tracing as _;

fn word(mnemonic: Mnemonic, low: u8) -> [u8; 2] {
    (mnemonic.opcode_word() | u16::from(low)).to_le_bytes()
}

fn machine_with(dir: &TempDir, program: &[&[u8]]) -> Machine {
    let bytes = program.concat();
    write_hex(dir.path(), "program.hex", &bytes);
    Machine::new(InterpreterSettings {
        binaries_root: dir.path().to_path_buf(),
        ram_size: 0x200,
        ..InterpreterSettings::default()
    })
}

fn write_hex(root: &Path, name: &str, bytes: &[u8]) {
    fs::write(root.join(name), to_hex_image(bytes)).expect("write program");
}

fn step(machine: &mut Machine) -> Phase {
    match machine.cpu().phase_next() {
        Phase::Fetch => machine.fetch_instruction(),
        Phase::Decode => machine.decode_instruction(),
        Phase::OperandFetch => machine.fetch_operand(),
        Phase::Execute => machine.execute_instruction(),
        Phase::Halted | Phase::Fault => {}
    }
    machine.cpu().phase_now()
}

fn run_to_stop(machine: &mut Machine) {
    for _ in 0..1_000 {
        if machine.cpu().is_stalled() {
            return;
        }
        step(machine);
    }
    panic!("machine did not stop");
}

#[test]
fn ldwi_walks_all_four_phases() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut machine = machine_with(&dir, &[&word(Mnemonic::Ldwi, 0x00), &[0x34, 0x12]]);

    let phases: Vec<Phase> = (0..4).map(|_| step(&mut machine)).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Fetch,
            Phase::Decode,
            Phase::OperandFetch,
            Phase::Execute
        ]
    );

    let cpu = machine.cpu();
    assert_eq!(cpu.register(0), 0x1234);
    assert_eq!(cpu.pc(), 4);
    assert!(!cpu.flags().zero);
    assert!(!cpu.flags().negative);
    assert_eq!(cpu.phase_next(), Phase::Fetch);
}

#[test]
fn push_then_pop_restores_sp() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut machine = machine_with(
        &dir,
        &[
            &word(Mnemonic::Ldwi, 0x00),
            &[0xEF, 0xBE],
            &word(Mnemonic::Push, 0x00),
            &word(Mnemonic::Pop, 0x10),
            &word(Mnemonic::Hlt, 0x00),
        ],
    );
    let sp = machine.cpu().sp();

    run_to_stop(&mut machine);

    assert_eq!(machine.cpu().register(1), 0xBEEF);
    assert_eq!(machine.cpu().sp(), sp);
    assert_eq!(machine.board().memory.get_word(sp), 0xBEEF);
    assert_eq!(machine.cpu().phase_next(), Phase::Halted);
}

#[test]
fn unknown_triple_faults_after_execute() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut machine = machine_with(&dir, &[&[0x00, 0x0F]]);

    step(&mut machine);
    step(&mut machine);
    assert_eq!(machine.cpu().phase_next(), Phase::Execute);
    assert_eq!(machine.cpu().instruction_name(), "ERR!");

    step(&mut machine);
    assert_eq!(machine.cpu().phase_next(), Phase::Fault);
    assert_eq!(machine.cpu().phase_next().as_u8(), 0xFF);

    let snapshot = machine.snapshot();
    step(&mut machine);
    assert_eq!(machine.snapshot(), snapshot);
}

#[test]
fn zeroed_memory_executes_as_illegal_words() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut machine = Machine::new(InterpreterSettings {
        binaries_root: dir.path().to_path_buf(),
        ..InterpreterSettings::for_file("missing.hex")
    });
    run_to_stop(&mut machine);
    assert_eq!(machine.cpu().phase_next(), Phase::Fault);
    assert_eq!(machine.cpu().pc(), 2);
}

#[test]
fn echo_program_copies_keys_to_the_monitor() {
    let dir = tempfile::tempdir().expect("tempdir");
    let keyboard = KEYBOARD_PORT.to_le_bytes();
    let monitor = MONITOR_PORT.to_le_bytes();
    let mut machine = machine_with(
        &dir,
        &[
            &word(Mnemonic::Tsti, 0x00),
            &keyboard,
            &word(Mnemonic::Jmpz, 0xFA),
            &word(Mnemonic::Inb, 0x00),
            &keyboard,
            &word(Mnemonic::Outb, 0x00),
            &monitor,
            &word(Mnemonic::Hlt, 0x00),
        ],
    );

    for _ in 0..20 {
        step(&mut machine);
    }
    assert!(!machine.cpu().is_stalled());
    assert!(machine.lines()[0].is_empty());

    machine.input(b'#');
    run_to_stop(&mut machine);
    assert_eq!(machine.lines()[0], "#");
    assert_eq!(machine.cpu().phase_next(), Phase::Halted);
}

#[rstest]
#[case(Mnemonic::Tsto, MONITOR_PORT, false)]
#[case(Mnemonic::Tsto, KEYBOARD_PORT, true)]
#[case(Mnemonic::Tsti, KEYBOARD_PORT, true)]
fn port_tests_set_zero_when_not_ready(
    #[case] test: Mnemonic,
    #[case] port: u16,
    #[case] zero: bool,
) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut machine = machine_with(
        &dir,
        &[&word(test, 0x00), &port.to_le_bytes(), &word(Mnemonic::Hlt, 0)],
    );
    run_to_stop(&mut machine);
    assert_eq!(machine.cpu().flags().zero, zero);
}

#[test]
fn bus_reads_are_peeks_until_cleared() {
    let mut bus = SystemBus::new();
    bus.issue(0x0010, 0xBEEF, ControlSignal::memory_write(true));
    assert_eq!(bus.get_data(), 0xBEEF);
    assert_eq!(bus.get_data(), 0xBEEF);
    assert_eq!(bus.get_address(), 0x0010);

    bus.reset_bus();
    assert_eq!(bus, SystemBus::new());
}

#[test]
fn snapshot_tracks_the_phase_pair() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut machine = machine_with(&dir, &[&word(Mnemonic::Hlt, 0)]);
    let before = machine.snapshot();
    assert_eq!(before.cpu.phase_now, Phase::Execute);
    assert_eq!(before.cpu.phase_next, Phase::Fetch);
    assert_eq!(before.ram_size, 0x200);

    step(&mut machine);
    let after = machine.snapshot();
    assert_eq!(after.cpu.ir, 0xCF00);
    assert_eq!(after.cpu.instruction, "-----");
    assert_eq!(after.bus.get_address(), 0);
}
