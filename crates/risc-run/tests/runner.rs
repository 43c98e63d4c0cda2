//! End-to-end runs of assembly and hex programs through the runner.

use std::fs;
use std::path::Path;
use std::process::Command;

use clap::Parser;
use risc_asm as _;
use risc_core::{to_hex_image, Mnemonic};
use risc_run::{execute, Cli, StopReason};
use tempfile::TempDir;
use tracing as _;
use tracing_subscriber as _;

const ECHO: &str = "\
START:
wait:   TSTI 1
        JMPZ wait
        INB R0, 1
        LDBI R1, '.'
        SUB R0, R1          ; R1 = '.' - key
        JMPZ done
        OUTB R0, 0
        JMP wait
done:   HLT
";

fn cli(dir: &TempDir, args: &[&str]) -> Cli {
    let root = dir.path().to_str().expect("utf-8 path");
    Cli::try_parse_from(
        ["risc-run", "--root", root]
            .into_iter()
            .chain(args.iter().copied()),
    )
    .expect("valid arguments")
}

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).expect("write program");
}

#[test]
fn echo_program_prints_keys_until_the_terminator() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "echo.asm", ECHO);

    let mut out = Vec::new();
    let report = execute(&cli(&dir, &["echo.asm", "--keys", "hi."]), &mut out).expect("runs");

    assert_eq!(report.stop, Some(StopReason::Halted));
    let text = String::from_utf8(out).expect("utf-8");
    assert!(text.contains("|hi                  |"));
    assert!(text.contains("stopped: halted"));
    assert!(dir.path().join("echo.hex").exists());
}

#[test]
fn instruction_cadence_prints_disassembly() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "count.asm", "LDBI R0, 2\nloop: DEC R0\nJMPNZ loop\nHLT\n");

    let mut out = Vec::new();
    let report =
        execute(&cli(&dir, &["count.asm", "--cadence", "instruction"]), &mut out).expect("runs");

    assert_eq!(report.instructions, 6);
    let text = String::from_utf8(out).expect("utf-8");
    let lines: Vec<&str> = text.lines().take(6).collect();
    assert_eq!(
        lines,
        vec![
            "0000: LDBI R0, 0x02",
            "0003: DEC R0",
            "0005: JMPNZ -4",
            "0003: DEC R0",
            "0005: JMPNZ -4",
            "0007: HLT",
        ]
    );
}

#[test]
fn phase_cadence_stops_at_the_budget() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spin = (Mnemonic::Jmp.opcode_word() | 0xFE).to_le_bytes();
    write(dir.path(), "spin.hex", &to_hex_image(&spin));

    let mut out = Vec::new();
    let report = execute(
        &cli(&dir, &["spin.hex", "--cadence", "phase", "--max-steps", "7"]),
        &mut out,
    )
    .expect("runs");

    assert_eq!(report.phases, 7);
    assert_eq!(report.stop, Some(StopReason::StepLimit));
    let text = String::from_utf8(out).expect("utf-8");
    let phases: Vec<&str> = text
        .lines()
        .take(7)
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(phases, vec!["IF", "ID", "IE", "IF", "ID", "IE", "IF"]);
}

#[test]
fn missing_program_runs_over_zeroed_memory_and_faults() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut out = Vec::new();
    let report = execute(&cli(&dir, &["absent.hex"]), &mut out).expect("runs");

    assert!(matches!(report.stop, Some(StopReason::Faulted(Some(_)))));
    assert!(String::from_utf8(out).expect("utf-8").contains("illegal instruction"));
}

#[test]
fn json_output_is_a_single_snapshot_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "halt.asm", "LDWI R3, 0xBEEF\nHLT\n");

    let output = Command::new(env!("CARGO_BIN_EXE_risc-run"))
        .args([
            "--root",
            dir.path().to_str().expect("utf-8 path"),
            "halt.asm",
            "--cadence",
            "instruction",
            "--json",
        ])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run risc-run");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["stop"], "halted");
    assert_eq!(value["instructions"], 2);
    assert_eq!(value["machine"]["cpu"]["registers"][3], 0xBEEF);
    assert_eq!(value["machine"]["ram_size"], 0x1000);
}

#[test]
fn fault_sets_a_nonzero_exit_status() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "bad.hex", "00\n0F\n");

    let status = Command::new(env!("CARGO_BIN_EXE_risc-run"))
        .args(["--root", dir.path().to_str().expect("utf-8 path"), "bad.hex"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run risc-run")
        .status;

    assert_eq!(status.code(), Some(2));
}
