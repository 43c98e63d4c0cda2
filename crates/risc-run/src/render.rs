//! Text and JSON views of a stopped machine.

use std::fmt::Write as _;

use risc_core::{disassemble_one, Machine, Phase, StatusFlags, MONITOR_COLUMNS};

use crate::driver::StepReport;

/// `ZNCV` with `-` for clear flags.
#[must_use]
pub fn flag_string(flags: StatusFlags) -> String {
    [
        (flags.zero, 'Z'),
        (flags.negative, 'N'),
        (flags.carry, 'C'),
        (flags.overflow, 'V'),
    ]
    .iter()
    .map(|&(set, name)| if set { name } else { '-' })
    .collect()
}

/// One line describing the phase that just ran.
#[must_use]
pub fn phase_line(machine: &Machine, phase: Phase) -> String {
    let cpu = machine.cpu();
    format!(
        "{:<5} PC={:04X} IR={:04X} {:<5} next={}",
        phase.label(),
        cpu.pc(),
        cpu.ir(),
        cpu.instruction_name(),
        cpu.phase_next()
    )
}

/// The instruction at `pc`, disassembled, or `????` past the end of RAM.
#[must_use]
pub fn instruction_line(machine: &Machine, pc: u16) -> String {
    let text = disassemble_one(pc, machine.board().memory.cells())
        .map_or_else(|| "????".to_owned(), |row| row.text());
    format!("{pc:04X}: {text}")
}

/// Monitor frame, registers and stop reason.
#[must_use]
pub fn render_text(machine: &Machine, report: &StepReport) -> String {
    let cpu = machine.cpu();
    let border = "-".repeat(MONITOR_COLUMNS);
    let mut out = String::new();

    let _ = writeln!(out, "+{border}+");
    for line in machine.lines() {
        let _ = writeln!(out, "|{line:<MONITOR_COLUMNS$}|");
    }
    let _ = writeln!(out, "+{border}+");

    let _ = writeln!(
        out,
        "PC={:04X} SP={:04X} FLAGS={} IR={:04X}",
        cpu.pc(),
        cpu.sp(),
        flag_string(cpu.flags()),
        cpu.ir()
    );
    for (row, chunk) in cpu.registers().chunks(4).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, value)| format!("R{:<2}={value:04X}", row * 4 + col))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" "));
    }

    let stop = report
        .stop
        .map_or_else(|| "running".to_owned(), |reason| reason.to_string());
    let _ = writeln!(
        out,
        "stopped: {stop} after {} instructions ({} phases)",
        report.instructions, report.phases
    );
    out
}

/// Snapshot plus run totals as pretty-printed JSON.
///
/// # Errors
///
/// Returns a serialization error from `serde_json`.
pub fn render_json(machine: &Machine, report: &StepReport) -> serde_json::Result<String> {
    let value = serde_json::json!({
        "stop": report.stop.map(|reason| reason.to_string()),
        "instructions": report.instructions,
        "phases": report.phases,
        "machine": serde_json::to_value(machine.snapshot())?,
    });
    serde_json::to_string_pretty(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_print_in_zncv_order() {
        let flags = StatusFlags {
            zero: true,
            negative: false,
            carry: true,
            overflow: false,
        };
        assert_eq!(flag_string(flags), "Z-C-");
        assert_eq!(flag_string(StatusFlags::default()), "----");
    }
}
