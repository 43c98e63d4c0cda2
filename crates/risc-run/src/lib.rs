//! Headless driver for the 16-bit RISC teaching machine.
//!
//! Builds a [`Machine`] from command-line options, steps it at the chosen
//! cadence while feeding keys, and reports the monitor and register state.

use std::io::{self, Write};

use risc_asm::Assembler;
use risc_core::{Machine, Phase};

/// Command-line options and logging setup.
pub mod cli;
/// Phase, instruction and free-run cadences.
pub mod driver;
/// Text and JSON output.
pub mod render;

pub use cli::{init_tracing, Cadence, Cli, FormatArg};
pub use driver::{run, step_instruction, step_phase, KeyFeed, StepReport, StopReason};

use render::{instruction_line, phase_line, render_json, render_text};

/// Runs the session described by `cli`, writing step lines and the final
/// report to `out`.
///
/// Per-step lines are suppressed with `--json` so the output stays a single
/// JSON document.
///
/// # Errors
///
/// Returns an error when writing to `out` fails.
pub fn execute(cli: &Cli, out: &mut impl Write) -> io::Result<StepReport> {
    let mut machine = Machine::with_assembler(cli.settings(), Box::new(Assembler));
    let mut keys = KeyFeed::new(cli.key_codes());

    let report = match cli.cadence {
        Cadence::Run => run(&mut machine, cli.max_steps, &mut keys),
        Cadence::Instruction => by_instruction(&mut machine, cli, &mut keys, out)?,
        Cadence::Phase => by_phase(&mut machine, cli, &mut keys, out)?,
    };

    if cli.json {
        writeln!(out, "{}", render_json(&machine, &report)?)?;
    } else {
        write!(out, "{}", render_text(&machine, &report))?;
    }
    Ok(report)
}

fn by_instruction(
    machine: &mut Machine,
    cli: &Cli,
    keys: &mut KeyFeed,
    out: &mut impl Write,
) -> io::Result<StepReport> {
    let mut report = StepReport::default();
    while report.instructions < cli.max_steps {
        keys.feed(machine);
        let line = instruction_line(machine, machine.cpu().pc());
        let step = step_instruction(machine);
        report.absorb(step);
        if step.phases > 0 && !cli.json {
            writeln!(out, "{line}")?;
        }
        if report.stop.is_some() {
            return Ok(report);
        }
    }
    report.stop = Some(StopReason::StepLimit);
    Ok(report)
}

fn by_phase(
    machine: &mut Machine,
    cli: &Cli,
    keys: &mut KeyFeed,
    out: &mut impl Write,
) -> io::Result<StepReport> {
    let mut report = StepReport::default();
    while report.phases < cli.max_steps {
        let phase = machine.cpu().phase_next();
        if phase == Phase::Fetch {
            keys.feed(machine);
        }
        let step = step_phase(machine);
        report.absorb(step);
        if step.phases > 0 && !cli.json {
            writeln!(out, "{}", phase_line(machine, phase))?;
        }
        if report.stop.is_some() {
            return Ok(report);
        }
    }
    report.stop = Some(StopReason::StepLimit);
    Ok(report)
}
