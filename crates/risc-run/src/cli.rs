//! Command-line options and logging setup.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use risc_core::{InterpreterSettings, ProgramFormat, DEFAULT_BINARIES_ROOT, DEFAULT_RAM_SIZE};
use tracing_subscriber::prelude::*;

const ABOUT: &str = "Headless runner for the 16-bit RISC teaching machine";

/// Runs a program image on the simulator and prints the final machine state.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about = ABOUT, long_about = None)]
pub struct Cli {
    /// Program file, resolved against `--root` unless absolute.
    pub file: PathBuf,

    /// Directory program files are resolved against.
    #[arg(long, default_value = DEFAULT_BINARIES_ROOT)]
    pub root: PathBuf,

    /// RAM size in bytes (decimal or 0x hex).
    #[arg(long, default_value_t = DEFAULT_RAM_SIZE, value_parser = parse_u32)]
    pub ram_size: u32,

    /// Initial program counter (decimal or 0x hex).
    #[arg(long, default_value_t = 0, value_parser = parse_u16)]
    pub start: u16,

    /// Image format; inferred from the extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// How the machine is stepped and reported.
    #[arg(long, value_enum, default_value_t = Cadence::Run)]
    pub cadence: Cadence,

    /// Budget in phases (`phase` cadence) or instructions (otherwise).
    #[arg(long, default_value_t = 100_000)]
    pub max_steps: u64,

    /// Keys typed into the keyboard port; `\n`, `\r` and `\\` are escapes.
    #[arg(long, default_value = "")]
    pub keys: String,

    /// Log every phase and instruction (`RUST_LOG` still wins).
    #[arg(long)]
    pub trace: bool,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    pub json: bool,
}

/// `--format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// `0`/`1` text, one byte per line.
    Bin,
    /// Hex text, one byte per line.
    Hex,
    /// Assembly source.
    Asm,
}

impl From<FormatArg> for ProgramFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Bin => Self::Binary,
            FormatArg::Hex => Self::Hex,
            FormatArg::Asm => Self::Assembly,
        }
    }
}

/// `--cadence` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Cadence {
    /// One line per phase call.
    Phase,
    /// One line per instruction.
    Instruction,
    /// Free-run, final state only.
    Run,
}

impl Cli {
    /// Interpreter settings described by the options.
    #[must_use]
    pub fn settings(&self) -> InterpreterSettings {
        let format = self
            .format
            .map(ProgramFormat::from)
            .or_else(|| ProgramFormat::from_path(&self.file))
            .unwrap_or_default();
        InterpreterSettings {
            file: self.file.clone(),
            binaries_root: self.root.clone(),
            ram_size: self.ram_size,
            start: self.start,
            format,
        }
    }

    /// Key codes from `--keys` with escapes resolved.
    #[must_use]
    pub fn key_codes(&self) -> Vec<u8> {
        unescape_keys(&self.keys)
    }
}

fn unescape_keys(text: &str) -> Vec<u8> {
    let mut keys = Vec::with_capacity(text.len());
    let mut bytes = text.bytes();
    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            keys.push(byte);
            continue;
        }
        match bytes.next() {
            Some(b'n') => keys.push(b'\n'),
            Some(b'r') => keys.push(b'\r'),
            Some(other) => keys.push(other),
            None => keys.push(b'\\'),
        }
    }
    keys
}

fn parse_u32(text: &str) -> Result<u32, String> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid number `{text}`: {e}"))
}

fn parse_u16(text: &str) -> Result<u16, String> {
    let value = parse_u32(text)?;
    u16::try_from(value).map_err(|_| format!("`{text}` does not fit in 16 bits"))
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` selects what is printed; without it the level is `info`, or
/// `trace` when `trace` is set.
///
/// # Errors
///
/// Returns an error when `RUST_LOG` cannot be parsed.
pub fn init_tracing(trace: bool) -> Result<(), tracing_subscriber::filter::ParseError> {
    let fallback = if trace { "trace" } else { "info" };
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}
