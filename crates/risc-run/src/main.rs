//! CLI entry point for the `risc-run` binary.

use std::io;
use std::process;

use clap::Parser;
use risc_asm as _;
use risc_core as _;
use risc_run::{execute, init_tracing, Cli, StopReason};
use serde_json as _;
use tracing as _;
use tracing_subscriber as _;
#[cfg(test)]
use tempfile as _;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.trace) {
        eprintln!("error: invalid RUST_LOG: {e}");
        process::exit(1);
    }

    let exit_code = match execute(&cli, &mut io::stdout().lock()) {
        Ok(report) => match report.stop {
            Some(StopReason::Faulted(_)) => 2,
            _ => 0,
        },
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    };

    process::exit(exit_code);
}
