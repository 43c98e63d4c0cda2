//! CLI entry point for the `risc-asm` binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use risc_asm::{assemble_source, AssembledProgram};
use risc_core as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: risc-asm <command> [options]

Commands:
  build <input> [-o <output>] [--verbose]  Assemble source to a hex image

Options:
  -o, --output <file>  Output file path (default: input stem + .hex)
  -v, --verbose        Print listing to stderr
  -h, --help           Show this help message

Examples:
  risc-asm build echo.asm
  risc-asm build echo.asm -o binaries/echo.hex
";

#[derive(Debug, PartialEq, Eq)]
struct BuildArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Build(BuildArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let command = args.next().ok_or_else(|| "missing command".to_string())?;
    match command.to_string_lossy().as_ref() {
        "-h" | "--help" => Ok(ParseResult::Help),
        "build" => parse_build_args(args).map(ParseResult::Build),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_build_args(mut args: impl Iterator<Item = OsString>) -> Result<BuildArgs, String> {
    let mut input = None;
    let mut output = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.to_string_lossy().as_ref() {
            "-h" | "--help" => return Err(USAGE_TEXT.to_string()),
            "-v" | "--verbose" => verbose = true,
            "-o" | "--output" => {
                let path = args.next().ok_or("missing value for -o")?;
                output = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option: {flag}")),
            _ if input.is_some() => return Err("multiple input paths provided".to_string()),
            _ => input = Some(PathBuf::from(&arg)),
        }
    }

    Ok(BuildArgs {
        input: input.ok_or("missing input path")?,
        output,
        verbose,
    })
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("hex")
}

fn run_build(args: BuildArgs) -> Result<(), i32> {
    let source = fs::read_to_string(&args.input).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", args.input.display());
        1
    })?;

    let program = assemble_source(&source).map_err(|e| {
        eprintln!("{}: error: {e}", args.input.display());
        1
    })?;

    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    if let Err(e) = fs::write(&output_path, program.to_hex_text()) {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }

    if args.verbose {
        print_listing(&program);
    }

    println!(
        "Assembled {} ({} bytes) -> {}",
        args.input.display(),
        program.bytes.len(),
        output_path.display()
    );

    Ok(())
}

fn print_listing(program: &AssembledProgram) {
    eprint!("{}", program.listing_text());
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Build(args)) => match run_build(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_command() {
        let result = parse_build_args(
            [
                OsString::from("program.asm"),
                OsString::from("-o"),
                OsString::from("out.hex"),
                OsString::from("--verbose"),
            ]
            .into_iter(),
        )
        .expect("valid build args should parse");

        assert_eq!(
            result,
            BuildArgs {
                input: PathBuf::from("program.asm"),
                output: Some(PathBuf::from("out.hex")),
                verbose: true,
            }
        );
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args([OsString::from("--help")].into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args([OsString::from("test")].into_iter())
            .expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn default_output_path_replaces_extension() {
        assert_eq!(
            default_output_path(&PathBuf::from("src/echo.asm")),
            PathBuf::from("src/echo.hex")
        );
        assert_eq!(
            default_output_path(&PathBuf::from("program")),
            PathBuf::from("program.hex")
        );
    }

    #[test]
    fn parse_build_missing_input() {
        let error = parse_build_args(std::iter::empty()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));
    }

    #[test]
    fn parse_build_rejects_unknown_option() {
        let error = parse_build_args([OsString::from("--fast")].into_iter())
            .expect_err("unknown option should fail");
        assert!(error.contains("unknown option"));
    }
}
