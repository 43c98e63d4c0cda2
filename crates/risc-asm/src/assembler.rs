//! Top-level assembler pipeline.
//!
//! 1. **Pass 1**: every line is parsed and addresses are assigned, building
//!    the symbol table.
//! 2. **Pass 2**: statements are encoded with all labels known.
//!
//! The main entry point is [`assemble_source`]. [`Assembler`] plugs the same
//! pipeline into the simulator's program loader.

use risc_core::{to_hex_image, AssembledImage, ProgramAssembler};

use crate::encoder::{encode_statement, EncodeError};
use crate::parser::{parse_line, ParseError};
use crate::symbols::{assign_addresses, Assignment, SymbolError, SymbolTable};

/// Label the loader uses as the initial program counter.
pub const START_LABEL: &str = "START";

/// Assembly error with source location context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    /// Kind of error.
    pub kind: AssembleErrorKind,
    /// 1-indexed source line.
    pub line: usize,
}

/// Classification of assembly errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleErrorKind {
    /// Parse error.
    Parse(ParseError),
    /// Symbol table error.
    Symbol(SymbolError),
    /// Encoding error.
    Encode(EncodeError),
}

impl std::fmt::Display for AssembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            AssembleErrorKind::Parse(e) => write!(f, "line {}: parse error: {e}", self.line),
            AssembleErrorKind::Symbol(e) => write!(f, "line {}: {e}", self.line),
            AssembleErrorKind::Encode(e) => write!(f, "line {}: {e}", self.line),
        }
    }
}

impl std::error::Error for AssembleError {}

impl From<ParseError> for AssembleError {
    fn from(e: ParseError) -> Self {
        Self {
            line: e.line,
            kind: AssembleErrorKind::Parse(e),
        }
    }
}

impl From<SymbolError> for AssembleError {
    fn from(e: SymbolError) -> Self {
        Self {
            line: e.line,
            kind: AssembleErrorKind::Symbol(e),
        }
    }
}

impl From<EncodeError> for AssembleError {
    fn from(e: EncodeError) -> Self {
        Self {
            line: e.line,
            kind: AssembleErrorKind::Encode(e),
        }
    }
}

/// An entry in the address-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Address of this entry.
    pub address: u16,
    /// Bytes at this address.
    pub bytes: Vec<u8>,
    /// Source line text, trimmed.
    pub source: String,
    /// 1-indexed source line.
    pub line: usize,
}

/// A fully assembled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledProgram {
    /// Image bytes starting at address `0x0000`.
    pub bytes: Vec<u8>,
    /// All labels.
    pub symbols: SymbolTable,
    /// One entry per emitting line.
    pub listing: Vec<ListingEntry>,
    /// Address of the `START` label, if defined.
    pub start: Option<u16>,
}

impl AssembledProgram {
    /// Renders the image in the loader's hex format.
    #[must_use]
    pub fn to_hex_text(&self) -> String {
        to_hex_image(&self.bytes)
    }

    /// Renders the listing, one line per emitting source line.
    #[must_use]
    pub fn listing_text(&self) -> String {
        self.listing.iter().fold(String::new(), |mut out, entry| {
            let hex: Vec<String> = entry.bytes.iter().map(|b| format!("{b:02X}")).collect();
            out.push_str(&format!(
                "{:04X}: {:<12} {} ; line {}\n",
                entry.address,
                hex.join(" "),
                entry.source,
                entry.line
            ));
            out
        })
    }
}

/// Assembles source text into an image laid out from address `0x0000`.
///
/// # Errors
///
/// Returns the first [`AssembleError`] encountered, in source order for
/// parse errors.
pub fn assemble_source(source: &str) -> Result<AssembledProgram, AssembleError> {
    let parsed = source
        .lines()
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1).map(|parsed| (idx + 1, parsed)))
        .collect::<Result<Vec<_>, _>>()?;

    let assignment = assign_addresses(parsed)?;
    let (bytes, listing) = encode_pass2(&assignment, source)?;
    let start = assignment
        .symbols
        .get(START_LABEL)
        .map(|symbol| symbol.address);

    Ok(AssembledProgram {
        bytes,
        symbols: assignment.symbols,
        listing,
        start,
    })
}

fn encode_pass2(
    assignment: &Assignment,
    source: &str,
) -> Result<(Vec<u8>, Vec<ListingEntry>), EncodeError> {
    let source_lines: Vec<&str> = source.lines().collect();
    let mut bytes = Vec::with_capacity(usize::try_from(assignment.end_address).unwrap_or(0));
    let mut listing = Vec::new();

    for line in &assignment.lines {
        let Some(statement) = &line.parsed.statement else {
            continue;
        };
        let encoded = encode_statement(statement, &assignment.symbols, line.address, line.source_line)?;
        bytes.extend_from_slice(&encoded);
        listing.push(ListingEntry {
            address: line.address,
            bytes: encoded,
            source: source_lines
                .get(line.source_line - 1)
                .map_or_else(String::new, |text| text.trim().to_owned()),
            line: line.source_line,
        });
    }

    Ok((bytes, listing))
}

/// [`ProgramAssembler`] backed by this crate's two-pass pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler;

impl ProgramAssembler for Assembler {
    fn assemble(&self, source: &str) -> Result<AssembledImage, String> {
        let program = assemble_source(source).map_err(|e| e.to_string())?;
        Ok(AssembledImage {
            bytes: program.bytes,
            start: program.start,
        })
    }
}
