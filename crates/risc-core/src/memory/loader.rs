//! Program image parsing and loading.
//!
//! Binary and hex images are text files holding one byte per line. Assembly
//! sources are handed to a [`ProgramAssembler`]; the result is written next
//! to the source as a hex image and then loaded like any other image.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::ADDRESS_SPACE_BYTES;
use crate::config::{InterpreterSettings, ProgramFormat, MAX_RAM_SIZE};
use crate::numeric::{binstr_to_u8, hexstr_to_u8, u8_to_hexstr};

/// Errors raised while reading a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The program file does not exist.
    #[error("program file `{}` not found", .path.display())]
    MissingFile {
        /// Resolved path that was looked up.
        path: PathBuf,
    },
    /// The program file (or generated hex file) could not be read or written.
    #[error("i/o error on `{}`: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A line is not a valid byte in the image format.
    #[error("line {line}: `{text}` is not a valid {format} byte")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Offending line, trimmed.
        text: String,
        /// Image format being parsed.
        format: ProgramFormat,
    },
    /// The image does not fit in RAM.
    #[error("image of {len} bytes does not fit in {capacity} bytes of RAM")]
    ImageTooLarge {
        /// Image length in bytes.
        len: usize,
        /// RAM size in bytes.
        capacity: usize,
    },
    /// An assembly source was given but no assembler is attached.
    #[error("no assembler available for assembly sources")]
    AssemblerUnavailable,
    /// The assembler rejected the source.
    #[error("assembly failed: {0}")]
    Assembly(String),
}

/// Output of a [`ProgramAssembler`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssembledImage {
    /// Encoded bytes, starting at address 0.
    pub bytes: Vec<u8>,
    /// Address of the `START` label, when the source defines one.
    pub start: Option<u16>,
}

/// Turns assembly source text into a memory image.
pub trait ProgramAssembler {
    /// Assembles `source`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message describing the first error.
    fn assemble(&self, source: &str) -> Result<AssembledImage, String>;
}

/// Fully validated image ready to be copied into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    /// Image bytes, starting at address 0.
    pub bytes: Vec<u8>,
    /// Effective RAM size in bytes.
    pub ram_size: u32,
    /// Effective start address.
    pub start: u16,
    /// Format the image was read in.
    pub format: ProgramFormat,
    /// Hex file written for an assembly source.
    pub hex_output: Option<PathBuf>,
}

impl ProgramImage {
    /// Summary of this image for callers and logs.
    #[must_use]
    pub fn report(&self) -> LoadReport {
        LoadReport {
            format: self.format,
            bytes: self.bytes.len(),
            ram_size: self.ram_size,
            start: self.start,
            hex_output: self.hex_output.clone(),
        }
    }
}

/// What a successful load did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Format the image was read in.
    pub format: ProgramFormat,
    /// Number of bytes loaded.
    pub bytes: usize,
    /// Effective RAM size in bytes.
    pub ram_size: u32,
    /// Effective start address.
    pub start: u16,
    /// Hex file written for an assembly source.
    pub hex_output: Option<PathBuf>,
}

/// Parses a binary or hex image. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`LoadError::MalformedLine`] for the first line that is not a byte
/// in `format`, and for any line at all when `format` is
/// [`ProgramFormat::Assembly`].
pub fn parse_image(text: &str, format: ProgramFormat) -> Result<Vec<u8>, LoadError> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line, trimmed)| {
            let byte = match format {
                ProgramFormat::Binary => binstr_to_u8(trimmed),
                ProgramFormat::Hex => hexstr_to_u8(trimmed),
                ProgramFormat::Assembly => None,
            };
            byte.ok_or_else(|| LoadError::MalformedLine {
                line,
                text: trimmed.to_owned(),
                format,
            })
        })
        .collect()
}

/// Renders bytes as a hex image: one upper-case byte per line.
#[must_use]
pub fn to_hex_image(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut out, &b| {
        out.push_str(&u8_to_hexstr(b));
        out.push('\n');
        out
    })
}

/// Reads and validates the program named by `settings` without touching memory.
///
/// # Errors
///
/// See [`LoadError`].
pub fn read_program(
    settings: &InterpreterSettings,
    assembler: Option<&dyn ProgramAssembler>,
) -> Result<ProgramImage, LoadError> {
    let path = settings.program_path();
    if !path.is_file() {
        return Err(LoadError::MissingFile { path });
    }
    let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;

    let image = match settings.format {
        ProgramFormat::Binary | ProgramFormat::Hex => ProgramImage {
            bytes: parse_image(&text, settings.format)?,
            ram_size: settings.ram_size,
            start: settings.start,
            format: settings.format,
            hex_output: None,
        },
        ProgramFormat::Assembly => {
            let assembler = assembler.ok_or(LoadError::AssemblerUnavailable)?;
            let assembled = assembler.assemble(&text).map_err(LoadError::Assembly)?;

            let hex_path = path.with_extension("hex");
            fs::write(&hex_path, to_hex_image(&assembled.bytes)).map_err(|source| {
                LoadError::Io {
                    path: hex_path.clone(),
                    source,
                }
            })?;

            ProgramImage {
                ram_size: assembled_ram_size(settings.ram_size, assembled.bytes.len()),
                start: assembled.start.unwrap_or(settings.start),
                bytes: assembled.bytes,
                format: ProgramFormat::Assembly,
                hex_output: Some(hex_path),
            }
        }
    };

    let capacity = usize::try_from(image.ram_size).unwrap_or(ADDRESS_SPACE_BYTES);
    if image.bytes.len() > capacity {
        return Err(LoadError::ImageTooLarge {
            len: image.bytes.len(),
            capacity,
        });
    }
    Ok(image)
}

/// RAM needed for an assembled program: at least `configured`, at least the
/// image length, rounded up to an even size and capped at the address space.
fn assembled_ram_size(configured: u32, len: usize) -> u32 {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    let size = configured.max(len);
    size.saturating_add(size & 1).min(MAX_RAM_SIZE)
}

#[cfg(test)]
mod tests {
    use super::{assembled_ram_size, parse_image, to_hex_image, LoadError};
    use crate::config::ProgramFormat;

    #[test]
    fn hex_image_parses_one_byte_per_line() {
        let bytes = parse_image("10\n00\n\n34\r\n12\n", ProgramFormat::Hex).expect("valid");
        assert_eq!(bytes, vec![0x10, 0x00, 0x34, 0x12]);
    }

    #[test]
    fn binary_image_parses_one_byte_per_line() {
        let bytes = parse_image("00010000\n  00000000  \n11111111", ProgramFormat::Binary)
            .expect("valid");
        assert_eq!(bytes, vec![0x10, 0x00, 0xFF]);
    }

    #[test]
    fn malformed_line_reports_position() {
        let err = parse_image("10\nZZ\n", ProgramFormat::Hex).expect_err("bad line");
        match err {
            LoadError::MalformedLine { line, text, format } => {
                assert_eq!(line, 2);
                assert_eq!(text, "ZZ");
                assert_eq!(format, ProgramFormat::Hex);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse_image("0101", ProgramFormat::Binary).is_err());
    }

    #[test]
    fn hex_image_text_roundtrips() {
        let bytes = vec![0x00, 0xAB, 0x7F];
        assert_eq!(to_hex_image(&bytes), "00\nAB\n7F\n");
        assert_eq!(
            parse_image(&to_hex_image(&bytes), ProgramFormat::Hex).expect("valid"),
            bytes
        );
    }

    #[test]
    fn assembled_ram_grows_to_fit_and_stays_even() {
        assert_eq!(assembled_ram_size(0x1000, 10), 0x1000);
        assert_eq!(assembled_ram_size(4, 9), 10);
        assert_eq!(assembled_ram_size(4, 8), 8);
        assert_eq!(assembled_ram_size(0x1_0000, 0x2_0000), 0x1_0000);
    }
}
