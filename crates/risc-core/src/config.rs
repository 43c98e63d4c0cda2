//! Interpreter settings handed to the machine on construction and reload.

use std::fmt;
use std::path::{Path, PathBuf};

/// Default RAM size in bytes.
pub const DEFAULT_RAM_SIZE: u32 = 0x1000;
/// Smallest RAM the machine accepts (one word).
pub const MIN_RAM_SIZE: u32 = 2;
/// Largest RAM the machine accepts (the full 16-bit address space).
pub const MAX_RAM_SIZE: u32 = 0x1_0000;
/// Directory program files are resolved against by default.
pub const DEFAULT_BINARIES_ROOT: &str = "binaries";

/// On-disk program image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProgramFormat {
    /// One 8-character `0`/`1` string per line.
    Binary,
    /// One 2-character hex string per line.
    #[default]
    Hex,
    /// Assembly source, assembled to a hex image before loading.
    Assembly,
}

impl ProgramFormat {
    /// Infers the format from a file extension (`.bin`/`.txt`, `.hex`, `.asm`/`.s`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_name(ext)
    }

    /// Parses a format name or extension, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bin" | "binary" | "txt" => Some(Self::Binary),
            "hex" => Some(Self::Hex),
            "asm" | "assembly" | "s" => Some(Self::Assembly),
            _ => None,
        }
    }
}

impl fmt::Display for ProgramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Hex => "hex",
            Self::Assembly => "assembly",
        })
    }
}

/// Program file, RAM size and start address for one simulation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InterpreterSettings {
    /// Program file, relative to `binaries_root` unless absolute.
    pub file: PathBuf,
    /// Directory program files are resolved against.
    pub binaries_root: PathBuf,
    /// RAM size in bytes.
    pub ram_size: u32,
    /// Initial program counter.
    pub start: u16,
    /// Image format of `file`.
    pub format: ProgramFormat,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("program.hex"),
            binaries_root: PathBuf::from(DEFAULT_BINARIES_ROOT),
            ram_size: DEFAULT_RAM_SIZE,
            start: 0,
            format: ProgramFormat::Hex,
        }
    }
}

impl InterpreterSettings {
    /// Settings for `file` with its format inferred from the extension.
    #[must_use]
    pub fn for_file(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let format = ProgramFormat::from_path(&file).unwrap_or_default();
        Self {
            file,
            format,
            ..Self::default()
        }
    }

    /// Full path of the program file.
    #[must_use]
    pub fn program_path(&self) -> PathBuf {
        self.binaries_root.join(&self.file)
    }

    /// Clamps the settings into values the machine can honour.
    ///
    /// RAM is forced into `2..=65536` bytes and rounded down to an even size;
    /// a start address outside RAM falls back to `0`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.ram_size = self.ram_size.clamp(MIN_RAM_SIZE, MAX_RAM_SIZE) & !1;
        if u32::from(self.start) >= self.ram_size {
            self.start = 0;
        }
        self
    }

    /// Initial stack pointer: the last word of RAM.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn initial_sp(&self) -> u16 {
        self.ram_size.saturating_sub(2) as u16
    }
}
