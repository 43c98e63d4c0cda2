//! Symbol table and pass-1 address assignment.

use std::collections::HashMap;

use crate::parser::ParsedLine;

/// A resolved label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Byte address the label refers to.
    pub address: u16,
    /// 1-indexed line of the definition.
    pub defined_at: usize,
}

/// Label name to symbol.
pub type SymbolTable = HashMap<String, Symbol>;

/// Pass-1 error with source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolError {
    /// 1-indexed line number.
    pub line: usize,
    /// Kind of symbol error.
    pub kind: SymbolErrorKind,
}

/// Classification of pass-1 errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolErrorKind {
    /// Label defined twice.
    DuplicateLabel {
        /// Label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// Program runs past the 64 KiB address space.
    AddressOverflow,
}

impl std::fmt::Display for SymbolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            SymbolErrorKind::DuplicateLabel {
                name,
                first_definition,
            } => write!(
                f,
                "duplicate label `{name}` (first defined on line {first_definition})"
            ),
            SymbolErrorKind::AddressOverflow => {
                write!(f, "program exceeds the 64 KiB address space")
            }
        }
    }
}

impl std::error::Error for SymbolError {}

/// A parsed line with its assigned address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedLine {
    /// Address of the first emitted byte.
    pub address: u16,
    /// Emitted size in bytes.
    pub size: u16,
    /// Parsed content.
    pub parsed: ParsedLine,
    /// 1-indexed source line.
    pub source_line: usize,
}

/// Output of pass 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Lines in source order.
    pub lines: Vec<AddressedLine>,
    /// Every label defined in the program.
    pub symbols: SymbolTable,
    /// One past the last emitted byte.
    pub end_address: u32,
}

/// Assigns addresses to parsed lines and collects labels.
///
/// Programs are always laid out from address `0x0000`.
///
/// # Errors
///
/// Returns a [`SymbolError`] on duplicate labels or when the image would
/// not fit in the address space.
pub fn assign_addresses(
    parsed: impl IntoIterator<Item = (usize, ParsedLine)>,
) -> Result<Assignment, SymbolError> {
    let mut lines = Vec::new();
    let mut symbols = SymbolTable::new();
    let mut cursor: u32 = 0;

    for (source_line, line) in parsed {
        let size = line.size();
        let end = cursor + u32::from(size);
        if end > 0x1_0000 || (line.label.is_some() && cursor > 0xFFFF) {
            return Err(SymbolError {
                line: source_line,
                kind: SymbolErrorKind::AddressOverflow,
            });
        }
        let address = u16::try_from(cursor).unwrap_or(u16::MAX);

        if let Some(name) = &line.label {
            if let Some(existing) = symbols.get(name) {
                return Err(SymbolError {
                    line: source_line,
                    kind: SymbolErrorKind::DuplicateLabel {
                        name: name.clone(),
                        first_definition: existing.defined_at,
                    },
                });
            }
            symbols.insert(
                name.clone(),
                Symbol {
                    address,
                    defined_at: source_line,
                },
            );
        }
        cursor = end;

        lines.push(AddressedLine {
            address,
            size,
            parsed: line,
            source_line,
        });
    }

    Ok(Assignment {
        lines,
        symbols,
        end_address: cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn parse_all(source: &str) -> Vec<(usize, ParsedLine)> {
        source
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, parse_line(line, idx + 1).expect("parses")))
            .collect()
    }

    #[test]
    fn labels_take_the_address_of_the_next_byte() {
        let assignment =
            assign_addresses(parse_all("LDWI R0, 1\nloop:\n  INC R0\nend: HLT\nBYTE 1\n"))
                .expect("assigns");

        assert_eq!(assignment.symbols["loop"].address, 4);
        assert_eq!(assignment.symbols["end"].address, 6);
        assert_eq!(assignment.symbols["end"].defined_at, 4);
        assert_eq!(assignment.end_address, 9);
        assert_eq!(assignment.lines[4].address, 8);
        assert_eq!(assignment.lines[4].size, 1);
    }

    #[test]
    fn duplicate_label_reports_both_lines() {
        let error = assign_addresses(parse_all("a: HLT\n\na: HLT\n")).expect_err("duplicate");
        assert_eq!(error.line, 3);
        assert_eq!(
            error.kind,
            SymbolErrorKind::DuplicateLabel {
                name: "a".into(),
                first_definition: 1
            }
        );
    }

    #[test]
    fn image_past_the_address_space_overflows() {
        let source = "WORD 0\n".repeat(0x8000) + "BYTE 1\n";
        let error = assign_addresses(parse_all(&source)).expect_err("overflow");
        assert_eq!(error.kind, SymbolErrorKind::AddressOverflow);
        assert_eq!(error.line, 0x8001);
    }
}
