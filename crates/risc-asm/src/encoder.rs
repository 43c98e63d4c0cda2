//! Pass-2 encoding of instructions and directives into bytes.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use risc_core::OperandShape;

use crate::parser::{Directive, ParsedInstruction, Statement, Value};
use crate::symbols::SymbolTable;

/// Pass-2 error with source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    /// 1-indexed line number.
    pub line: usize,
    /// Kind of encoding error.
    pub kind: EncodeErrorKind,
}

/// Classification of pass-2 errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// Label referenced but never defined.
    UndefinedLabel(String),
    /// Literal does not fit the operand width.
    ValueOutOfRange {
        /// Literal as parsed.
        value: i64,
        /// Operand width in bits.
        bits: u8,
    },
    /// Relative jump target farther than a signed byte can reach.
    JumpOutOfRange {
        /// Target label.
        label: String,
        /// Distance from the following instruction.
        distance: i32,
    },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            EncodeErrorKind::UndefinedLabel(name) => write!(f, "undefined label `{name}`"),
            EncodeErrorKind::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} does not fit in {bits} bits")
            }
            EncodeErrorKind::JumpOutOfRange { label, distance } => write!(
                f,
                "jump to `{label}` is {distance} bytes away (limit -128..127)"
            ),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Encodes one statement placed at `address`.
///
/// # Errors
///
/// Returns an [`EncodeError`] for undefined labels or values that do not fit
/// their operand.
pub fn encode_statement(
    statement: &Statement,
    symbols: &SymbolTable,
    address: u16,
    line: usize,
) -> Result<Vec<u8>, EncodeError> {
    let resolver = Resolver { symbols, line };
    match statement {
        Statement::Directive(Directive::Word(value)) => {
            Ok(resolver.word(value)?.to_le_bytes().to_vec())
        }
        Statement::Directive(Directive::Byte(value)) => Ok(vec![resolver.byte(*value)?]),
        Statement::Instruction(instruction) => {
            encode_instruction(instruction, &resolver, address)
        }
    }
}

fn encode_instruction(
    instruction: &ParsedInstruction,
    resolver: &Resolver<'_>,
    address: u16,
) -> Result<Vec<u8>, EncodeError> {
    let mnemonic = instruction.mnemonic;
    let registers = (instruction.ra << 4) | (instruction.rb & 0xF);
    let mut bytes = Vec::with_capacity(usize::from(instruction.size()));

    let low = match (mnemonic.operands(), &instruction.value) {
        (OperandShape::Offset, Some(value)) => resolver.offset(value, address)?,
        _ => registers,
    };
    bytes.extend_from_slice(&(mnemonic.opcode_word() | u16::from(low)).to_le_bytes());

    match (mnemonic.operands(), &instruction.value) {
        (OperandShape::RaImm8, Some(Value::Number(n))) => bytes.push(resolver.byte(*n)?),
        (OperandShape::RaImm8, Some(Value::Label(name))) => {
            bytes.push(resolver.byte(i64::from(resolver.address_of(name)?))?);
        }
        (
            OperandShape::RaImm16
            | OperandShape::RaAddr
            | OperandShape::RaPort
            | OperandShape::Port
            | OperandShape::Addr,
            Some(value),
        ) => bytes.extend_from_slice(&resolver.word(value)?.to_le_bytes()),
        _ => {}
    }

    Ok(bytes)
}

struct Resolver<'a> {
    symbols: &'a SymbolTable,
    line: usize,
}

impl Resolver<'_> {
    fn address_of(&self, name: &str) -> Result<u16, EncodeError> {
        self.symbols
            .get(name)
            .map(|symbol| symbol.address)
            .ok_or_else(|| self.error(EncodeErrorKind::UndefinedLabel(name.to_owned())))
    }

    fn word(&self, value: &Value) -> Result<u16, EncodeError> {
        match value {
            Value::Label(name) => self.address_of(name),
            Value::Number(n) if (-0x8000..=0xFFFF).contains(n) => Ok(*n as u16),
            Value::Number(n) => Err(self.out_of_range(*n, 16)),
        }
    }

    fn byte(&self, n: i64) -> Result<u8, EncodeError> {
        if (-0x80..=0xFF).contains(&n) {
            Ok(n as u8)
        } else {
            Err(self.out_of_range(n, 8))
        }
    }

    /// Literal offsets are taken as written; labels are measured from the
    /// instruction after the jump.
    fn offset(&self, value: &Value, address: u16) -> Result<u8, EncodeError> {
        match value {
            Value::Number(n) if (-0x80..=0x7F).contains(n) => Ok(*n as u8),
            Value::Number(n) => Err(self.out_of_range(*n, 8)),
            Value::Label(name) => {
                let target = i32::from(self.address_of(name)?);
                let distance = target - (i32::from(address) + 2);
                i8::try_from(distance).map(|d| d as u8).map_err(|_| {
                    self.error(EncodeErrorKind::JumpOutOfRange {
                        label: name.clone(),
                        distance,
                    })
                })
            }
        }
    }

    const fn out_of_range(&self, value: i64, bits: u8) -> EncodeError {
        self.error(EncodeErrorKind::ValueOutOfRange { value, bits })
    }

    const fn error(&self, kind: EncodeErrorKind) -> EncodeError {
        EncodeError {
            line: self.line,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;
    use crate::symbols::Symbol;
    use risc_core::Mnemonic;

    fn symbols(entries: &[(&str, u16)]) -> SymbolTable {
        entries
            .iter()
            .map(|&(name, address)| {
                (
                    name.to_owned(),
                    Symbol {
                        address,
                        defined_at: 1,
                    },
                )
            })
            .collect()
    }

    fn encode(line: &str, table: &SymbolTable, address: u16) -> Result<Vec<u8>, EncodeError> {
        let statement = parse_line(line, 7)
            .expect("parses")
            .statement
            .expect("statement");
        encode_statement(&statement, table, address, 7)
    }

    fn opcode(mnemonic: Mnemonic, low: u8) -> [u8; 2] {
        (mnemonic.opcode_word() | u16::from(low)).to_le_bytes()
    }

    #[test]
    fn register_fields_pack_ra_high_rb_low() {
        let bytes = encode("ADD R1, R2", &SymbolTable::new(), 0).expect("encodes");
        assert_eq!(bytes, opcode(Mnemonic::Add, 0x12));
    }

    #[test]
    fn immediates_follow_little_endian() {
        let bytes = encode("LDWI R3, 0x1234", &SymbolTable::new(), 0).expect("encodes");
        assert_eq!(&bytes[..2], &opcode(Mnemonic::Ldwi, 0x30));
        assert_eq!(&bytes[2..], &[0x34, 0x12]);

        let bytes = encode("LDBI R0, -1", &SymbolTable::new(), 0).expect("encodes");
        assert_eq!(bytes.len(), 3);
        assert_eq!(bytes[2], 0xFF);
    }

    #[test]
    fn labels_resolve_to_absolute_words() {
        let table = symbols(&[("sub", 0x0120)]);
        let bytes = encode("CALL sub", &table, 0).expect("encodes");
        assert_eq!(&bytes[2..], &[0x20, 0x01]);

        let bytes = encode("WORD sub", &table, 0).expect("encodes");
        assert_eq!(bytes, vec![0x20, 0x01]);
    }

    #[test]
    fn relative_jumps_measure_from_the_next_instruction() {
        let table = symbols(&[("loop", 0x0000), ("skip", 0x0010)]);
        let back = encode("JMPNZ loop", &table, 0x0004).expect("encodes");
        assert_eq!(back, opcode(Mnemonic::Jmpnz, 0xFA));

        let forward = encode("JMP skip", &table, 0x0004).expect("encodes");
        assert_eq!(forward, opcode(Mnemonic::Jmp, 0x0A));

        let literal = encode("JMP -4", &table, 0x0004).expect("encodes");
        assert_eq!(literal, opcode(Mnemonic::Jmp, 0xFC));
    }

    #[test]
    fn errors_carry_the_source_line() {
        let error = encode("JMP nowhere", &SymbolTable::new(), 0).expect_err("undefined");
        assert_eq!(error.line, 7);
        assert_eq!(error.kind, EncodeErrorKind::UndefinedLabel("nowhere".into()));

        let table = symbols(&[("far", 0x0200)]);
        let error = encode("JMP far", &table, 0).expect_err("too far");
        assert_eq!(
            error.kind,
            EncodeErrorKind::JumpOutOfRange {
                label: "far".into(),
                distance: 0x1FE
            }
        );

        let error = encode("BYTE 256", &SymbolTable::new(), 0).expect_err("byte");
        assert_eq!(
            error.kind,
            EncodeErrorKind::ValueOutOfRange { value: 256, bits: 8 }
        );
        assert_eq!(error.to_string(), "value 256 does not fit in 8 bits");
    }
}
