//! Assembly source line parser for instructions, labels, and directives.
//!
//! Converts raw source lines into structured [`ParsedLine`] items ready for
//! symbol table construction and encoding. Operands are checked against the
//! operand layout of the mnemonic here, so later passes only deal with
//! well-formed instructions.

use risc_core::{Mnemonic, OperandShape, GENERAL_REGISTER_COUNT};

/// A numeric literal or a label reference resolved in pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Literal number as written (range is checked by the encoder).
    Number(i64),
    /// Label reference.
    Label(String),
}

/// A parsed instruction with its register fields and optional operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// Resolved mnemonic.
    pub mnemonic: Mnemonic,
    /// `ra` register field (0 when unused).
    pub ra: u8,
    /// `rb` register field (0 when unused).
    pub rb: u8,
    /// Immediate, address, port or jump target.
    pub value: Option<Value>,
}

impl ParsedInstruction {
    /// Encoded size in bytes.
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.mnemonic.operands().size()
    }
}

/// A parsed data directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `WORD val` - emit a little-endian 16-bit value or label address.
    Word(Value),
    /// `BYTE val` - emit an 8-bit value.
    Byte(i64),
}

impl Directive {
    /// Encoded size in bytes.
    #[must_use]
    pub const fn size(&self) -> u16 {
        match self {
            Self::Word(_) => 2,
            Self::Byte(_) => 1,
        }
    }
}

/// What a line emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Data directive.
    Directive(Directive),
    /// Instruction.
    Instruction(ParsedInstruction),
}

/// A single parsed source line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLine {
    /// Label defined on this line.
    pub label: Option<String>,
    /// Instruction or directive following the label.
    pub statement: Option<Statement>,
}

impl ParsedLine {
    /// Encoded size in bytes.
    #[must_use]
    pub const fn size(&self) -> u16 {
        match &self.statement {
            None => 0,
            Some(Statement::Directive(directive)) => directive.size(),
            Some(Statement::Instruction(instruction)) => instruction.size(),
        }
    }
}

/// Parse error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-indexed line number.
    pub line: usize,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

/// Classification of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unknown mnemonic or directive.
    UnknownMnemonic(String),
    /// Invalid register name (not R0-R15).
    InvalidRegister(String),
    /// Malformed numeric literal or label.
    InvalidValue(String),
    /// Invalid label name before `:`.
    InvalidLabel(String),
    /// Operand provided where none expected.
    UnexpectedOperand(String),
    /// Required operand missing.
    MissingOperand,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMnemonic(m) => write!(f, "unknown mnemonic: {m}"),
            Self::InvalidRegister(r) => write!(f, "invalid register: {r}"),
            Self::InvalidValue(v) => write!(f, "invalid value: {v}"),
            Self::InvalidLabel(l) => write!(f, "invalid label: {l}"),
            Self::UnexpectedOperand(o) => write!(f, "unexpected operand: {o}"),
            Self::MissingOperand => write!(f, "missing operand"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result of parsing a single line.
pub type ParseResult = Result<ParsedLine, ParseError>;

/// Parses a source line into a [`ParsedLine`].
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown mnemonics, bad registers, malformed
/// values, or an operand count that does not match the mnemonic.
pub fn parse_line(line: &str, line_number: usize) -> ParseResult {
    let stripped = strip_comment(line);
    let mut rest = stripped.trim();
    let mut parsed = ParsedLine::default();

    if let Some((label, after)) = split_label(rest) {
        if !is_valid_label(label) {
            return Err(error(line_number, ParseErrorKind::InvalidLabel(label.to_owned())));
        }
        parsed.label = Some(label.to_owned());
        rest = after.trim();
    }

    if !rest.is_empty() {
        parsed.statement = Some(parse_statement(rest, line_number)?);
    }
    Ok(parsed)
}

const fn error(line: usize, kind: ParseErrorKind) -> ParseError {
    ParseError { line, kind }
}

/// Cuts the line at the first `;` outside a character literal.
fn strip_comment(line: &str) -> &str {
    let mut in_char = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            '\'' => in_char = !in_char,
            ';' if !in_char => return &line[..pos],
            _ => {}
        }
    }
    line
}

fn split_label(text: &str) -> Option<(&str, &str)> {
    let colon = text.find(':')?;
    if text[..colon].contains('\'') {
        return None;
    }
    Some((text[..colon].trim(), &text[colon + 1..]))
}

/// Labels start with a letter or `_` and continue with alphanumerics or `_`.
#[must_use]
pub fn is_valid_label(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_statement(text: &str, line_number: usize) -> Result<Statement, ParseError> {
    let tokens = tokenize(text);
    let Some((head, operands)) = tokens.split_first() else {
        return Err(error(line_number, ParseErrorKind::MissingOperand));
    };

    if head.eq_ignore_ascii_case("WORD") {
        let [value] = expect_operands::<1>(operands, line_number)?;
        return Ok(Statement::Directive(Directive::Word(parse_value(
            value,
            line_number,
        )?)));
    }
    if head.eq_ignore_ascii_case("BYTE") {
        let [value] = expect_operands::<1>(operands, line_number)?;
        return Ok(Statement::Directive(Directive::Byte(parse_number(value).ok_or_else(
            || error(line_number, ParseErrorKind::InvalidValue(value.clone())),
        )?)));
    }

    let mnemonic = Mnemonic::from_name(head)
        .ok_or_else(|| error(line_number, ParseErrorKind::UnknownMnemonic(head.clone())))?;
    parse_instruction(mnemonic, operands, line_number).map(Statement::Instruction)
}

fn parse_instruction(
    mnemonic: Mnemonic,
    operands: &[String],
    line_number: usize,
) -> Result<ParsedInstruction, ParseError> {
    let mut instruction = ParsedInstruction {
        mnemonic,
        ra: 0,
        rb: 0,
        value: None,
    };

    match mnemonic.operands() {
        OperandShape::None => {
            expect_operands::<0>(operands, line_number)?;
        }
        OperandShape::Ra => {
            let [ra] = expect_operands::<1>(operands, line_number)?;
            instruction.ra = parse_register(ra, line_number)?;
        }
        OperandShape::RaRb => {
            let [ra, rb] = expect_operands::<2>(operands, line_number)?;
            instruction.ra = parse_register(ra, line_number)?;
            instruction.rb = parse_register(rb, line_number)?;
        }
        OperandShape::RaImm16
        | OperandShape::RaImm8
        | OperandShape::RaAddr
        | OperandShape::RaPort => {
            let [ra, value] = expect_operands::<2>(operands, line_number)?;
            instruction.ra = parse_register(ra, line_number)?;
            instruction.value = Some(parse_value(value, line_number)?);
        }
        OperandShape::Port | OperandShape::Addr | OperandShape::Offset => {
            let [value] = expect_operands::<1>(operands, line_number)?;
            instruction.value = Some(parse_value(value, line_number)?);
        }
    }

    Ok(instruction)
}

fn expect_operands<const N: usize>(
    operands: &[String],
    line_number: usize,
) -> Result<&[String; N], ParseError> {
    if let Some(extra) = operands.get(N) {
        return Err(error(
            line_number,
            ParseErrorKind::UnexpectedOperand(extra.clone()),
        ));
    }
    operands
        .try_into()
        .map_err(|_| error(line_number, ParseErrorKind::MissingOperand))
}

/// Splits on whitespace and commas, keeping character literals intact.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_char = false;

    for ch in text.chars() {
        match ch {
            '\'' => {
                in_char = !in_char;
                current.push(ch);
            }
            ',' | ' ' | '\t' if !in_char => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

fn parse_register(s: &str, line_number: usize) -> Result<u8, ParseError> {
    s.strip_prefix(['R', 'r'])
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|&n| usize::from(n) < GENERAL_REGISTER_COUNT)
        .ok_or_else(|| error(line_number, ParseErrorKind::InvalidRegister(s.to_owned())))
}

fn parse_value(s: &str, line_number: usize) -> Result<Value, ParseError> {
    if let Some(number) = parse_number(s) {
        return Ok(Value::Number(number));
    }
    if is_valid_label(s) {
        return Ok(Value::Label(s.to_owned()));
    }
    Err(error(line_number, ParseErrorKind::InvalidValue(s.to_owned())))
}

/// Parses decimal (optionally signed), `0x`/`$` hex, `0b` binary, or a
/// `'c'` character literal.
#[must_use]
pub fn parse_number(s: &str) -> Option<i64> {
    if let Some(inner) = s.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        let mut chars = inner.chars();
        let ch = chars.next()?;
        return (chars.next().is_none() && ch.is_ascii()).then_some(i64::from(u32::from(ch)));
    }

    let (negative, magnitude) = s
        .strip_prefix('-')
        .map_or((false, s), |rest| (true, rest));

    let value = if let Some(hex) = magnitude
        .strip_prefix("0x")
        .or_else(|| magnitude.strip_prefix("0X"))
        .or_else(|| magnitude.strip_prefix('$'))
    {
        digits_in_radix(hex, 16)?
    } else if let Some(bin) = magnitude
        .strip_prefix("0b")
        .or_else(|| magnitude.strip_prefix("0B"))
    {
        digits_in_radix(bin, 2)?
    } else if !magnitude.is_empty() && magnitude.bytes().all(|b| b.is_ascii_digit()) {
        magnitude.parse::<i64>().ok()?
    } else {
        return None;
    };

    Some(if negative { -value } else { value })
}

fn digits_in_radix(digits: &str, radix: u32) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}
