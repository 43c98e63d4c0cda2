//! Numeric text conversions and bit-level helpers shared by the loader,
//! the ALU, and the display layer.

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

const fn hex_digit_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parses an 8-character `0`/`1` string, most-significant bit first.
///
/// Returns `None` unless the input is exactly eight binary digits.
#[must_use]
pub fn binstr_to_u8(s: &str) -> Option<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 8 {
        return None;
    }

    bytes.iter().try_fold(0u8, |acc, &c| match c {
        b'0' => Some(acc << 1),
        b'1' => Some((acc << 1) | 1),
        _ => None,
    })
}

/// Formats a byte as an 8-character binary string, most-significant bit first.
#[must_use]
pub fn u8_to_binstr(value: u8) -> String {
    format!("{value:08b}")
}

/// Parses a 2-character hex string (case-insensitive).
#[must_use]
pub fn hexstr_to_u8(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [hi, lo] => Some((hex_digit_value(*hi)? << 4) | hex_digit_value(*lo)?),
        _ => None,
    }
}

/// Formats a byte as two upper-case hex digits.
#[must_use]
pub fn u8_to_hexstr(value: u8) -> String {
    let hi = HEX_DIGITS[usize::from(value >> 4)];
    let lo = HEX_DIGITS[usize::from(value & 0x0F)];
    String::from_utf8_lossy(&[hi, lo]).into_owned()
}

/// Parses a 4-character hex string (case-insensitive) into a word.
#[must_use]
pub fn hexstr_to_u16(s: &str) -> Option<u16> {
    if s.len() != 4 || !s.is_ascii() {
        return None;
    }
    let hi = hexstr_to_u8(&s[..2])?;
    let lo = hexstr_to_u8(&s[2..])?;
    Some(u16::from_be_bytes([hi, lo]))
}

/// Formats a word as four upper-case hex digits.
#[must_use]
pub fn u16_to_hexstr(value: u16) -> String {
    let [hi, lo] = value.to_be_bytes();
    u8_to_hexstr(hi) + &u8_to_hexstr(lo)
}

/// Bit-level 16-bit two's complement.
///
/// Inverts every bit and then adds one by rippling a carry from bit 0
/// upwards, the way an adder would. The carry out of bit 15 is discarded,
/// so `twos_complement(0) == 0` and the function is an involution.
#[must_use]
pub const fn twos_complement(value: u16) -> u16 {
    let inverted = !value;
    let mut result = 0u16;
    let mut carry = 1u16;
    let mut bit = 0;
    while bit < 16 {
        let a = (inverted >> bit) & 1;
        result |= (a ^ carry) << bit;
        carry &= a;
        bit += 1;
    }
    result
}

/// Sign-extends the 8-bit relative offset of a control-group instruction.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn sign_extend_offset(offset: u8) -> u16 {
    offset as i8 as i16 as u16
}

/// Returns `true` when the sign bit of a 16-bit word is set.
#[must_use]
pub const fn is_negative(value: u16) -> bool {
    value & 0x8000 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binstr_parses_msb_first() {
        assert_eq!(binstr_to_u8("00000000"), Some(0x00));
        assert_eq!(binstr_to_u8("10000001"), Some(0x81));
        assert_eq!(binstr_to_u8("11111111"), Some(0xFF));
        assert_eq!(binstr_to_u8("01000001"), Some(b'A'));
    }

    #[test]
    fn binstr_rejects_wrong_length_and_digits() {
        assert_eq!(binstr_to_u8(""), None);
        assert_eq!(binstr_to_u8("0101"), None);
        assert_eq!(binstr_to_u8("010000011"), None);
        assert_eq!(binstr_to_u8("0100002x"), None);
    }

    #[test]
    fn binstr_round_trips_every_byte() {
        for n in 0..=u8::MAX {
            assert_eq!(binstr_to_u8(&u8_to_binstr(n)), Some(n));
        }
    }

    #[test]
    fn hexstr_is_case_insensitive() {
        assert_eq!(hexstr_to_u8("ff"), Some(0xFF));
        assert_eq!(hexstr_to_u8("FF"), Some(0xFF));
        assert_eq!(hexstr_to_u8("aB"), Some(0xAB));
        assert_eq!(hexstr_to_u8("0g"), None);
        assert_eq!(hexstr_to_u8("123"), None);
    }

    #[test]
    fn hexstr_round_trips_every_byte() {
        for n in 0..=u8::MAX {
            let text = u8_to_hexstr(n);
            assert_eq!(text.len(), 2);
            assert_eq!(hexstr_to_u8(&text), Some(n));
        }
    }

    #[test]
    fn word_hexstr_round_trips_boundaries() {
        for n in [0x0000u16, 0x0001, 0x00FF, 0x1234, 0x8000, 0xBEEF, 0xFFFF] {
            assert_eq!(hexstr_to_u16(&u16_to_hexstr(n)), Some(n));
        }
        assert_eq!(u16_to_hexstr(0x1234), "1234");
        assert_eq!(hexstr_to_u16("beef"), Some(0xBEEF));
        assert_eq!(hexstr_to_u16("12"), None);
    }

    #[test]
    fn twos_complement_matches_wrapping_negation() {
        assert_eq!(twos_complement(0), 0);
        assert_eq!(twos_complement(1), 0xFFFF);
        assert_eq!(twos_complement(0x8000), 0x8000);
        assert_eq!(twos_complement(0x7FFF), 0x8001);
        for n in (0..=u16::MAX).step_by(97) {
            assert_eq!(twos_complement(n), n.wrapping_neg());
            assert_eq!(twos_complement(twos_complement(n)), n);
        }
    }

    #[test]
    fn offset_sign_extension() {
        assert_eq!(sign_extend_offset(0x00), 0x0000);
        assert_eq!(sign_extend_offset(0x7F), 0x007F);
        assert_eq!(sign_extend_offset(0x80), 0xFF80);
        assert_eq!(sign_extend_offset(0xFE), 0xFFFE);
    }
}
