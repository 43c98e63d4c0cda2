/// Status-register bit for zero result.
pub const FLAGS_Z: u8 = 1 << 0;
/// Status-register bit for negative result.
pub const FLAGS_N: u8 = 1 << 1;
/// Status-register bit for carry/borrow.
pub const FLAGS_C: u8 = 1 << 2;
/// Status-register bit for signed overflow.
pub const FLAGS_V: u8 = 1 << 3;

/// Zero/negative/carry/overflow status flags.
///
/// Flags persist across instructions until an ALU operation or a flag-setting
/// load/test overwrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusFlags {
    /// Result was zero.
    pub zero: bool,
    /// Result had its sign bit set.
    pub negative: bool,
    /// Unsigned carry out (or borrow, for subtraction).
    pub carry: bool,
    /// Signed overflow.
    pub overflow: bool,
}

impl StatusFlags {
    /// Builds the full flag set for an arithmetic result.
    #[must_use]
    pub const fn from_result(result: u16, carry: bool, overflow: bool) -> Self {
        Self {
            zero: result == 0,
            negative: (result & 0x8000) != 0,
            carry,
            overflow,
        }
    }

    /// Updates only `Z` and `N` from a loaded value, leaving `C`/`V` intact.
    pub const fn set_zero_negative(&mut self, value: u16) {
        self.zero = value == 0;
        self.negative = (value & 0x8000) != 0;
    }

    /// Packs the flags into the `ZNCV` bit layout.
    #[must_use]
    pub const fn bits(self) -> u8 {
        let mut bits = 0;
        if self.zero {
            bits |= FLAGS_Z;
        }
        if self.negative {
            bits |= FLAGS_N;
        }
        if self.carry {
            bits |= FLAGS_C;
        }
        if self.overflow {
            bits |= FLAGS_V;
        }
        bits
    }

    /// Unpacks flags from the `ZNCV` bit layout; unknown bits are ignored.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            zero: bits & FLAGS_Z != 0,
            negative: bits & FLAGS_N != 0,
            carry: bits & FLAGS_C != 0,
            overflow: bits & FLAGS_V != 0,
        }
    }
}

impl std::fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pick = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            pick(self.zero, 'Z'),
            pick(self.negative, 'N'),
            pick(self.carry, 'C'),
            pick(self.overflow, 'V')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusFlags, FLAGS_C, FLAGS_N, FLAGS_V, FLAGS_Z};

    #[test]
    fn flag_bits_are_distinct() {
        let all = [FLAGS_Z, FLAGS_N, FLAGS_C, FLAGS_V];
        for (i, a) in all.iter().enumerate() {
            assert_eq!(a.count_ones(), 1);
            for b in &all[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
    }

    #[test]
    fn bits_roundtrip_for_all_combinations() {
        for bits in 0u8..16 {
            assert_eq!(StatusFlags::from_bits(bits).bits(), bits);
        }
        assert_eq!(StatusFlags::from_bits(0xF0), StatusFlags::default());
    }

    #[test]
    fn from_result_derives_zero_and_negative() {
        let flags = StatusFlags::from_result(0, true, false);
        assert!(flags.zero && !flags.negative && flags.carry && !flags.overflow);

        let flags = StatusFlags::from_result(0x8001, false, true);
        assert!(!flags.zero && flags.negative && !flags.carry && flags.overflow);
    }

    #[test]
    fn set_zero_negative_preserves_carry_and_overflow() {
        let mut flags = StatusFlags::from_bits(FLAGS_C | FLAGS_V | FLAGS_Z);
        flags.set_zero_negative(0xFFFF);
        assert_eq!(flags.bits(), FLAGS_C | FLAGS_V | FLAGS_N);
    }

    #[test]
    fn display_shows_set_flags_by_letter() {
        assert_eq!(StatusFlags::default().to_string(), "----");
        assert_eq!(StatusFlags::from_bits(FLAGS_Z | FLAGS_V).to_string(), "Z--V");
    }
}
