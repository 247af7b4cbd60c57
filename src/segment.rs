//! 7-segment encoding
//!
//! Patterns are active-high with bit 0 = segment A through bit 6 = segment G.
//! The display registers are active-low, so patterns are complemented on the
//! way to the hardware ([`to_register`]) and back ([`from_register`]).

use crate::error::FpgaError;
use crate::regs::HEX_COUNT;

/// All segments off
pub const BLANK: u8 = 0;
/// Bits that drive a segment
pub const SEGMENT_MASK: u8 = 0x7F;

/// Largest number [`number_patterns`] can render
pub const MAX_NUMBER: u32 = 999_999;

const GLYPHS: [u8; 16] = [
    0b0111111, // 0
    0b0000110, // 1
    0b1011011, // 2
    0b1001111, // 3
    0b1100110, // 4
    0b1101101, // 5
    0b1111101, // 6
    0b0000111, // 7
    0b1111111, // 8
    0b1101111, // 9
    0b1110111, // A
    0b1111100, // b
    0b0111001, // C
    0b1011110, // d
    0b1111001, // E
    0b1110001, // F
];

/// Pattern for a decimal digit, all-off outside 0..=9
pub fn encode_digit(value: i32) -> u8 {
    checked_digit(value).unwrap_or(BLANK)
}

/// Pattern for a decimal digit, `None` outside 0..=9
pub fn checked_digit(value: i32) -> Option<u8> {
    if (0..=9).contains(&value) {
        Some(GLYPHS[value as usize])
    } else {
        None
    }
}

/// Pattern for a hexadecimal digit 0..=15
pub fn encode_hex(nibble: u8) -> Option<u8> {
    GLYPHS.get(nibble as usize).copied()
}

/// Register value that lights `pattern` on an active-low display
#[inline]
pub fn to_register(pattern: u8) -> u32 {
    !(pattern as u32)
}

/// Active-high pattern currently latched in a display register
#[inline]
pub fn from_register(raw: u32) -> u8 {
    (!raw as u8) & SEGMENT_MASK
}

/// Patterns rendering `number` right-aligned, index 0 = HEX0
///
/// Leading positions are blank; zero renders as a single `0`.
pub fn number_patterns(number: u32) -> Result<[u8; HEX_COUNT], FpgaError> {
    if number > MAX_NUMBER {
        return Err(FpgaError::NumberOutOfRange(number as i64));
    }

    let mut patterns = [BLANK; HEX_COUNT];
    let mut rest = number;
    for pattern in patterns.iter_mut() {
        *pattern = GLYPHS[(rest % 10) as usize];
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_table() {
        let expected = [
            0b0111111, 0b0000110, 0b1011011, 0b1001111, 0b1100110,
            0b1101101, 0b1111101, 0b0000111, 0b1111111, 0b1101111,
        ];
        for (value, pattern) in expected.into_iter().enumerate() {
            assert_eq!(encode_digit(value as i32), pattern, "digit {}", value);
        }
    }

    #[test]
    fn out_of_range_digits_are_blank() {
        for value in [-1, -9, 10, 15, i32::MIN, i32::MAX] {
            assert_eq!(encode_digit(value), BLANK);
            assert_eq!(checked_digit(value), None);
        }
    }

    #[test]
    fn hex_extends_decimal() {
        for value in 0..10u8 {
            assert_eq!(encode_hex(value), checked_digit(value as i32));
        }
        assert_eq!(encode_hex(0xA), Some(0b1110111));
        assert_eq!(encode_hex(0xF), Some(0b1110001));
        assert_eq!(encode_hex(16), None);
    }

    #[test]
    fn complement_is_self_inverse() {
        for value in 0..10 {
            let pattern = encode_digit(value);
            assert_eq!(from_register(to_register(pattern)), pattern);
            assert_eq!(!to_register(pattern), pattern as u32);
        }
        assert_eq!(to_register(encode_digit(0)), 0xFFFF_FFC0);
        assert_eq!(to_register(BLANK), 0xFFFF_FFFF);
    }

    #[test]
    fn numbers_are_right_aligned() {
        let p = number_patterns(4072).unwrap();
        assert_eq!(
            p,
            [GLYPHS[2], GLYPHS[7], GLYPHS[0], GLYPHS[4], BLANK, BLANK]
        );
        assert_eq!(number_patterns(0).unwrap(), [GLYPHS[0], BLANK, BLANK, BLANK, BLANK, BLANK]);
        assert_eq!(number_patterns(MAX_NUMBER).unwrap(), [GLYPHS[9]; HEX_COUNT]);
        assert!(matches!(
            number_patterns(1_000_000),
            Err(FpgaError::NumberOutOfRange(1_000_000))
        ));
    }
}
