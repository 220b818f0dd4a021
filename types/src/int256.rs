//! Signed 256-bit integers with EVM `int256` semantics.
//!
//! Values are stored as their two's-complement bit pattern in a [`U256`], which
//! makes the 32-byte big-endian wire word a direct copy of the representation:
//! a negative `v` is carried as `v + 2^256`.
//!
//! Arithmetic is checked the way solidity `>=0.8` checks it: any result outside
//! `[-2^255, 2^255 - 1]` is reported as overflow instead of wrapping, so the
//! off-chain and on-chain ledgers reject the same transfers.

use primitive_types::U256;
use std::{cmp::Ordering, fmt};

/// Size of a single ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// Bit index of the sign bit in a 256-bit word.
const SIGN_BIT: usize = 255;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Int256(U256);

impl Int256 {
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));
    pub const ONE: Self = Self(U256([1, 0, 0, 0]));
    /// `2^255 - 1`
    pub const MAX: Self = Self(U256([u64::MAX, u64::MAX, u64::MAX, i64::MAX as u64]));
    /// `-2^255`
    pub const MIN: Self = Self(U256([0, 0, 0, 1 << 63]));

    /// Interpret a raw 256-bit word as two's complement.
    pub const fn from_raw(word: U256) -> Self {
        Self(word)
    }

    /// The two's-complement bit pattern.
    pub const fn into_raw(self) -> U256 {
        self.0
    }

    pub fn from_be_bytes(bytes: [u8; WORD_SIZE]) -> Self {
        Self(U256::from_big_endian(&bytes))
    }

    pub fn to_be_bytes(&self) -> [u8; WORD_SIZE] {
        let mut out = [0u8; WORD_SIZE];
        self.0.to_big_endian(&mut out);
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.bit(SIGN_BIT)
    }

    /// Absolute value as an unsigned word (`|MIN|` fits, unlike in `Int256`).
    pub fn unsigned_abs(&self) -> U256 {
        if self.is_negative() {
            (!self.0).overflowing_add(U256::one()).0
        } else {
            self.0
        }
    }

    pub fn checked_neg(self) -> Option<Self> {
        if self == Self::MIN {
            return None;
        }
        Some(self.wrapping_neg())
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let sum = Self(self.0.overflowing_add(rhs.0).0);
        // Overflow iff both operands share a sign the result does not.
        if self.is_negative() == rhs.is_negative() && sum.is_negative() != self.is_negative() {
            return None;
        }
        Some(sum)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let diff = Self(self.0.overflowing_sub(rhs.0).0);
        // Overflow iff the operands differ in sign and the result takes the sign of `rhs`.
        if self.is_negative() != rhs.is_negative() && diff.is_negative() != self.is_negative() {
            return None;
        }
        Some(diff)
    }

    /// Sum of `values`, or `None` if any partial sum leaves the `int256` range.
    pub fn checked_sum<'a>(values: impl IntoIterator<Item = &'a Int256>) -> Option<Self> {
        values
            .into_iter()
            .try_fold(Self::ZERO, |acc, value| acc.checked_add(*value))
    }

    /// Convert a non-negative unsigned amount, failing above `MAX`.
    pub fn from_unsigned(value: U256) -> Option<Self> {
        if value.bit(SIGN_BIT) {
            return None;
        }
        Some(Self(value))
    }

    /// Narrow to `i128` when the value fits.
    pub fn to_i128(&self) -> Option<i128> {
        let magnitude = self.unsigned_abs();
        if magnitude.bits() > 128 {
            return None;
        }
        let magnitude = magnitude.as_u128();
        if !self.is_negative() {
            return i128::try_from(magnitude).ok();
        }
        if magnitude == i128::MIN.unsigned_abs() {
            return Some(i128::MIN);
        }
        i128::try_from(magnitude).ok().map(|m| -m)
    }

    fn wrapping_neg(self) -> Self {
        Self((!self.0).overflowing_add(U256::one()).0)
    }
}

impl From<i64> for Int256 {
    fn from(value: i64) -> Self {
        Self::from(value as i128)
    }
}

impl From<i128> for Int256 {
    fn from(value: i128) -> Self {
        let magnitude = Self(U256::from(value.unsigned_abs()));
        if value < 0 {
            magnitude.wrapping_neg()
        } else {
            magnitude
        }
    }
}

impl From<u64> for Int256 {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl Ord for Int256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // Same sign: two's-complement patterns order like the values they encode.
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Int256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Int256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.unsigned_abs())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for Int256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_use_twos_complement_words() {
        let minus_one = Int256::from(-1i64);
        assert_eq!(minus_one.to_be_bytes(), [0xff; WORD_SIZE]);

        let minus_five = Int256::from(-5i64);
        let mut expected = [0xff; WORD_SIZE];
        expected[WORD_SIZE - 1] = 0xfb;
        assert_eq!(minus_five.to_be_bytes(), expected);
        assert_eq!(Int256::from_be_bytes(expected), minus_five);
    }

    #[test]
    fn extremes_have_expected_bit_patterns() {
        let mut max = [0xff; WORD_SIZE];
        max[0] = 0x7f;
        assert_eq!(Int256::MAX.to_be_bytes(), max);

        let mut min = [0u8; WORD_SIZE];
        min[0] = 0x80;
        assert_eq!(Int256::MIN.to_be_bytes(), min);
        assert!(Int256::MIN.is_negative());
        assert!(!Int256::MAX.is_negative());
    }

    #[test]
    fn checked_add_detects_signed_overflow() {
        assert_eq!(Int256::MAX.checked_add(Int256::ONE), None);
        assert_eq!(Int256::MIN.checked_add(Int256::from(-1i64)), None);
        assert_eq!(
            Int256::MAX.checked_add(Int256::from(-1i64)),
            Int256::MAX.checked_sub(Int256::ONE)
        );
        assert_eq!(
            Int256::from(-7i64).checked_add(Int256::from(3i64)),
            Some(Int256::from(-4i64))
        );
    }

    #[test]
    fn checked_sub_detects_signed_overflow() {
        assert_eq!(Int256::MIN.checked_sub(Int256::ONE), None);
        assert_eq!(Int256::MAX.checked_sub(Int256::from(-1i64)), None);
        assert_eq!(Int256::ZERO.checked_sub(Int256::MIN), None);
        assert_eq!(
            Int256::from(3i64).checked_sub(Int256::from(10i64)),
            Some(Int256::from(-7i64))
        );
    }

    #[test]
    fn checked_neg_rejects_min() {
        assert_eq!(Int256::MIN.checked_neg(), None);
        assert_eq!(Int256::from(9i64).checked_neg(), Some(Int256::from(-9i64)));
        assert_eq!(Int256::ZERO.checked_neg(), Some(Int256::ZERO));
    }

    #[test]
    fn ordering_is_signed() {
        let mut values = vec![
            Int256::MAX,
            Int256::from(-1i64),
            Int256::ZERO,
            Int256::MIN,
            Int256::from(42i64),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Int256::MIN,
                Int256::from(-1i64),
                Int256::ZERO,
                Int256::from(42i64),
                Int256::MAX,
            ]
        );
    }

    #[test]
    fn i128_conversion_round_trips() {
        for value in [0i128, 1, -1, i128::MAX, i128::MIN, -123_456_789] {
            assert_eq!(Int256::from(value).to_i128(), Some(value));
        }
        assert_eq!(Int256::MAX.to_i128(), None);
        assert_eq!(Int256::MIN.to_i128(), None);
    }

    #[test]
    fn display_prints_signed_decimal() {
        assert_eq!(Int256::from(-250i64).to_string(), "-250");
        assert_eq!(Int256::from(250u64).to_string(), "250");
        assert_eq!(Int256::ZERO.to_string(), "0");
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let values = [Int256::MAX, Int256::ONE, Int256::from(-1i64)];
        assert_eq!(Int256::checked_sum(values.iter()), None);
        let balanced = [Int256::from(-5i64), Int256::from(5i64)];
        assert_eq!(Int256::checked_sum(balanced.iter()), Some(Int256::ZERO));
    }
}
