//! # Fixed12 Decimal Arithmetic
//!
//! Quantities, prices, balances and percentages are decimal fixed-point
//! numbers with 12 fractional digits, stored as integers scaled by 10^12.
//! Every operation is overflow-checked and every division truncates, so
//! results are bit-exact with integer arithmetic on the raw values.

use std::fmt;
use std::str::FromStr;

use num_traits::ToPrimitive;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::constants::{FIXED12_DECIMALS, FIXED12_SCALE};
use crate::errors::{CoreResult, RebaseError};
use crate::math::big_int::mul_div_u128;
use crate::math::safe_math::{
    safe_add_i128, safe_add_u128, safe_cast_u128_to_i128, safe_div_u128, safe_mul_u128, safe_sub_u128,
};

/// Unsigned 12-decimal fixed-point value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persist", serde(transparent))]
pub struct Fixed12(u128);

impl Fixed12 {
    pub const ZERO: Fixed12 = Fixed12(0);
    pub const ONE: Fixed12 = Fixed12(FIXED12_SCALE);
    pub const MAX: Fixed12 = Fixed12(u128::MAX);

    /// Wrap an already scaled integer
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Scaled integer representation
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Whole number, exact for any u64
    pub const fn from_int(value: u64) -> Self {
        Self(value as u128 * FIXED12_SCALE)
    }

    /// `numerator / denominator` as a Fixed12, truncating
    pub fn from_ratio(numerator: u128, denominator: u128) -> CoreResult<Self> {
        mul_div_u128(numerator, FIXED12_SCALE, denominator).map(Self)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Integer part, fractional digits dropped
    pub const fn trunc(self) -> u128 {
        self.0 / FIXED12_SCALE
    }

    pub fn checked_add(self, other: Self) -> CoreResult<Self> {
        safe_add_u128(self.0, other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> CoreResult<Self> {
        safe_sub_u128(self.0, other.0).map(Self)
    }

    /// Fixed-point product, truncating
    pub fn checked_mul(self, other: Self) -> CoreResult<Self> {
        mul_div_u128(self.0, other.0, FIXED12_SCALE).map(Self)
    }

    /// Fixed-point quotient, truncating
    pub fn checked_div(self, other: Self) -> CoreResult<Self> {
        mul_div_u128(self.0, FIXED12_SCALE, other.0).map(Self)
    }

    /// Multiply the raw value by a plain integer
    pub fn checked_mul_int(self, factor: u128) -> CoreResult<Self> {
        safe_mul_u128(self.0, factor).map(Self)
    }

    /// Divide the raw value by a plain integer, truncating
    pub fn checked_div_int(self, divisor: u128) -> CoreResult<Self> {
        safe_div_u128(self.0, divisor).map(Self)
    }

    /// `self * numerator / denominator` on the raw value with a 256-bit intermediate
    pub fn mul_div(self, numerator: u128, denominator: u128) -> CoreResult<Self> {
        mul_div_u128(self.0, numerator, denominator).map(Self)
    }

    /// Add a signed delta, failing if the result would be negative
    pub fn checked_add_signed(self, delta: SignedFixed12) -> CoreResult<Self> {
        if delta.is_negative() {
            self.checked_sub(delta.magnitude())
        } else {
            self.checked_add(delta.magnitude())
        }
    }

    pub fn abs_diff(self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl ToPrimitive for Fixed12 {
    fn to_i64(&self) -> Option<i64> {
        self.trunc().to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.trunc().to_u64()
    }

    fn to_u128(&self) -> Option<u128> {
        Some(self.trunc())
    }

    /// Lossy conversion for display only
    fn to_f64(&self) -> Option<f64> {
        Some(self.0 as f64 / FIXED12_SCALE as f64)
    }
}

impl fmt::Display for Fixed12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fraction = self.0 % FIXED12_SCALE;
        if fraction == 0 {
            return write!(f, "{}", self.trunc());
        }
        let digits = format!("{:0width$}", fraction, width = FIXED12_DECIMALS as usize);
        write!(f, "{}.{}", self.trunc(), digits.trim_end_matches('0'))
    }
}

impl FromStr for Fixed12 {
    type Err = RebaseError;

    /// Parse a plain decimal such as `1.424` or `7000000`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().replace('_', "");
        let (int_part, frac_part) = match s.split_once('.') {
            // A trailing point needs at least one fractional digit
            Some((_, "")) => return Err(RebaseError::ConversionError),
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (s.as_str(), ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(RebaseError::ConversionError);
        }
        if frac_part.len() > FIXED12_DECIMALS as usize {
            return Err(RebaseError::ConversionError);
        }

        let int_value: u128 = int_part.parse().map_err(|_| RebaseError::ConversionError)?;
        let mut frac_value: u128 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| RebaseError::ConversionError)?
        };
        frac_value *= 10u128.pow(FIXED12_DECIMALS - frac_part.len() as u32);

        let raw = safe_add_u128(safe_mul_u128(int_value, FIXED12_SCALE)?, frac_value)?;
        Ok(Self(raw))
    }
}

/// Signed 12-decimal fixed-point value, used for supply deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persist", serde(transparent))]
pub struct SignedFixed12(i128);

impl SignedFixed12 {
    pub const ZERO: SignedFixed12 = SignedFixed12(0);

    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub fn positive(magnitude: Fixed12) -> CoreResult<Self> {
        safe_cast_u128_to_i128(magnitude.raw()).map(Self)
    }

    pub fn negative(magnitude: Fixed12) -> CoreResult<Self> {
        safe_cast_u128_to_i128(magnitude.raw()).map(|raw| Self(-raw))
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Absolute value as an unsigned Fixed12
    pub const fn magnitude(self) -> Fixed12 {
        Fixed12(self.0.unsigned_abs())
    }

    pub fn checked_add(self, other: Self) -> CoreResult<Self> {
        safe_add_i128(self.0, other.0).map(Self)
    }
}

impl fmt::Display for SignedFixed12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.magnitude())
        } else {
            write!(f, "+{}", self.magnitude())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let price: Fixed12 = "1.424".parse().unwrap();
        assert_eq!(price.raw(), 1_424_000_000_000);
        assert_eq!(price.to_string(), "1.424");

        let supply: Fixed12 = "7_000_000".parse().unwrap();
        assert_eq!(supply, Fixed12::from_int(7_000_000));
        assert_eq!(supply.to_string(), "7000000");

        let rate: Fixed12 = "0.011091067966".parse().unwrap();
        assert_eq!(rate.raw(), 11_091_067_966);
        assert_eq!(rate.to_string(), "0.011091067966");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", ".5", "1.", "7000000.", "1.2.3", "-1", "abc", "1.0000000000001", "1e6"] {
            assert_eq!(input.parse::<Fixed12>(), Err(RebaseError::ConversionError), "input {:?}", input);
        }
    }

    #[test]
    fn test_arithmetic_truncates() {
        let one_third = Fixed12::ONE.checked_div(Fixed12::from_int(3)).unwrap();
        assert_eq!(one_third.raw(), 333_333_333_333);

        let product = one_third.checked_mul(Fixed12::from_int(3)).unwrap();
        assert_eq!(product.raw(), 999_999_999_999);

        let ratio = Fixed12::from_ratio(1_424, 1_000).unwrap();
        assert_eq!(ratio.to_string(), "1.424");
    }

    #[test]
    fn test_checked_errors() {
        assert_eq!(Fixed12::ZERO.checked_sub(Fixed12::ONE), Err(RebaseError::MathUnderflow));
        assert_eq!(Fixed12::MAX.checked_add(Fixed12::ONE), Err(RebaseError::MathOverflow));
        assert_eq!(Fixed12::ONE.checked_div(Fixed12::ZERO), Err(RebaseError::DivisionByZero));
    }

    #[test]
    fn test_signed_delta() {
        let supply = Fixed12::from_int(7_000_000);
        let delta = SignedFixed12::negative(Fixed12::from_int(10_800)).unwrap();
        assert!(delta.is_negative());
        assert_eq!(delta.to_string(), "-10800");
        assert_eq!(supply.checked_add_signed(delta).unwrap(), Fixed12::from_int(6_989_200));

        let delta = SignedFixed12::positive(Fixed12::from_int(1)).unwrap();
        assert_eq!(Fixed12::ZERO.checked_add_signed(delta).unwrap(), Fixed12::ONE);

        let too_big = SignedFixed12::negative(Fixed12::from_int(2)).unwrap();
        assert_eq!(Fixed12::ONE.checked_add_signed(too_big), Err(RebaseError::MathUnderflow));
    }

    #[test]
    fn test_to_primitive() {
        let value: Fixed12 = "2.5".parse().unwrap();
        assert_eq!(value.to_u64(), Some(2));
        assert_eq!(value.to_f64(), Some(2.5));
    }
}
