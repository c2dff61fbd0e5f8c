//! # Safe Math Operations
//!
//! Overflow-checked arithmetic on the raw scaled integers.

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{CoreResult, RebaseError};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        /// Checked binary operation, failing on overflow or underflow
        pub fn $fn_name(a: $type, b: $type) -> CoreResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };

    // Division operations with zero check
    (div, $fn_name:ident, $type:ty) => {
        /// Safe division with zero check (truncating)
        pub fn $fn_name(a: $type, b: $type) -> CoreResult<$type> {
            if b == 0 {
                return Err(RebaseError::DivisionByZero);
            }
            a.checked_div(b).ok_or(RebaseError::MathOverflow)
        }
    };
}

safe_arith!(safe_add_u128, u128, checked_add, RebaseError::MathOverflow);
safe_arith!(safe_sub_u128, u128, checked_sub, RebaseError::MathUnderflow);
safe_arith!(safe_mul_u128, u128, checked_mul, RebaseError::MathOverflow);
safe_arith!(div, safe_div_u128, u128);

safe_arith!(safe_add_i128, i128, checked_add, RebaseError::MathOverflow);

/// Safe cast from u128 to i128
pub fn safe_cast_u128_to_i128(value: u128) -> CoreResult<i128> {
    i128::try_from(value).map_err(|_| RebaseError::ConversionError)
}

/// Apply a basis-point fraction to a value (truncating)
pub fn safe_calculate_bps(value: u128, bps: u32) -> CoreResult<u128> {
    crate::math::big_int::mul_div_u128(value, bps as u128, BPS_DENOMINATOR)
}
