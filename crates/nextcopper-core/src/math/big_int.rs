//! Big integer operations for high-precision math
//!
//! Balance rescaling multiplies two supply-sized values before dividing, which
//! does not fit in 128 bits. The product is taken in `ethnum::U256` and the
//! quotient narrowed back to u128.

use ethnum::U256;

use crate::errors::{CoreResult, RebaseError};

/// Multiply two u128 values and divide by a third, truncating
/// result = (a * b) / denominator
pub fn mul_div_u128(a: u128, b: u128, denominator: u128) -> CoreResult<u128> {
    if denominator == 0 {
        return Err(RebaseError::DivisionByZero);
    }

    // A 128x128 product always fits in 256 bits
    let quotient = (U256::from(a) * U256::from(b)) / U256::from(denominator);
    u128::try_from(quotient).map_err(|_| RebaseError::MathOverflow)
}
