//! # Mathematical Functions
//!
//! Overflow-checked integer helpers, 256-bit mul-div and the 12-decimal
//! fixed-point types used by every balance, price and percentage.

pub mod big_int;
pub mod fixed12;
pub mod safe_math;

// Re-export commonly used functions
pub use big_int::*;
pub use fixed12::*;
pub use safe_math::*;
