//! # Protocol Constants
//!
//! Fundamental constants for the elastic supply engine including:
//! - Fixed-point scale
//! - Elasticity policy constants (haircut, damping, step sizes)
//! - Oracle request rate-limit defaults
//! - Reference genesis parameters

// ============================================================================
// Fixed-Point Constants
// ============================================================================

/// Number of fractional decimal digits in a `Fixed12`
pub const FIXED12_DECIMALS: u32 = 12;

/// Fixed12 scale factor: 10^12
pub const FIXED12_SCALE: u128 = 1_000_000_000_000;

/// Basis points denominator (10,000 = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// One hundred percent expressed in Fixed12 percentage units
pub const PERCENT_100: u128 = 100 * FIXED12_SCALE;

// ============================================================================
// Elasticity Constants
// ============================================================================

/// Symmetric percentage change factor: difference over mean, times 100,
/// expressed in the Fixed12 base (2 * 100 * 10^12)
pub const SYMMETRIC_CHANGE_FACTOR: u128 = 200 * FIXED12_SCALE;

/// Observed quantity is reduced by `quantity / QUANTITY_HAIRCUT_DIVISOR` (10%)
pub const QUANTITY_HAIRCUT_DIVISOR: u128 = 10;

/// Quantity change damping numerator (30 / 10,000 = 0.3%)
pub const QUANTITY_DAMPING_NUMERATOR: u128 = 30;

/// Quantity change damping denominator
pub const QUANTITY_DAMPING_DENOMINATOR: u128 = 10_000;

/// Supply step of the elasticity policy, as bps of the discounted quantity (3%)
pub const DEFAULT_SUPPLY_STEP_BPS: u32 = 300;

/// Block reward step of the elasticity policy (3%)
pub const DEFAULT_REWARD_STEP_BPS: u32 = 300;

// ============================================================================
// Period and Oracle Request Defaults
// ============================================================================

/// Production period length in blocks
pub const DEFAULT_PERIOD_LENGTH: u64 = 500_000;

/// Minimum blocks between two oracle requests
pub const DEFAULT_REQUEST_BLOCK_LIMIT: u64 = 100;

/// Minimum seconds between two oracle requests
pub const DEFAULT_REQUEST_PERIOD_LIMIT: i64 = 3_600;

// ============================================================================
// Reference Genesis
// ============================================================================

/// Period length used by the reference scenario
pub const REFERENCE_PERIOD_LENGTH: u64 = 50;

/// Request block limit used by the reference scenario
pub const REFERENCE_REQUEST_BLOCK_LIMIT: u64 = 20;

/// Request period limit used by the reference scenario (one minute)
pub const REFERENCE_REQUEST_PERIOD_LIMIT: i64 = 60;

/// Genesis baseline quantity (200,000)
pub const GENESIS_BASELINE_QUANTITY: u128 = 200_000 * FIXED12_SCALE;

/// Genesis baseline price (1.410)
pub const GENESIS_BASELINE_PRICE: u128 = 1_410_000_000_000;

/// Genesis total supply (7,000,000)
pub const GENESIS_TOTAL_SUPPLY: u128 = 7_000_000 * FIXED12_SCALE;

/// Genesis per-block reward rate (0.011091067966)
pub const GENESIS_BLOCK_REWARD_RATE: u128 = 11_091_067_966;
