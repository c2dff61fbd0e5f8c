//! # Price Elasticity of Supply
//!
//! Compares the oracle observation against the baseline of the previous
//! rebase:
//!
//! - `q2 = quantity - quantity / 10` (the observed quantity after the haircut)
//! - `delta_p = |p2 - p1| * 200e12 / (p1 + p2)`, a symmetric percentage change
//! - `delta_q = (|q2 - q1| * 200e12 / (q1 + q2)) * 30 / 10000`, damped
//! - `pes = delta_q / delta_p`, or 0 when the price did not move
//!
//! Percentages are Fixed12 values (`0.988002822865` means 0.988%). Each
//! division truncates in the order written above.

use std::cmp::Ordering;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    QUANTITY_DAMPING_DENOMINATOR, QUANTITY_DAMPING_NUMERATOR, QUANTITY_HAIRCUT_DIVISOR, SYMMETRIC_CHANGE_FACTOR,
};
use crate::errors::CoreResult;
use crate::math::Fixed12;

/// Direction of the observed price relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persist", serde(rename_all = "snake_case"))]
pub enum PriceDirection {
    Up,
    Flat,
    Down,
}

impl PriceDirection {
    fn between(baseline: Fixed12, observed: Fixed12) -> Self {
        match observed.cmp(&baseline) {
            Ordering::Greater => Self::Up,
            Ordering::Equal => Self::Flat,
            Ordering::Less => Self::Down,
        }
    }
}

/// Everything derived from one observation against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct ElasticityReading {
    /// Baseline quantity
    pub q1: Fixed12,
    /// Observed quantity after the haircut
    pub q2: Fixed12,
    /// Baseline price
    pub p1: Fixed12,
    /// Observed price
    pub p2: Fixed12,
    /// Symmetric price change, percent
    pub delta_p: Fixed12,
    /// Damped symmetric quantity change, percent
    pub delta_q: Fixed12,
    /// `delta_q / delta_p`
    pub pes: Fixed12,
    pub price_direction: PriceDirection,
}

impl ElasticityReading {
    pub fn compute(
        baseline_quantity: Fixed12,
        baseline_price: Fixed12,
        observed_quantity: Fixed12,
        observed_price: Fixed12,
    ) -> CoreResult<Self> {
        let q1 = baseline_quantity;
        let p1 = baseline_price;
        let q2 = haircut_quantity(observed_quantity)?;
        let p2 = observed_price;

        let delta_p = symmetric_change(p1, p2)?;
        let delta_q = symmetric_change(q1, q2)?.mul_div(QUANTITY_DAMPING_NUMERATOR, QUANTITY_DAMPING_DENOMINATOR)?;

        let pes = if delta_p.is_zero() {
            Fixed12::ZERO
        } else {
            delta_q.checked_div(delta_p)?
        };

        Ok(Self {
            q1,
            q2,
            p1,
            p2,
            delta_p,
            delta_q,
            pes,
            price_direction: PriceDirection::between(p1, p2),
        })
    }

    /// Supply responds more than proportionally to price
    pub fn is_elastic(&self) -> bool {
        self.pes > Fixed12::ONE
    }
}

/// Observed quantity minus the fixed 10% haircut
pub fn haircut_quantity(quantity: Fixed12) -> CoreResult<Fixed12> {
    quantity.checked_sub(quantity.checked_div_int(QUANTITY_HAIRCUT_DIVISOR)?)
}

/// `|b - a| * 200e12 / (a + b)`, zero when both are zero
pub fn symmetric_change(a: Fixed12, b: Fixed12) -> CoreResult<Fixed12> {
    let sum = a.checked_add(b)?;
    if sum.is_zero() {
        return Ok(Fixed12::ZERO);
    }
    a.abs_diff(b).mul_div(SYMMETRIC_CHANGE_FACTOR, sum.raw())
}
