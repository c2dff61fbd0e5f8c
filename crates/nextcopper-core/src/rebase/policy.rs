//! # Rebase Policies
//!
//! A policy turns an elasticity reading into a supply delta and a new
//! per-block reward rate. The engine treats it as configuration.
//!
//! - `ElasticityPolicy` is fit to the reference rebase history: elastic
//!   readings (`pes > 1`) expand supply by 3% of the discounted quantity and
//!   raise the reward rate by 3%, everything else contracts by the same step.
//!   The direction depends on elasticity, not on the price move.
//! - `PriceDirectionPolicy` follows the price: no move means no adjustment,
//!   and the supply moves with the sign of the price change by `delta_q`
//!   percent.

use std::fmt;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::constants::{BPS_DENOMINATOR, DEFAULT_REWARD_STEP_BPS, DEFAULT_SUPPLY_STEP_BPS, PERCENT_100};
use crate::errors::{CoreResult, RebaseError};
use crate::math::{safe_add_u128, safe_calculate_bps, safe_sub_u128, Fixed12, SignedFixed12};
use crate::rebase::elasticity::{ElasticityReading, PriceDirection};

/// Outcome of a policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct RebaseAdjustment {
    /// Change applied to total supply
    pub supply_delta: SignedFixed12,
    /// Per-block reward rate after the rebase
    pub block_reward_rate: Fixed12,
}

impl RebaseAdjustment {
    pub fn unchanged(block_reward_rate: Fixed12) -> Self {
        Self {
            supply_delta: SignedFixed12::ZERO,
            block_reward_rate,
        }
    }
}

/// Maps a reading to a supply and reward adjustment
pub trait RebasePolicy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn adjust(
        &self,
        reading: &ElasticityReading,
        total_supply: Fixed12,
        block_reward_rate: Fixed12,
    ) -> CoreResult<RebaseAdjustment>;
}

/// Step policy keyed on whether supply is elastic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElasticityPolicy {
    /// Supply step as bps of the discounted quantity `q2`
    supply_step_bps: u32,
    /// Reward rate step in bps, at most 10000
    reward_step_bps: u32,
}

impl Default for ElasticityPolicy {
    fn default() -> Self {
        Self {
            supply_step_bps: DEFAULT_SUPPLY_STEP_BPS,
            reward_step_bps: DEFAULT_REWARD_STEP_BPS,
        }
    }
}

impl ElasticityPolicy {
    pub fn new(supply_step_bps: u32, reward_step_bps: u32) -> CoreResult<Self> {
        if reward_step_bps as u128 > BPS_DENOMINATOR {
            return Err(RebaseError::InvalidParameter("reward_step_bps must be at most 10000"));
        }
        Ok(Self {
            supply_step_bps,
            reward_step_bps,
        })
    }

    pub fn supply_step_bps(&self) -> u32 {
        self.supply_step_bps
    }

    pub fn reward_step_bps(&self) -> u32 {
        self.reward_step_bps
    }
}

impl RebasePolicy for ElasticityPolicy {
    fn name(&self) -> &'static str {
        "elasticity"
    }

    fn adjust(
        &self,
        reading: &ElasticityReading,
        total_supply: Fixed12,
        block_reward_rate: Fixed12,
    ) -> CoreResult<RebaseAdjustment> {
        let step = Fixed12::from_raw(safe_calculate_bps(reading.q2.raw(), self.supply_step_bps)?);
        let reward_step = self.reward_step_bps as u128;

        if reading.is_elastic() {
            Ok(RebaseAdjustment {
                supply_delta: SignedFixed12::positive(step)?,
                block_reward_rate: block_reward_rate.mul_div(safe_add_u128(BPS_DENOMINATOR, reward_step)?, BPS_DENOMINATOR)?,
            })
        } else {
            Ok(RebaseAdjustment {
                supply_delta: SignedFixed12::negative(step.min(total_supply))?,
                block_reward_rate: block_reward_rate.mul_div(safe_sub_u128(BPS_DENOMINATOR, reward_step)?, BPS_DENOMINATOR)?,
            })
        }
    }
}

/// Supply follows the sign of the price change, sized by `delta_q`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceDirectionPolicy;

impl RebasePolicy for PriceDirectionPolicy {
    fn name(&self) -> &'static str {
        "price_direction"
    }

    fn adjust(
        &self,
        reading: &ElasticityReading,
        total_supply: Fixed12,
        block_reward_rate: Fixed12,
    ) -> CoreResult<RebaseAdjustment> {
        let supply_step = total_supply.mul_div(reading.delta_q.raw(), PERCENT_100)?;
        let reward_step = block_reward_rate.mul_div(reading.delta_q.raw(), PERCENT_100)?;

        match reading.price_direction {
            PriceDirection::Flat => Ok(RebaseAdjustment::unchanged(block_reward_rate)),
            PriceDirection::Up => Ok(RebaseAdjustment {
                supply_delta: SignedFixed12::positive(supply_step)?,
                block_reward_rate: block_reward_rate.checked_add(reward_step)?,
            }),
            PriceDirection::Down => Ok(RebaseAdjustment {
                supply_delta: SignedFixed12::negative(supply_step.min(total_supply))?,
                block_reward_rate: block_reward_rate.checked_sub(reward_step.min(block_reward_rate))?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(s: &str) -> Fixed12 {
        s.parse().unwrap()
    }

    fn reading(q1: &str, p1: &str, quantity: &str, price: &str) -> ElasticityReading {
        ElasticityReading::compute(fixed(q1), fixed(p1), fixed(quantity), fixed(price)).unwrap()
    }

    #[test]
    fn test_rejects_oversized_reward_step() {
        assert!(ElasticityPolicy::new(300, 10_001).is_err());
        assert!(ElasticityPolicy::new(300, 20_000).is_err());

        let policy = ElasticityPolicy::new(300, 10_000).unwrap();
        assert_eq!(policy.supply_step_bps(), 300);
        assert_eq!(policy.reward_step_bps(), 10_000);
    }

    #[test]
    fn test_full_reward_step_contracts_rate_to_zero() {
        let reading = reading("200000", "1.41", "400000", "1.424");
        let adjustment = ElasticityPolicy::new(300, 10_000)
            .unwrap()
            .adjust(&reading, fixed("7000000"), fixed("0.011091067966"))
            .unwrap();
        assert_eq!(adjustment.block_reward_rate, Fixed12::ZERO);
    }

    #[test]
    fn test_elasticity_policy_contracts_when_inelastic() {
        let reading = reading("200000", "1.41", "400000", "1.424");
        let adjustment = ElasticityPolicy::default()
            .adjust(&reading, fixed("7000000"), fixed("0.011091067966"))
            .unwrap();

        assert_eq!(adjustment.supply_delta, SignedFixed12::negative(fixed("10800")).unwrap());
        assert_eq!(adjustment.block_reward_rate, fixed("0.010758335927"));
    }

    #[test]
    fn test_elasticity_policy_contracts_on_rising_price() {
        let reading = reading("46170000", "1.422", "25000000", "1.426");
        let adjustment = ElasticityPolicy::default()
            .adjust(&reading, fixed("8514322"), fixed("0.012065069708"))
            .unwrap();

        assert_eq!(adjustment.supply_delta, SignedFixed12::negative(fixed("675000")).unwrap());
        assert_eq!(adjustment.block_reward_rate, fixed("0.011703117616"));
    }

    #[test]
    fn test_elasticity_policy_expands_when_elastic() {
        let reading = reading("3240000", "1.424", "12000000", "1.426");
        let adjustment = ElasticityPolicy::default()
            .adjust(&reading, fixed("7000000"), fixed("0.010435585849"))
            .unwrap();

        assert_eq!(adjustment.supply_delta, SignedFixed12::positive(fixed("324000")).unwrap());
        assert_eq!(adjustment.block_reward_rate, fixed("0.010748653424"));
    }

    #[test]
    fn test_elasticity_policy_never_contracts_past_zero() {
        let reading = reading("200000", "1.41", "400000", "1.424");
        let adjustment = ElasticityPolicy::default()
            .adjust(&reading, fixed("100"), Fixed12::ZERO)
            .unwrap();
        assert_eq!(adjustment.supply_delta, SignedFixed12::negative(fixed("100")).unwrap());
    }

    #[test]
    fn test_price_direction_policy_flat_price_is_noop() {
        let reading = reading("360000", "1.424", "3600000", "1.424");
        let adjustment = PriceDirectionPolicy.adjust(&reading, fixed("7000000"), fixed("0.01")).unwrap();
        assert_eq!(adjustment, RebaseAdjustment::unchanged(fixed("0.01")));
    }

    #[test]
    fn test_price_direction_policy_follows_sign() {
        let up = reading("200000", "1.41", "400000", "1.424");
        let adjustment = PriceDirectionPolicy.adjust(&up, fixed("7000000"), fixed("0.01")).unwrap();
        assert!(!adjustment.supply_delta.is_negative());
        // 7,000,000 * 0.171428571428%
        assert_eq!(adjustment.supply_delta.magnitude(), fixed("11999.99999996"));
        assert!(adjustment.block_reward_rate > fixed("0.01"));

        let down = reading("360000", "1.424", "800000", "1.41");
        assert!(down.delta_q > Fixed12::ZERO);
        let adjustment = PriceDirectionPolicy.adjust(&down, fixed("7000000"), fixed("0.01")).unwrap();
        assert!(adjustment.supply_delta.is_negative());
        assert!(adjustment.block_reward_rate < fixed("0.01"));
    }

    #[test]
    fn test_price_drop_without_quantity_change_is_noop() {
        // 400,000 after the 10% haircut equals the 360,000 baseline
        let down = reading("360000", "1.424", "400000", "1.41");
        assert_eq!(down.price_direction, PriceDirection::Down);
        assert_eq!(down.delta_q, Fixed12::ZERO);

        let adjustment = PriceDirectionPolicy.adjust(&down, fixed("7000000"), fixed("0.01")).unwrap();
        assert_eq!(adjustment.supply_delta, SignedFixed12::ZERO);
        assert_eq!(adjustment.block_reward_rate, fixed("0.01"));
    }
}
