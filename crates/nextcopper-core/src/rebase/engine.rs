//! # Rebase Engine
//!
//! Validates that a rebase is due and that the oracle observation belongs to
//! the active period, computes the elasticity reading, asks the policy for
//! an adjustment and commits everything at once. The new ledger is computed
//! before anything is written, so an error leaves the state untouched.

use num_traits::ToPrimitive;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, RebaseError};
use crate::ledger::ElasticLedger;
use crate::math::Fixed12;
use crate::oracle;
use crate::rebase::elasticity::ElasticityReading;
use crate::rebase::policy::{ElasticityPolicy, RebaseAdjustment, RebasePolicy};
use crate::state::ElasticState;
use crate::types::{BlockHeight, PeriodIndex};

/// Record of one committed (or previewed) rebase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct RebaseOutcome {
    pub period_index: PeriodIndex,
    pub block_height: BlockHeight,
    pub reading: ElasticityReading,
    pub adjustment: RebaseAdjustment,
    pub supply_before: Fixed12,
    pub supply_after: Fixed12,
    pub reward_rate_before: Fixed12,
}

impl RebaseOutcome {
    /// Relative supply change in percent, for display only
    pub fn supply_change_percent(&self) -> Option<f64> {
        let before = self.supply_before.to_f64()?;
        if before == 0.0 {
            return None;
        }
        let after = self.supply_after.to_f64()?;
        Some((after - before) / before * 100.0)
    }

    pub fn is_expansion(&self) -> bool {
        self.supply_after > self.supply_before
    }
}

/// Applies a `RebasePolicy` to an `ElasticState`
#[derive(Debug)]
pub struct RebaseEngine {
    policy: Box<dyn RebasePolicy>,
}

impl Default for RebaseEngine {
    fn default() -> Self {
        Self::new(ElasticityPolicy::default())
    }
}

impl RebaseEngine {
    pub fn new<P: RebasePolicy + 'static>(policy: P) -> Self {
        Self::with_policy(Box::new(policy))
    }

    pub fn with_policy(policy: Box<dyn RebasePolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// What `rebase` would do at `height`, without committing
    pub fn preview(&self, state: &ElasticState, height: BlockHeight) -> CoreResult<RebaseOutcome> {
        self.plan(state, height).map(|(outcome, _)| outcome)
    }

    /// Rebase once for the active period
    pub fn rebase(&self, state: &mut ElasticState, height: BlockHeight) -> CoreResult<RebaseOutcome> {
        let (outcome, ledger) = self.plan(state, height)?;

        state.period.commit(height, outcome.reading.q2, outcome.reading.p2);
        state.block_reward_rate = outcome.adjustment.block_reward_rate;
        state.ledger = ledger;

        log::info!(
            "Rebased period {} at block {}: supply {} -> {} ({}), reward rate {} -> {}",
            outcome.period_index,
            height,
            outcome.supply_before,
            outcome.supply_after,
            outcome.adjustment.supply_delta,
            outcome.reward_rate_before,
            outcome.adjustment.block_reward_rate
        );
        Ok(outcome)
    }

    fn plan(&self, state: &ElasticState, height: BlockHeight) -> CoreResult<(RebaseOutcome, ElasticLedger)> {
        if !state.period.need_rebase(height) {
            return Err(RebaseError::AlreadyRebased);
        }
        if !oracle::is_rebase_ready(&state.period, &state.observation, height) {
            return Err(RebaseError::OracleInvalidData);
        }

        let (baseline_quantity, baseline_price) = state.period.baseline();
        let reading = ElasticityReading::compute(
            baseline_quantity,
            baseline_price,
            state.observation.quantity,
            state.observation.price,
        )?;
        log::debug!(
            "Elasticity ({}): delta_p={}, delta_q={}, pes={}",
            self.policy.name(),
            reading.delta_p,
            reading.delta_q,
            reading.pes
        );

        let supply_before = state.ledger.total_supply();
        let adjustment = self.policy.adjust(&reading, supply_before, state.block_reward_rate)?;
        let ledger = state.ledger.rescaled(adjustment.supply_delta)?;

        let outcome = RebaseOutcome {
            period_index: state.period.current_period_index(height),
            block_height: height,
            reading,
            adjustment,
            supply_before,
            supply_after: ledger.total_supply(),
            reward_rate_before: state.block_reward_rate,
        };
        Ok((outcome, ledger))
    }
}
