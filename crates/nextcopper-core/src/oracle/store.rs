//! # Oracle Data Store
//!
//! Holds the most recent observation delivered by the oracle. Deliveries
//! overwrite, they are never queued. The store does no arithmetic; it only
//! answers whether the observation matches the active period.

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::math::Fixed12;
use crate::period::PeriodState;
use crate::types::{BlockHeight, PeriodIndex};

/// Latest (quantity, price) pair delivered by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct OracleObservation {
    /// Period the observation was produced for
    pub period_index: PeriodIndex,
    /// Raw observed quantity (purchases), before the haircut
    pub quantity: Fixed12,
    /// Observed price
    pub price: Fixed12,
    /// False until the first delivery
    pub present: bool,
}

impl OracleObservation {
    /// Overwrite the stored observation
    pub fn deliver(&mut self, period_index: PeriodIndex, quantity: Fixed12, price: Fixed12) {
        log::debug!(
            "Oracle delivered period {}: quantity={}, price={}",
            period_index, quantity, price
        );
        *self = Self {
            period_index,
            quantity,
            price,
            present: true,
        };
    }

    /// True if a delivery targets `period_index`
    pub fn is_present_for(&self, period_index: PeriodIndex) -> bool {
        self.present && self.period_index == period_index
    }
}

/// A rebase is due and the stored observation belongs to the active period
pub fn is_rebase_ready(period: &PeriodState, observation: &OracleObservation, height: BlockHeight) -> bool {
    period.need_rebase(height) && observation.is_present_for(period.current_period_index(height))
}
