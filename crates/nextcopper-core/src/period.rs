//! # Period Tracker
//!
//! Derives the rebase period from the external block clock and holds the
//! baseline recorded by the most recent rebase. All queries are pure functions
//! of the persisted state and the supplied height.

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, RebaseError};
use crate::math::Fixed12;
use crate::types::{BlockHeight, PeriodIndex};

/// Rebase period bookkeeping and the current baseline
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct PeriodState {
    /// Blocks per rebase period
    pub(crate) period_length: u64,
    /// Height of the last committed rebase (0 at genesis)
    pub(crate) last_rebase_block: BlockHeight,
    /// Discounted quantity recorded by the last rebase
    pub(crate) baseline_quantity: Fixed12,
    /// Price recorded by the last rebase
    pub(crate) baseline_price: Fixed12,
    /// Number of committed rebases
    pub(crate) rebase_count: u64,
}

impl PeriodState {
    /// Genesis state with an initial baseline
    pub fn new(period_length: u64, baseline_quantity: Fixed12, baseline_price: Fixed12) -> CoreResult<Self> {
        if period_length == 0 {
            return Err(RebaseError::InvalidParameter("period_length must be greater than 0"));
        }

        Ok(Self {
            period_length,
            last_rebase_block: 0,
            baseline_quantity,
            baseline_price,
            rebase_count: 0,
        })
    }

    /// `floor(height / period_length)`
    pub fn current_period_index(&self, height: BlockHeight) -> PeriodIndex {
        height / self.period_length
    }

    /// True once the clock has crossed into a period later than the last rebase
    pub fn need_rebase(&self, height: BlockHeight) -> bool {
        self.current_period_index(height) > self.current_period_index(self.last_rebase_block)
    }

    /// True while the clock is still inside the period of a committed rebase.
    /// Reads false again as soon as the next period begins.
    pub fn rebased_this_period(&self, height: BlockHeight) -> bool {
        self.rebase_count > 0 && !self.need_rebase(height)
    }

    /// `(quantity, price)` of the current baseline
    pub fn baseline(&self) -> (Fixed12, Fixed12) {
        (self.baseline_quantity, self.baseline_price)
    }

    pub fn period_length(&self) -> u64 {
        self.period_length
    }

    pub fn last_rebase_block(&self) -> BlockHeight {
        self.last_rebase_block
    }

    pub fn rebase_count(&self) -> u64 {
        self.rebase_count
    }

    pub(crate) fn commit(&mut self, height: BlockHeight, quantity: Fixed12, price: Fixed12) {
        self.last_rebase_block = height;
        self.baseline_quantity = quantity;
        self.baseline_price = price;
        self.rebase_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker() -> PeriodState {
        PeriodState::new(50, Fixed12::from_int(200_000), "1.41".parse().unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_zero_period() {
        let result = PeriodState::new(0, Fixed12::ZERO, Fixed12::ZERO);
        assert!(matches!(result, Err(RebaseError::InvalidParameter(_))));
    }

    #[test]
    fn test_first_boundary_after_one_period() {
        let period = tracker();
        assert!(!period.need_rebase(0));
        assert!(!period.need_rebase(49));
        assert!(period.need_rebase(50));
        assert_eq!(period.current_period_index(50), 1);
        assert_eq!(period.current_period_index(99), 1);
    }

    #[test]
    fn test_commit_closes_period() {
        let mut period = tracker();
        assert!(!period.rebased_this_period(60));

        period.commit(60, Fixed12::from_int(360_000), "1.424".parse().unwrap());
        assert!(!period.need_rebase(60));
        assert!(!period.need_rebase(99));
        assert!(period.rebased_this_period(99));

        // New period: flag resets without any commit
        assert!(period.need_rebase(100));
        assert!(!period.rebased_this_period(100));
        assert_eq!(period.rebase_count(), 1);
        assert_eq!(period.last_rebase_block(), 60);
    }

    #[test]
    fn test_baseline_is_stable() {
        let period = tracker();
        let first = period.baseline();
        for _ in 0..3 {
            assert_eq!(period.baseline(), first);
        }
    }

    proptest! {
        #[test]
        fn prop_need_rebase_matches_indices(
            period_length in 1u64..1_000,
            last in 0u64..1_000_000,
            height in 0u64..2_000_000,
        ) {
            let mut period = PeriodState::new(period_length, Fixed12::ZERO, Fixed12::ZERO).unwrap();
            period.last_rebase_block = last;
            prop_assert_eq!(
                period.need_rebase(height),
                height / period_length > last / period_length
            );
        }

        #[test]
        fn prop_need_rebase_is_monotonic(
            period_length in 1u64..500,
            start in 0u64..100_000,
            step in 0u64..10_000,
        ) {
            let period = PeriodState::new(period_length, Fixed12::ZERO, Fixed12::ZERO).unwrap();
            if period.need_rebase(start) {
                prop_assert!(period.need_rebase(start + step));
            }
        }
    }
}
