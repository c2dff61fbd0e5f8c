//! # Elastic Balance Ledger
//!
//! Scales every holder's balance by the ratio of new to old total supply. Each
//! scaled balance truncates; the accumulated remainder is credited to the
//! largest holder so that `sum(balances) == total_supply` holds exactly after
//! every rebase.

use std::collections::BTreeMap;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, RebaseError};
use crate::math::{mul_div_u128, Fixed12, SignedFixed12};
use crate::types::AccountId;

/// Total supply and per-holder balances
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct ElasticLedger {
    total_supply: Fixed12,
    balances: BTreeMap<AccountId, Fixed12>,
}

impl ElasticLedger {
    /// Build the genesis ledger; repeated accounts accumulate
    pub fn genesis<I>(allocations: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (AccountId, Fixed12)>,
    {
        let mut ledger = Self::default();
        for (account, amount) in allocations {
            let balance = ledger.balances.entry(account).or_default();
            *balance = balance.checked_add(amount)?;
            ledger.total_supply = ledger.total_supply.checked_add(amount)?;
        }
        Ok(ledger)
    }

    pub fn total_supply(&self) -> Fixed12 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &AccountId) -> Fixed12 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, &Fixed12)> {
        self.balances.iter()
    }

    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// `sum(balances) == total_supply`
    pub fn is_consistent(&self) -> bool {
        self.balances
            .values()
            .try_fold(Fixed12::ZERO, |sum, balance| sum.checked_add(*balance).ok())
            .map_or(false, |sum| sum == self.total_supply)
    }

    /// Largest balance; ties go to the smallest account id
    fn largest_holder(&self) -> Option<AccountId> {
        let mut largest: Option<(&AccountId, Fixed12)> = None;
        for (account, balance) in &self.balances {
            match largest {
                Some((_, max)) if *balance <= max => {}
                _ => largest = Some((account, *balance)),
            }
        }
        largest.map(|(account, _)| account.clone())
    }

    /// The ledger after applying `delta` to total supply, without mutating self
    pub fn rescaled(&self, delta: SignedFixed12) -> CoreResult<Self> {
        let old_total = self.total_supply;
        let new_total = old_total.checked_add_signed(delta)?;

        if delta.is_zero() {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.total_supply = new_total;

        if old_total.is_zero() {
            // Nothing to scale: the whole new supply goes to the largest holder
            let holder = self
                .largest_holder()
                .ok_or(RebaseError::InvalidParameter("ledger has no holders to receive supply"))?;
            next.balances.insert(holder, new_total);
            return Ok(next);
        }

        let mut distributed = Fixed12::ZERO;
        for balance in next.balances.values_mut() {
            let scaled = mul_div_u128(balance.raw(), new_total.raw(), old_total.raw())?;
            *balance = Fixed12::from_raw(scaled);
            distributed = distributed.checked_add(*balance)?;
        }

        let remainder = new_total.checked_sub(distributed)?;
        if !remainder.is_zero() {
            if let Some(holder) = next.largest_holder() {
                let balance = next.balances.entry(holder).or_default();
                *balance = balance.checked_add(remainder)?;
            }
        }

        log::debug!(
            "Rescaled {} holders: supply {} -> {} (remainder {})",
            next.balances.len(),
            old_total,
            new_total,
            remainder
        );
        Ok(next)
    }

    /// Apply a supply delta to every holder in one step
    pub fn apply_rebase(&mut self, delta: SignedFixed12) -> CoreResult<()> {
        *self = self.rescaled(delta)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn account(id: &str) -> AccountId {
        AccountId::from(id)
    }

    #[test]
    fn test_genesis_accumulates() {
        let ledger = ElasticLedger::genesis(vec![
            (account("alice"), Fixed12::from_int(10)),
            (account("bob"), Fixed12::from_int(5)),
            (account("alice"), Fixed12::from_int(1)),
        ])
        .unwrap();

        assert_eq!(ledger.total_supply(), Fixed12::from_int(16));
        assert_eq!(ledger.balance_of(&account("alice")), Fixed12::from_int(11));
        assert_eq!(ledger.balance_of(&account("carol")), Fixed12::ZERO);
        assert_eq!(ledger.holder_count(), 2);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_single_holder_tracks_supply_exactly() {
        let mut ledger = ElasticLedger::genesis(vec![(account("treasury"), Fixed12::from_int(7_000_000))]).unwrap();
        ledger
            .apply_rebase(SignedFixed12::negative(Fixed12::from_int(10_800)).unwrap())
            .unwrap();

        assert_eq!(ledger.total_supply(), Fixed12::from_int(6_989_200));
        assert_eq!(ledger.balance_of(&account("treasury")), Fixed12::from_int(6_989_200));
    }

    #[test]
    fn test_remainder_goes_to_largest_holder() {
        let mut ledger = ElasticLedger::genesis(vec![
            (account("a"), Fixed12::from_raw(1)),
            (account("b"), Fixed12::from_raw(1)),
            (account("c"), Fixed12::from_raw(2)),
        ])
        .unwrap();

        // 4 -> 5: scaled 1, 1, 2 (2.5 truncated), remainder 1 to "c"
        ledger.apply_rebase(SignedFixed12::from_raw(1)).unwrap();
        assert_eq!(ledger.balance_of(&account("a")).raw(), 1);
        assert_eq!(ledger.balance_of(&account("b")).raw(), 1);
        assert_eq!(ledger.balance_of(&account("c")).raw(), 3);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_tie_goes_to_smallest_account() {
        let mut ledger = ElasticLedger::genesis(vec![
            (account("b"), Fixed12::from_raw(1)),
            (account("a"), Fixed12::from_raw(1)),
        ])
        .unwrap();

        // 2 -> 3: both scale to 1, remainder 1
        ledger.apply_rebase(SignedFixed12::from_raw(1)).unwrap();
        assert_eq!(ledger.balance_of(&account("a")).raw(), 2);
        assert_eq!(ledger.balance_of(&account("b")).raw(), 1);
    }

    #[test]
    fn test_contraction_below_zero_fails_without_change() {
        let ledger = ElasticLedger::genesis(vec![(account("a"), Fixed12::from_int(1))]).unwrap();
        let result = ledger.rescaled(SignedFixed12::negative(Fixed12::from_int(2)).unwrap());
        assert_eq!(result, Err(RebaseError::MathUnderflow));
        assert_eq!(ledger.total_supply(), Fixed12::from_int(1));
    }

    #[test]
    fn test_expansion_from_zero_supply() {
        let mut ledger = ElasticLedger::genesis(vec![
            (account("a"), Fixed12::ZERO),
            (account("b"), Fixed12::ZERO),
        ])
        .unwrap();
        ledger.apply_rebase(SignedFixed12::positive(Fixed12::from_int(9)).unwrap()).unwrap();
        assert_eq!(ledger.balance_of(&account("a")), Fixed12::from_int(9));
        assert!(ledger.is_consistent());

        let mut empty = ElasticLedger::default();
        let result = empty.apply_rebase(SignedFixed12::positive(Fixed12::ONE).unwrap());
        assert!(matches!(result, Err(RebaseError::InvalidParameter(_))));
    }

    proptest! {
        #[test]
        fn prop_rescale_preserves_sum(
            balances in proptest::collection::vec(0u128..1_000_000_000_000_000_000_000, 1..20),
            delta in -1_000_000_000_000_000_000i128..1_000_000_000_000_000_000_000,
        ) {
            let ledger = ElasticLedger::genesis(
                balances
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| (AccountId::new(format!("holder-{}", i)), Fixed12::from_raw(*raw))),
            )
            .unwrap();

            match ledger.rescaled(SignedFixed12::from_raw(delta)) {
                Ok(next) => {
                    prop_assert!(next.is_consistent());
                    prop_assert_eq!(next.holder_count(), ledger.holder_count());
                }
                Err(err) => {
                    // Only contraction past zero, or growth of an all-zero ledger
                    prop_assert!(matches!(err, RebaseError::MathUnderflow | RebaseError::InvalidParameter(_)));
                }
            }
        }
    }
}
