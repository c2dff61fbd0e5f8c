//! # Persisted Elastic State
//!
//! `ElasticState` is the complete persisted layout: period bookkeeping, the
//! request gate, the latest oracle observation, the ledger and the reward
//! rate. Predicates and setters live here; the only writer of the baseline,
//! the ledger and the reward rate is `RebaseEngine::rebase`.

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PERIOD_LENGTH, DEFAULT_REQUEST_BLOCK_LIMIT, DEFAULT_REQUEST_PERIOD_LIMIT, GENESIS_BASELINE_PRICE, GENESIS_BASELINE_QUANTITY,
    GENESIS_BLOCK_REWARD_RATE, GENESIS_TOTAL_SUPPLY, REFERENCE_PERIOD_LENGTH, REFERENCE_REQUEST_BLOCK_LIMIT,
    REFERENCE_REQUEST_PERIOD_LIMIT,
};
use crate::errors::CoreResult;
use crate::ledger::ElasticLedger;
use crate::math::Fixed12;
use crate::oracle::{self, OracleFeed, OracleObservation, OracleRequest, OracleRequestState, WindowRule};
use crate::period::PeriodState;
use crate::types::{AccountId, BlockHeight, PeriodIndex, Seconds, Timestamp};

/// Parameters fixed at genesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisParams {
    pub period_length: u64,
    pub baseline_quantity: Fixed12,
    pub baseline_price: Fixed12,
    pub block_reward_rate: Fixed12,
    pub block_count_limit: u64,
    pub request_period_limit: Seconds,
    pub window_rule: WindowRule,
    pub allocations: Vec<(AccountId, Fixed12)>,
}

impl GenesisParams {
    /// Reference deployment: 50-block periods, 20 block / 60 s request
    /// windows where either one re-opens the gate, baseline 200,000 @ 1.41,
    /// and the whole 7,000,000 supply held by `holder`.
    pub fn reference(holder: AccountId) -> Self {
        Self {
            period_length: REFERENCE_PERIOD_LENGTH,
            baseline_quantity: Fixed12::from_raw(GENESIS_BASELINE_QUANTITY),
            baseline_price: Fixed12::from_raw(GENESIS_BASELINE_PRICE),
            block_reward_rate: Fixed12::from_raw(GENESIS_BLOCK_REWARD_RATE),
            block_count_limit: REFERENCE_REQUEST_BLOCK_LIMIT,
            request_period_limit: REFERENCE_REQUEST_PERIOD_LIMIT,
            window_rule: WindowRule::Either,
            allocations: vec![(holder, Fixed12::from_raw(GENESIS_TOTAL_SUPPLY))],
        }
    }
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            period_length: DEFAULT_PERIOD_LENGTH,
            block_count_limit: DEFAULT_REQUEST_BLOCK_LIMIT,
            request_period_limit: DEFAULT_REQUEST_PERIOD_LIMIT,
            window_rule: WindowRule::default(),
            ..Self::reference(AccountId::from("treasury"))
        }
    }
}

/// Everything the engine persists between calls
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct ElasticState {
    pub(crate) period: PeriodState,
    pub request: OracleRequestState,
    pub observation: OracleObservation,
    pub(crate) ledger: ElasticLedger,
    pub(crate) block_reward_rate: Fixed12,
}

impl ElasticState {
    pub fn genesis(params: GenesisParams) -> CoreResult<Self> {
        let period = PeriodState::new(params.period_length, params.baseline_quantity, params.baseline_price)?;
        let request = OracleRequestState::new(
            params.block_count_limit,
            params.request_period_limit,
            params.window_rule,
        )?;
        let ledger = ElasticLedger::genesis(params.allocations)?;

        log::info!(
            "Genesis: period_length={}, baseline {} @ {}, supply {}, {} holders",
            period.period_length,
            period.baseline_quantity,
            period.baseline_price,
            ledger.total_supply(),
            ledger.holder_count()
        );

        Ok(Self {
            period,
            request,
            observation: OracleObservation::default(),
            ledger,
            block_reward_rate: params.block_reward_rate,
        })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn need_rebase(&self, height: BlockHeight) -> bool {
        self.period.need_rebase(height)
    }

    pub fn need_request_oracle(&self, height: BlockHeight, time: Timestamp) -> bool {
        oracle::need_request_oracle(&self.period, &self.request, &self.observation, height, time)
    }

    pub fn is_rebase_ready(&self, height: BlockHeight) -> bool {
        oracle::is_rebase_ready(&self.period, &self.observation, height)
    }

    pub fn current_period_index(&self, height: BlockHeight) -> PeriodIndex {
        self.period.current_period_index(height)
    }

    pub fn rebased_this_period(&self, height: BlockHeight) -> bool {
        self.period.rebased_this_period(height)
    }

    /// `(quantity, price)` recorded by the last rebase
    pub fn current_baseline(&self) -> (Fixed12, Fixed12) {
        self.period.baseline()
    }

    /// Period bookkeeping; read-only outside the engine
    pub fn period(&self) -> &PeriodState {
        &self.period
    }

    pub fn ledger(&self) -> &ElasticLedger {
        &self.ledger
    }

    pub fn observation(&self) -> &OracleObservation {
        &self.observation
    }

    pub fn block_reward_rate(&self) -> Fixed12 {
        self.block_reward_rate
    }

    pub fn total_supply(&self) -> Fixed12 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: &AccountId) -> Fixed12 {
        self.ledger.balance_of(account)
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Store an oracle delivery, replacing any previous one
    pub fn deliver_observation(&mut self, period_index: PeriodIndex, quantity: Fixed12, price: Fixed12) {
        self.observation.deliver(period_index, quantity, price);
    }

    pub fn request_oracle_data<F: OracleFeed + ?Sized>(
        &mut self,
        height: BlockHeight,
        time: Timestamp,
        feed: &mut F,
    ) -> CoreResult<OracleRequest> {
        oracle::request_oracle_data(&self.period, &mut self.request, &self.observation, height, time, feed)
    }

    pub fn set_block_count_limit(&mut self, limit: u64) {
        self.request.set_block_count_limit(limit);
    }

    pub fn set_period_limit(&mut self, limit: Seconds) -> CoreResult<()> {
        self.request.set_period_limit(limit)
    }
}
