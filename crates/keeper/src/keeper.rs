use std::sync::Arc;

use nextcopper_core::{
    BlockHeight, Clock, ElasticState, OracleFeed, OracleRequest, RebaseEngine, RebaseOutcome, Timestamp,
};
use tokio::sync::Mutex;

use crate::error::{KeeperError, KeeperResult};
use crate::store::StateStore;

/// Engine state shared between the keeper loop and the oracle task
pub type SharedState = Arc<Mutex<ElasticState>>;

/// What one keeper tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub block_height: BlockHeight,
    pub time: Timestamp,
    pub requested: Option<OracleRequest>,
    pub rebased: Option<RebaseOutcome>,
}

impl TickReport {
    pub fn changed_state(&self) -> bool {
        self.requested.is_some() || self.rebased.is_some()
    }
}

/// Main keeper service: re-evaluates the rebase predicates on every tick,
/// commits a ready rebase and signals the oracle when a request is due
pub struct Keeper<C, F> {
    /// Engine state, shared with the oracle task
    state: SharedState,

    /// Rebase engine with the configured policy
    engine: RebaseEngine,

    /// Block height and time source
    clock: C,

    /// Where oracle requests are sent
    feed: F,

    /// Snapshot written after every state change
    store: Option<StateStore>,

    /// Dry run mode flag
    dry_run: bool,
}

impl<C: Clock, F: OracleFeed> Keeper<C, F> {
    pub fn new(
        state: SharedState,
        engine: RebaseEngine,
        clock: C,
        feed: F,
        store: Option<StateStore>,
        dry_run: bool,
    ) -> Self {
        Self {
            state,
            engine,
            clock,
            feed,
            store,
            dry_run,
        }
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn engine(&self) -> &RebaseEngine {
        &self.engine
    }

    /// One pass over the predicates under a single lock
    pub async fn tick(&mut self) -> KeeperResult<TickReport> {
        let block_height = self.clock.current_block_height();
        let time = self.clock.current_time();
        let mut state = self.state.lock().await;

        let mut report = TickReport {
            block_height,
            time,
            requested: None,
            rebased: None,
        };

        if state.is_rebase_ready(block_height) {
            if self.dry_run {
                let preview = self.engine.preview(&state, block_height)?;
                log::info!(
                    "DRY RUN: Would rebase period {}: supply {} -> {}",
                    preview.period_index, preview.supply_before, preview.supply_after
                );
            } else {
                report.rebased = Some(self.engine.rebase(&mut state, block_height)?);
            }
        }

        if state.need_request_oracle(block_height, time) {
            if self.dry_run {
                log::info!(
                    "DRY RUN: Would request oracle data for period {}",
                    state.current_period_index(block_height)
                );
            } else {
                report.requested = Some(state.request_oracle_data(block_height, time, &mut self.feed)?);
            }
        }

        if report.changed_state() {
            if let Some(store) = &self.store {
                store.save(&state)?;
            }
        }

        Ok(report)
    }

    /// Ledger invariant and clock sanity
    pub async fn health_check(&self) -> KeeperResult<()> {
        let state = self.state.lock().await;

        if !state.ledger().is_consistent() {
            return Err(KeeperError::StateError(
                "balances do not sum to total supply".to_string(),
            ));
        }

        let block_height = self.clock.current_block_height();
        if block_height < state.period().last_rebase_block() {
            return Err(KeeperError::StateError(format!(
                "clock at block {} is behind the last rebase at block {}",
                block_height, state.period().last_rebase_block()
            )));
        }

        log::info!(
            "Health: block {}, period {}, {} rebases, supply {}, reward rate {}",
            block_height,
            state.current_period_index(block_height),
            state.period().rebase_count(),
            state.total_supply(),
            state.block_reward_rate()
        );
        Ok(())
    }
}
