//! Oracle side of the keeper: requests leave the engine through a channel
//! and a scheduled oracle task answers them by delivering into the shared
//! state on its own schedule.

use std::time::Duration;

use nextcopper_core::{CoreResult, Fixed12, OracleFeed, OracleRequest, RebaseError};
use tokio::sync::mpsc;

use crate::config::OracleConfig;
use crate::error::{KeeperError, KeeperResult};
use crate::keeper::SharedState;
use crate::store::StateStore;

/// Feed that forwards requests to the oracle task
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    sender: mpsc::UnboundedSender<OracleRequest>,
}

impl ChannelFeed {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OracleRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl OracleFeed for ChannelFeed {
    fn request_data(&mut self, request: &OracleRequest) -> CoreResult<()> {
        self.sender
            .send(*request)
            .map_err(|_| RebaseError::feed_unavailable("oracle task has stopped"))
    }
}

/// Answers each request with the next `(quantity, price)` from a fixed list
#[derive(Debug, Clone)]
pub struct ScheduledOracle {
    schedule: Vec<(Fixed12, Fixed12)>,
    next: usize,
}

impl ScheduledOracle {
    pub fn new(schedule: Vec<(Fixed12, Fixed12)>) -> KeeperResult<Self> {
        if schedule.is_empty() {
            return Err(KeeperError::OracleError("schedule is empty".to_string()));
        }
        Ok(Self { schedule, next: 0 })
    }

    pub fn from_config(config: &OracleConfig) -> KeeperResult<Self> {
        Self::new(config.schedule.iter().map(|o| (o.quantity, o.price)).collect())
    }

    /// Next observation, wrapping around at the end of the schedule
    pub fn next_observation(&mut self) -> (Fixed12, Fixed12) {
        let observation = self.schedule[self.next];
        self.next = (self.next + 1) % self.schedule.len();
        observation
    }
}

/// Runs until every `ChannelFeed` is dropped. A request for a period that
/// already has data is skipped so the schedule is not consumed twice.
/// Each delivery is saved to `store` so a restart before the rebase keeps it.
pub async fn run_scheduled_oracle(
    mut oracle: ScheduledOracle,
    mut requests: mpsc::UnboundedReceiver<OracleRequest>,
    state: SharedState,
    store: Option<StateStore>,
    delivery_delay: Duration,
) {
    while let Some(request) = requests.recv().await {
        if !delivery_delay.is_zero() {
            tokio::time::sleep(delivery_delay).await;
        }

        let mut state = state.lock().await;
        if state.observation().is_present_for(request.period_index) {
            log::debug!("Oracle already delivered period {}, skipping", request.period_index);
            continue;
        }

        let (quantity, price) = oracle.next_observation();
        state.deliver_observation(request.period_index, quantity, price);
        log::info!(
            "Oracle delivered period {}: quantity={}, price={}",
            request.period_index, quantity, price
        );

        if let Some(store) = &store {
            if let Err(e) = store.save(&state) {
                log::error!("Failed to save delivery for period {}: {}", request.period_index, e);
            }
        }
    }

    log::info!("Oracle request channel closed, stopping oracle task");
}
