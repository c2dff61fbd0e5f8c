//! # Oracle Request Gate
//!
//! Rate-limits oracle data requests with a block-count window and a
//! wall-clock window measured from the last request. The gate is global, not
//! per period, and a period with a delivered observation is never requested
//! again.

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REQUEST_BLOCK_LIMIT, DEFAULT_REQUEST_PERIOD_LIMIT};
use crate::errors::{CoreResult, RebaseError};
use crate::oracle::feed::{OracleFeed, OracleRequest};
use crate::oracle::store::OracleObservation;
use crate::period::PeriodState;
use crate::types::{BlockHeight, PeriodIndex, Seconds, Timestamp};

/// How the block-count and time windows combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persist", serde(rename_all = "snake_case"))]
pub enum WindowRule {
    /// Both windows must have elapsed
    #[default]
    Both,
    /// Either window having elapsed is enough
    Either,
}

/// Rate-limit state of the request gate
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct OracleRequestState {
    /// Height of the last request
    pub last_request_block: BlockHeight,
    /// Timestamp of the last request
    pub last_request_time: Timestamp,
    /// Minimum blocks between requests
    pub block_count_limit: u64,
    /// Minimum seconds between requests
    pub period_limit: Seconds,
    /// Window combination rule
    pub window_rule: WindowRule,
    /// Period targeted by the last request, `None` if never requested
    pub requested_period_index: Option<PeriodIndex>,
}

impl Default for OracleRequestState {
    fn default() -> Self {
        Self {
            last_request_block: 0,
            last_request_time: 0,
            block_count_limit: DEFAULT_REQUEST_BLOCK_LIMIT,
            period_limit: DEFAULT_REQUEST_PERIOD_LIMIT,
            window_rule: WindowRule::default(),
            requested_period_index: None,
        }
    }
}

impl OracleRequestState {
    pub fn new(block_count_limit: u64, period_limit: Seconds, window_rule: WindowRule) -> CoreResult<Self> {
        let mut state = Self {
            window_rule,
            ..Self::default()
        };
        state.set_block_count_limit(block_count_limit);
        state.set_period_limit(period_limit)?;
        Ok(state)
    }

    pub fn set_block_count_limit(&mut self, limit: u64) {
        self.block_count_limit = limit;
    }

    pub fn set_period_limit(&mut self, limit: Seconds) -> CoreResult<()> {
        if limit < 0 {
            return Err(RebaseError::InvalidParameter("request period limit must not be negative"));
        }
        self.period_limit = limit;
        Ok(())
    }

    pub fn has_requested(&self) -> bool {
        self.requested_period_index.is_some()
    }

    /// True if no request was ever made, or the rate-limit windows re-opened
    pub fn windows_elapsed(&self, height: BlockHeight, time: Timestamp) -> bool {
        if !self.has_requested() {
            return true;
        }

        let blocks_elapsed = height.saturating_sub(self.last_request_block) >= self.block_count_limit;
        let time_elapsed = time.saturating_sub(self.last_request_time) >= self.period_limit;

        match self.window_rule {
            WindowRule::Both => blocks_elapsed && time_elapsed,
            WindowRule::Either => blocks_elapsed || time_elapsed,
        }
    }

    fn record(&mut self, request: &OracleRequest) {
        self.last_request_block = request.block_height;
        self.last_request_time = request.time;
        self.requested_period_index = Some(request.period_index);
    }
}

/// Whether a new oracle request may be issued now
pub fn need_request_oracle(
    period: &PeriodState,
    request: &OracleRequestState,
    observation: &OracleObservation,
    height: BlockHeight,
    time: Timestamp,
) -> bool {
    period.need_rebase(height)
        && !observation.is_present_for(period.current_period_index(height))
        && request.windows_elapsed(height, time)
}

/// Signal the oracle for the current period and record the request.
/// Nothing is recorded if the gate is closed or the feed refuses the signal.
pub fn request_oracle_data<F: OracleFeed + ?Sized>(
    period: &PeriodState,
    request: &mut OracleRequestState,
    observation: &OracleObservation,
    height: BlockHeight,
    time: Timestamp,
    feed: &mut F,
) -> CoreResult<OracleRequest> {
    if !need_request_oracle(period, request, observation, height, time) {
        return Err(RebaseError::RequestNotDue);
    }

    let signal = OracleRequest {
        period_index: period.current_period_index(height),
        block_height: height,
        time,
    };
    feed.request_data(&signal)?;
    request.record(&signal);

    log::info!(
        "Requested oracle data for period {} at block {}",
        signal.period_index, signal.block_height
    );
    Ok(signal)
}
