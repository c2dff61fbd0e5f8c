//! Signal path to the external oracle.

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;
use crate::types::{BlockHeight, PeriodIndex, Timestamp};

/// A request for the oracle to produce data for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub struct OracleRequest {
    pub period_index: PeriodIndex,
    pub block_height: BlockHeight,
    pub time: Timestamp,
}

/// Receiver of oracle requests. Delivery happens later, on the oracle's own
/// schedule, through the observation store.
pub trait OracleFeed {
    fn request_data(&mut self, request: &OracleRequest) -> CoreResult<()>;
}

impl<F: OracleFeed + ?Sized> OracleFeed for Box<F> {
    fn request_data(&mut self, request: &OracleRequest) -> CoreResult<()> {
        (**self).request_data(request)
    }
}

/// Feed that only records the requests it was sent
#[derive(Debug, Clone, Default)]
pub struct RecordingFeed {
    pub requests: Vec<OracleRequest>,
}

impl RecordingFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&OracleRequest> {
        self.requests.last()
    }
}

impl OracleFeed for RecordingFeed {
    fn request_data(&mut self, request: &OracleRequest) -> CoreResult<()> {
        self.requests.push(*request);
        Ok(())
    }
}
