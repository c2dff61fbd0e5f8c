//! Wall-clock block height for the live keeper.

use chrono::{DateTime, TimeZone, Utc};
use nextcopper_core::{BlockHeight, Clock, Timestamp};

use crate::config::ClockConfig;
use crate::error::{KeeperError, KeeperResult};

/// Derives block height from elapsed time at a fixed block time
#[derive(Debug, Clone)]
pub struct WallClock {
    genesis: DateTime<Utc>,
    block_time_ms: u64,
}

impl WallClock {
    pub fn new(genesis: DateTime<Utc>, block_time_ms: u64) -> KeeperResult<Self> {
        if block_time_ms == 0 {
            return Err(KeeperError::InvalidConfig("block_time_ms must be greater than 0".to_string()));
        }
        Ok(Self { genesis, block_time_ms })
    }

    pub fn from_config(config: &ClockConfig) -> KeeperResult<Self> {
        let genesis = match config.genesis_time {
            Some(timestamp) => Utc
                .timestamp_opt(timestamp, 0)
                .single()
                .ok_or_else(|| KeeperError::InvalidConfig(format!("genesis_time {} is out of range", timestamp)))?,
            None => {
                log::warn!("No genesis_time configured, block 0 is the keeper start time");
                Utc::now()
            }
        };
        Self::new(genesis, config.block_time_ms)
    }

    pub fn genesis(&self) -> DateTime<Utc> {
        self.genesis
    }

    /// Height at an arbitrary instant; 0 before genesis
    pub fn height_at(&self, at: DateTime<Utc>) -> BlockHeight {
        let elapsed_ms = (at - self.genesis).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0;
        }
        elapsed_ms as u64 / self.block_time_ms
    }
}

impl Clock for WallClock {
    fn current_block_height(&self) -> BlockHeight {
        self.height_at(Utc::now())
    }

    fn current_time(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}
