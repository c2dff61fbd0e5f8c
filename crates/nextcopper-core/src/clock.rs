//! # External Clock
//!
//! The engine never reads time on its own. A `Clock` supplies the monotonic
//! block height and the wall-clock timestamp; `ManualClock` is the
//! hand-advanced implementation used by tests and deterministic replays.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::{BlockHeight, Seconds, Timestamp};

/// Source of block height and wall-clock time
pub trait Clock {
    fn current_block_height(&self) -> BlockHeight;
    fn current_time(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn current_block_height(&self) -> BlockHeight {
        (**self).current_block_height()
    }

    fn current_time(&self) -> Timestamp {
        (**self).current_time()
    }
}

/// Clock advanced explicitly by the caller
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
    time: AtomicI64,
}

impl ManualClock {
    pub fn new(height: BlockHeight, time: Timestamp) -> Self {
        Self {
            height: AtomicU64::new(height),
            time: AtomicI64::new(time),
        }
    }

    /// Mine `blocks` empty blocks without moving time
    pub fn advance_blocks(&self, blocks: u64) -> BlockHeight {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }

    /// Move wall-clock time forward without mining
    pub fn advance_time(&self, seconds: Seconds) -> Timestamp {
        self.time.fetch_add(seconds, Ordering::SeqCst) + seconds
    }
}

impl Clock for ManualClock {
    fn current_block_height(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
