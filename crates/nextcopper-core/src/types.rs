//! Shared scalar aliases and the account identifier.

use std::fmt;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

/// Height reported by the external block clock
pub type BlockHeight = u64;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Duration in seconds
pub type Seconds = i64;

/// Rebase period number: `block_height / period_length`
pub type PeriodIndex = u64;

/// Ledger account identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persist", serde(transparent))]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
