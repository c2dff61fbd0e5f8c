//! # NextCopper Core - Elastic Supply Rebase Logic
//!
//! This crate contains the pure decision and computation logic behind the
//! NextCopper elastic-supply ledger. It provides:
//!
//! - The period tracker deciding when a rebase is due
//! - The rate-limited oracle request gate and the oracle data store
//! - 12-decimal fixed-point elasticity math and pluggable rebase policies
//! - The elastic balance ledger that rescales holders after each rebase
//!
//! Nothing here performs I/O. Callers supply the block-height clock and the
//! wall-clock time, and re-evaluate the predicates after each clock advance or
//! oracle delivery.
//!
//! ## Feature Flags
//!
//! - `persist`: Enables serde serialization of the persisted state

pub mod clock;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod math;
pub mod oracle;
pub mod period;
pub mod rebase;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use clock::{Clock, ManualClock};
pub use errors::{CoreResult, RebaseError};
pub use ledger::ElasticLedger;
pub use math::{Fixed12, SignedFixed12};
pub use oracle::{OracleFeed, OracleObservation, OracleRequest, OracleRequestState, RecordingFeed, WindowRule};
pub use period::PeriodState;
pub use rebase::{
    ElasticityPolicy, ElasticityReading, PriceDirection, PriceDirectionPolicy, RebaseAdjustment,
    RebaseEngine, RebaseOutcome, RebasePolicy,
};
pub use state::{ElasticState, GenesisParams};
pub use types::*;
