//! # Oracle Module
//!
//! The request gate that rate-limits oracle data requests, the store that
//! holds the latest delivered observation, and the feed interface used to
//! signal the external oracle.

pub mod feed;
pub mod gate;
pub mod store;

pub use feed::*;
pub use gate::*;
pub use store::*;
