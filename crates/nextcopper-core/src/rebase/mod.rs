//! # Rebase Module
//!
//! Elasticity computation, the pluggable supply/reward policy, and the engine
//! that commits a rebase atomically.

pub mod elasticity;
pub mod engine;
pub mod policy;

pub use elasticity::*;
pub use engine::*;
pub use policy::*;
