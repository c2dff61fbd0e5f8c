//! # Core Error Types
//!
//! Errors surfaced synchronously by the rebase engine. The three gate
//! failures are recoverable; arithmetic failures are fatal invariant
//! violations and are reported distinctly.

use thiserror::Error;

/// Core engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebaseError {
    // ========================================================================
    // Gate Errors (recoverable)
    // ========================================================================

    #[error("Already rebased")]
    AlreadyRebased,

    #[error("Oracle invalid data")]
    OracleInvalidData,

    #[error("Oracle request not due")]
    RequestNotDue,

    // ========================================================================
    // Math Errors (fatal)
    // ========================================================================

    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Conversion error")]
    ConversionError,

    // ========================================================================
    // Configuration and Collaborator Errors
    // ========================================================================

    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("Oracle feed unavailable: {0}")]
    FeedUnavailable(String),
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, RebaseError>;

impl RebaseError {
    /// Gate failures the caller resolves by re-checking a predicate later
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRebased | Self::OracleInvalidData | Self::RequestNotDue
        )
    }

    /// Fixed-point invariant violations
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MathOverflow | Self::MathUnderflow | Self::DivisionByZero | Self::ConversionError
        )
    }

    /// Create a feed unavailable error with reason
    pub fn feed_unavailable(reason: impl Into<String>) -> Self {
        Self::FeedUnavailable(reason.into())
    }
}
