//! Engine error types.
//!
//! Ignored state-machine transitions are not errors; they are reported as
//! [`crate::Transition::Ignored`]. Errors here are reserved for conditions the
//! engine cannot continue through.

use thiserror::Error;

/// Failure of the environment's randomness source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    /// A finite source ran out of bytes.
    #[error("entropy source exhausted")]
    Exhausted,

    /// The OS or backing generator refused to produce bytes.
    #[error("entropy source unavailable: {reason}")]
    Unavailable {
        /// Description of the underlying failure.
        reason: String,
    },
}

/// Errors from controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The random source failed mid-operation.
    #[error("random source failed: {0}")]
    Entropy(#[from] EntropyError),

    /// Session configuration was rejected at construction.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the rejected setting.
        reason: String,
    },
}

impl ControllerError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Entropy failures leave the session without a usable random source and
    /// are never retried. Configuration errors can be fixed by the caller and
    /// the controller rebuilt.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Entropy(_) => true,
            Self::InvalidConfig { .. } => false,
        }
    }
}
