//! Reference model for model-based testing.
//!
//! The model is a simplified implementation that captures the lifecycle of a
//! session without any random draws. It serves as the oracle against which
//! the real controller is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod session;

pub use operation::{Operation, OperationResult};
pub use session::{ModelSession, ObservableState};
