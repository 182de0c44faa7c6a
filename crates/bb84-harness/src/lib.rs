//! Deterministic simulation harness for BB84 engine testing.
//!
//! Virtual-time implementations of the `Environment` and `Scheduler` traits
//! for deterministic, reproducible runs: a seeded ChaCha RNG stands in for
//! the entropy source and a manual timer wheel stands in for the clock.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and real implementation,
//! and their observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_scheduler;

pub use model::{ModelSession, ObservableState, Operation, OperationResult};
pub use sim_driver::SimDriver;
pub use sim_env::{SimClock, SimEnv, SimInstant};
pub use sim_scheduler::ManualScheduler;
