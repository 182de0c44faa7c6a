//! Terminal front end for the BB84 simulation engine.
//!
//! This crate provides the production runtime using:
//! - Tokio for the clock and the driver loop
//! - The OS random source, or a seeded ChaCha stream for replays
//! - Plain-text rendering of the record table and key
//!
//! ## Architecture
//!
//! ```text
//! bb84-cli
//!   ├─ SystemEnv / SeededEnv  (production Environment impls)
//!   ├─ TokioScheduler         (sleep tasks feeding a channel)
//!   ├─ Driver                 (select loop over ticks and stdin)
//!   └─ render                 (table, summary, action lines)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod error;
pub mod render;
mod scheduler;
mod system_env;

pub use driver::{Command, Driver};
pub use error::CliError;
pub use scheduler::{TimerReceiver, TokioScheduler};
pub use system_env::{SeededEnv, SystemEnv};
