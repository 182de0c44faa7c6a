//! BB84 quantum key distribution simulation engine.
//!
//! A sans-IO model of the BB84 protocol for demonstrations: a sender
//! prepares photons in random bases, an optional eavesdropper measures them
//! in transit, the receiver measures in random bases, and the positions where
//! sender and receiver bases agree form the sifted key.
//!
//! ## Architecture
//!
//! ```text
//! bb84-core
//!   ├─ qubit       (Basis, QubitValue)
//!   ├─ channel     (random draws + collapse rule)
//!   ├─ record      (one transmission, interception rewrite)
//!   ├─ session     (records, sifted key, lifecycle state machine)
//!   ├─ snapshot    (statistics and owned views)
//!   ├─ scheduler   (one-shot timer contract)
//!   ├─ env         (time + randomness abstraction)
//!   └─ controller  (events in, actions out, timer lease)
//! ```
//!
//! Drivers own the clock: the harness drives a virtual one, the binary a
//! tokio one. Neither the engine nor its tests touch real time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod controller;
pub mod env;
pub mod error;
pub mod event;
pub mod qubit;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod snapshot;
#[cfg(test)]
mod test_utils;

pub use config::{DEFAULT_TICK_INTERVAL, SessionConfig};
pub use controller::Controller;
pub use env::Environment;
pub use error::{ControllerError, EntropyError};
pub use event::{ControllerAction, ControllerEvent};
pub use qubit::{Basis, QubitValue};
pub use record::{Interception, TransmissionRecord};
pub use scheduler::{Scheduler, TimerId};
pub use session::{
    IgnoreReason, Session, SessionState, SiftedKey, TRANSMISSIONS_PER_SESSION, Transition,
};
pub use snapshot::{SessionSnapshot, SessionStats};
