//! Scheduling contract between the controller and its driver.
//!
//! The controller never sleeps. While a session runs it asks the scheduler
//! for one callback at a time; the driver owning the real (or virtual) clock
//! delivers each expiry back as [`crate::ControllerEvent::TimerFired`].
//!
//! ```text
//! Controller ──schedule(1s)──▶ Scheduler ──(1s later)──▶ Driver
//!     ▲                                                   │
//!     └───────────── handle(TimerFired(id)) ──────────────┘
//! ```
//!
//! Implementations must not call back into the controller from `schedule`
//! or `cancel`; expiries are always delivered by the driver loop, which keeps
//! ticks and intents strictly serialized.

use std::{fmt, time::Duration};

/// Identifier of one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// One-shot timer service.
///
/// # Invariants
///
/// - Every `TimerId` returned by `schedule` is unique for the lifetime of the
///   scheduler
/// - A cancelled timer is never delivered
/// - Cancelling an unknown, fired, or already cancelled timer is a no-op
pub trait Scheduler {
    /// Arrange for a single expiry after `after`.
    fn schedule(&mut self, after: Duration) -> TimerId;

    /// Cancel a pending expiry.
    fn cancel(&mut self, timer: TimerId);
}
