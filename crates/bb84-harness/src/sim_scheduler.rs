//! Virtual-time scheduler.
//!
//! `ManualScheduler` only records deadlines. Nothing fires on its own: the
//! driver asks for the earliest due timer, moves the clock there, and hands
//! the expiry to the controller.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use bb84_core::{Scheduler, TimerId};

use crate::sim_env::{SimClock, SimInstant};

#[derive(Debug, Default)]
struct Timers {
    next_id: u64,
    pending: BTreeMap<TimerId, SimInstant>,
    cancelled: u64,
}

/// Scheduler over a [`SimClock`].
///
/// Clones share the same timer table, so a test can keep a handle while the
/// controller owns another.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    timers: Arc<Mutex<Timers>>,
    clock: SimClock,
}

impl ManualScheduler {
    /// Scheduler measuring deadlines against `clock`.
    pub fn new(clock: SimClock) -> Self {
        Self { timers: Arc::new(Mutex::new(Timers::default())), clock }
    }

    /// Earliest pending timer and its deadline. Ties go to the older timer.
    pub fn next_deadline(&self) -> Option<(SimInstant, TimerId)> {
        self.lock().pending.iter().map(|(id, at)| (*at, *id)).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&self, now: SimInstant) -> Option<TimerId> {
        let (at, id) = self.next_deadline()?;
        if at > now {
            return None;
        }
        self.lock().pending.remove(&id);
        Some(id)
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of successful cancellations so far.
    pub fn cancelled_count(&self) -> u64 {
        self.lock().cancelled
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, after: Duration) -> TimerId {
        let deadline = self.clock.now().after(after);
        let mut timers = self.lock();
        let id = TimerId::new(timers.next_id);
        timers.next_id += 1;
        timers.pending.insert(id, deadline);
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        let mut timers = self.lock();
        if timers.pending.remove(&timer).is_some() {
            timers.cancelled += 1;
        }
    }
}
