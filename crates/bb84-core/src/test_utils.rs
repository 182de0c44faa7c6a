//! Deterministic test doubles shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use crate::{
    env::Environment,
    error::EntropyError,
    scheduler::{Scheduler, TimerId},
};

/// Environment that replays a fixed script of random bytes.
///
/// Each byte drives one draw: basis and value draws read its low bit, an
/// incompatible measurement reads it modulo 4 (`Zero`, `One`, `Plus`,
/// `Minus`). Running past the end of the script reports
/// `EntropyError::Exhausted`.
#[derive(Clone)]
pub struct ScriptedEnv {
    bytes: Arc<Mutex<VecDeque<u8>>>,
    epoch: Instant,
}

impl ScriptedEnv {
    pub fn new(bytes: impl IntoIterator<Item = u8>) -> Self {
        Self { bytes: Arc::new(Mutex::new(bytes.into_iter().collect())), epoch: Instant::now() }
    }

    /// Append more bytes to the script.
    pub fn push(&self, bytes: impl IntoIterator<Item = u8>) {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).extend(bytes);
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Environment for ScriptedEnv {
    type Instant = Duration;

    fn now(&self) -> Self::Instant {
        self.epoch.elapsed()
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let mut script = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        if script.len() < buffer.len() {
            script.clear();
            return Err(EntropyError::Exhausted);
        }
        for byte in buffer.iter_mut() {
            *byte = script.pop_front().unwrap_or_default();
        }
        Ok(())
    }
}

/// Scheduler that records requests without any notion of time.
///
/// Tests fire timers by feeding `pending()` back to the controller.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    next_id: u64,
    pending: Vec<(TimerId, Duration)>,
    cancelled: Vec<TimerId>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers scheduled and neither fired nor cancelled.
    pub fn pending(&self) -> Vec<TimerId> {
        self.pending.iter().map(|(id, _)| *id).collect()
    }

    /// Delay requested for the only pending timer.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.first().map(|(_, after)| *after)
    }

    /// Timers cancelled so far, in order.
    pub fn cancelled(&self) -> &[TimerId] {
        &self.cancelled
    }

    /// Remove `timer` from the pending set as if it had expired.
    pub fn expire(&mut self, timer: TimerId) {
        self.pending.retain(|(id, _)| *id != timer);
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule(&mut self, after: Duration) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id += 1;
        self.pending.push((id, after));
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        let before = self.pending.len();
        self.pending.retain(|(id, _)| *id != timer);
        if self.pending.len() != before {
            self.cancelled.push(timer);
        }
    }
}
