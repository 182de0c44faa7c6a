//! Fuzz target for the [`Controller`] state machine
//!
//! Prevent corrupted sessions and leaked timers under arbitrary intent
//! sequences and a random source that may run dry at any draw.
//!
//! # Strategy
//!
//! - Event sequences: Arbitrary starts, stops, resets, and eavesdropper
//!   toggles interleaved with timer expiries
//! - Stale expiries: Timer ids that were never armed, or already cancelled
//! - Finite entropy: Random bytes come from the fuzz input, so any draw can
//!   fail and exercise the fatal path
//!
//! # Invariants
//!
//! - At most 8 records; `Complete` iff all 8 exist
//! - A timer is armed iff the session is `Running`
//! - Sifted key is exactly the key bits of matched records, in order
//! - Every record is intercepted iff the eavesdropper flag is set
//! - Stale expiries change nothing
//! - A failed event leaves records and key untouched and the run stopped
//! - NEVER panic on any event sequence

#![no_main]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use arbitrary::Arbitrary;
use bb84_core::{
    Controller, ControllerEvent, EntropyError, Environment, SessionConfig, SessionState, TimerId,
    TRANSMISSIONS_PER_SESSION,
};
use bb84_harness::{ManualScheduler, SimClock, SimInstant};
use libfuzzer_sys::fuzz_target;

/// Environment replaying bytes taken from the fuzz input.
#[derive(Debug, Clone)]
struct FuzzEnv {
    bytes: Arc<Mutex<VecDeque<u8>>>,
    clock: SimClock,
}

impl Environment for FuzzEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        self.clock.now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        if bytes.len() < buffer.len() {
            bytes.clear();
            return Err(EntropyError::Exhausted);
        }
        for slot in buffer.iter_mut() {
            *slot = bytes.pop_front().unwrap_or_default();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzEvent {
    Start,
    Stop,
    Reset,
    SetEavesdropper { enabled: bool },
    /// Deliver the next due timer after advancing the clock.
    Advance { millis: u16 },
    /// Deliver an id the controller may not own.
    Stale { raw: u8 },
}

/// Fuzz input with an entropy pool and an event sequence.
#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    /// Tick interval in milliseconds (zero is rejected at construction).
    interval_ms: u16,
    /// Initial eavesdropper flag.
    eavesdropper: bool,
    /// Bytes the environment hands out.
    entropy: Vec<u8>,
    /// Event sequence to process.
    events: Vec<FuzzEvent>,
}

fuzz_target!(|input: FuzzInput| {
    let clock = SimClock::new();
    let env = FuzzEnv { bytes: Arc::new(Mutex::new(input.entropy.into())), clock: clock.clone() };
    let scheduler = ManualScheduler::new(clock.clone());
    let config = SessionConfig::default()
        .with_tick_interval(Duration::from_millis(u64::from(input.interval_ms)))
        .with_eavesdropper(input.eavesdropper);

    let Ok(mut controller) = Controller::new(env, scheduler.clone(), config) else {
        assert_eq!(input.interval_ms, 0, "only a zero interval is rejected");
        return;
    };

    for event in input.events {
        let before = controller.snapshot();

        let result = match event {
            FuzzEvent::Start => controller.handle(ControllerEvent::Start),
            FuzzEvent::Stop => controller.handle(ControllerEvent::Stop),
            FuzzEvent::Reset => controller.handle(ControllerEvent::Reset),
            FuzzEvent::SetEavesdropper { enabled } => {
                controller.handle(ControllerEvent::SetEavesdropper { enabled })
            },
            FuzzEvent::Advance { millis } => {
                clock.advance_to(clock.now().after(Duration::from_millis(u64::from(millis))));
                match scheduler.pop_due(clock.now()) {
                    Some(timer) => controller.handle(ControllerEvent::TimerFired(timer)),
                    None => Ok(Vec::new()),
                }
            },
            FuzzEvent::Stale { raw } => {
                let timer = TimerId::new(u64::from(raw));
                if controller.armed_timer() == Some(timer) {
                    continue;
                }
                let result = controller.handle(ControllerEvent::TimerFired(timer));
                assert_eq!(controller.snapshot(), before, "stale expiry changed the session");
                result
            },
        };

        let after = controller.snapshot();

        if let Err(err) = result {
            assert!(err.is_fatal(), "only entropy failures surface mid-run: {err}");
            assert_eq!(after.records, before.records, "failed event rewrote records");
            assert_eq!(after.sifted_key, before.sifted_key);
            assert_ne!(after.state, SessionState::Running);
        }

        assert!(after.records.len() <= TRANSMISSIONS_PER_SESSION);
        assert_eq!(
            after.state == SessionState::Complete,
            after.records.len() == TRANSMISSIONS_PER_SESSION
        );
        assert_eq!(controller.armed_timer().is_some(), after.state == SessionState::Running);
        assert_eq!(scheduler.pending_count(), usize::from(after.state == SessionState::Running));

        let key: Vec<bool> = after.records.iter().filter_map(|r| r.key_bit()).collect();
        assert_eq!(after.sifted_key.bits(), key.as_slice());

        for record in &after.records {
            assert_eq!(record.intercepted(), after.eavesdropper_enabled);
        }
    }

    drop(controller);
    assert_eq!(scheduler.pending_count(), 0, "controller leaked a timer");
});
