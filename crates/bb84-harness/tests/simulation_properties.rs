//! Property-based tests for simulation determinism and timer hygiene.
//!
//! These tests verify that the virtual-time driver produces deterministic
//! results for the same seed, and that the controller never leaves a tick
//! timer behind once a run ends.

use std::time::Duration;

use bb84_core::{ControllerAction, ControllerEvent, IgnoreReason, SessionConfig, SessionState};
use bb84_harness::SimDriver;
use proptest::prelude::*;

#[test]
fn prop_same_seed_same_session() {
    proptest!(|(
        seed in any::<u64>(),
        toggle_at in 0u64..9,
    )| {
        // Run the same schedule twice and verify identical results
        let mut snapshots = Vec::new();

        for _ in 0..2 {
            let mut driver = SimDriver::with_seed(seed).expect("default config is valid");
            driver.handle(ControllerEvent::Start).expect("start needs no entropy");
            driver
                .advance(Duration::from_secs(toggle_at))
                .expect("seeded RNG never fails");
            driver
                .handle(ControllerEvent::SetEavesdropper { enabled: true })
                .expect("seeded RNG never fails");
            driver.run_to_completion().expect("seeded RNG never fails");
            snapshots.push(driver.snapshot());
        }

        prop_assert_eq!(&snapshots[0], &snapshots[1]);
    });
}

#[test]
fn full_run_takes_eight_intervals() {
    let config = SessionConfig::default().with_tick_interval(Duration::from_millis(250));
    let mut driver = SimDriver::new(1, config).expect("interval is valid");

    let actions = driver.run_to_completion().expect("seeded RNG never fails");

    assert_eq!(driver.now().since_start(), Duration::from_secs(2));
    assert_eq!(
        actions.iter().filter(|a| matches!(a, ControllerAction::Transmitted { .. })).count(),
        8
    );
    assert_eq!(
        actions.last(),
        Some(&ControllerAction::StateChanged {
            from: SessionState::Running,
            to: SessionState::Complete,
        })
    );
    assert_eq!(driver.scheduler().pending_count(), 0);
}

#[test]
fn first_tick_waits_one_interval() {
    let mut driver = SimDriver::with_seed(3).expect("default config is valid");
    driver.handle(ControllerEvent::Start).expect("start needs no entropy");

    driver.advance(Duration::from_millis(999)).expect("seeded RNG never fails");
    assert!(driver.session().records().is_empty());

    driver.advance(Duration::from_millis(1)).expect("seeded RNG never fails");
    assert_eq!(driver.session().records().len(), 1);
}

#[test]
fn stop_freezes_progress() {
    let mut driver = SimDriver::with_seed(5).expect("default config is valid");
    driver.handle(ControllerEvent::Start).expect("start needs no entropy");
    driver.advance(Duration::from_millis(3500)).expect("seeded RNG never fails");

    driver.handle(ControllerEvent::Stop).expect("stop needs no entropy");
    let frozen = driver.snapshot();
    driver.advance(Duration::from_secs(60)).expect("seeded RNG never fails");

    assert_eq!(driver.snapshot(), frozen);
    assert_eq!(frozen.records.len(), 3);
    assert_eq!(frozen.state, SessionState::Idle);
    assert_eq!(driver.scheduler().pending_count(), 0);
}

#[test]
fn stale_timer_after_reset_is_ignored() {
    let mut driver = SimDriver::with_seed(9).expect("default config is valid");
    driver.handle(ControllerEvent::Start).expect("start needs no entropy");
    let timer = driver.controller().armed_timer().expect("running session arms a timer");

    driver.handle(ControllerEvent::Reset).expect("reset needs no entropy");
    let actions =
        driver.handle(ControllerEvent::TimerFired(timer)).expect("stale timers are not errors");

    assert_eq!(actions, vec![ControllerAction::Ignored { reason: IgnoreReason::StaleTimer }]);
    assert!(driver.session().records().is_empty());
    assert_eq!(driver.controller().state(), SessionState::Idle);
}

#[test]
fn dropping_a_running_controller_releases_its_timer() {
    let mut driver = SimDriver::with_seed(11).expect("default config is valid");
    driver.handle(ControllerEvent::Start).expect("start needs no entropy");
    driver.advance(Duration::from_millis(1500)).expect("seeded RNG never fails");
    assert_eq!(driver.scheduler().pending_count(), 1);

    let scheduler = driver.shutdown();

    assert_eq!(scheduler.pending_count(), 0);
    assert_eq!(scheduler.cancelled_count(), 1);
}
