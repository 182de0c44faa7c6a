//! Model session.
//!
//! Tracks only what is deterministic regardless of the random draws: the
//! lifecycle state, how many transmissions happened, the eavesdropper flag,
//! and how long until the next tick.

use std::time::Duration;

use bb84_core::{IgnoreReason, SessionState, TRANSMISSIONS_PER_SESSION};

use super::operation::{Operation, OperationResult};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservableState {
    /// Lifecycle state.
    pub state: SessionState,
    /// Records transmitted.
    pub transmitted: usize,
    /// Eavesdropper flag.
    pub eavesdropper_enabled: bool,
    /// Records carrying an interception.
    pub intercepted: usize,
    /// Whether a tick timer is pending.
    pub timer_armed: bool,
}

/// Reference session.
#[derive(Debug, Clone)]
pub struct ModelSession {
    interval: Duration,
    state: SessionState,
    transmitted: usize,
    eavesdropper_enabled: bool,
    /// Time left until the next tick while running.
    until_next: Option<Duration>,
}

impl ModelSession {
    /// Idle, empty session ticking every `interval`.
    pub fn new(interval: Duration, eavesdropper_enabled: bool) -> Self {
        Self {
            interval,
            state: SessionState::Idle,
            transmitted: 0,
            eavesdropper_enabled,
            until_next: None,
        }
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::Start => self.start(),
            Operation::Stop => self.stop(),
            Operation::Reset => self.reset(),
            Operation::SetEavesdropper { enabled } => self.set_eavesdropper(enabled),
            Operation::AdvanceTime { millis } => self.advance(Duration::from_millis(millis.into())),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            state: self.state,
            transmitted: self.transmitted,
            eavesdropper_enabled: self.eavesdropper_enabled,
            // Every record follows the flag, toggles rewrite history
            intercepted: if self.eavesdropper_enabled { self.transmitted } else { 0 },
            timer_armed: self.until_next.is_some(),
        }
    }

    fn start(&mut self) -> OperationResult {
        match self.state {
            SessionState::Running => OperationResult::Ignored(IgnoreReason::AlreadyRunning),
            SessionState::Complete => OperationResult::Ignored(IgnoreReason::SessionComplete),
            SessionState::Idle => {
                self.state = SessionState::Running;
                self.until_next = Some(self.interval);
                OperationResult::Applied
            },
        }
    }

    fn stop(&mut self) -> OperationResult {
        match self.state {
            SessionState::Running => {
                self.state = SessionState::Idle;
                self.until_next = None;
                OperationResult::Applied
            },
            SessionState::Idle => OperationResult::Ignored(IgnoreReason::NotRunning),
            SessionState::Complete => OperationResult::Ignored(IgnoreReason::SessionComplete),
        }
    }

    fn reset(&mut self) -> OperationResult {
        self.state = SessionState::Idle;
        self.transmitted = 0;
        self.until_next = None;
        OperationResult::Applied
    }

    fn set_eavesdropper(&mut self, enabled: bool) -> OperationResult {
        if self.eavesdropper_enabled == enabled {
            return OperationResult::Ignored(IgnoreReason::Unchanged);
        }
        self.eavesdropper_enabled = enabled;
        OperationResult::Applied
    }

    fn advance(&mut self, mut remaining: Duration) -> OperationResult {
        let mut transmissions = 0;

        while let Some(until_next) = self.until_next {
            if remaining < until_next {
                self.until_next = Some(until_next - remaining);
                break;
            }
            remaining -= until_next;
            self.transmitted += 1;
            transmissions += 1;

            if self.transmitted == TRANSMISSIONS_PER_SESSION {
                self.state = SessionState::Complete;
                self.until_next = None;
            } else {
                self.until_next = Some(self.interval);
            }
        }

        OperationResult::Advanced { transmissions }
    }
}
