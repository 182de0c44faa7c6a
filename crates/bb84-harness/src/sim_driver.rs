//! Virtual-time driver.
//!
//! Wires a [`Controller`] to a [`SimEnv`] and a [`ManualScheduler`] sharing
//! one [`SimClock`], and plays the role the tokio loop plays in the binary:
//! it moves time forward and delivers timer expiries, strictly one at a
//! time, in deadline order.

use std::time::Duration;

use bb84_core::{
    Controller, ControllerAction, ControllerError, ControllerEvent, Session, SessionConfig,
    SessionSnapshot, SessionState,
};

use crate::{
    sim_env::{SimClock, SimEnv, SimInstant},
    sim_scheduler::ManualScheduler,
};

/// Controller plus the virtual clock that paces it.
pub struct SimDriver {
    controller: Controller<SimEnv, ManualScheduler>,
    scheduler: ManualScheduler,
    clock: SimClock,
}

impl SimDriver {
    /// Driver with a fresh clock and an RNG seeded with `seed`.
    pub fn new(seed: u64, config: SessionConfig) -> Result<Self, ControllerError> {
        let clock = SimClock::new();
        let env = SimEnv::with_clock(seed, clock.clone());
        let scheduler = ManualScheduler::new(clock.clone());
        let controller = Controller::new(env, scheduler.clone(), config)?;

        Ok(Self { controller, scheduler, clock })
    }

    /// Driver with the default configuration.
    pub fn with_seed(seed: u64) -> Result<Self, ControllerError> {
        Self::new(seed, SessionConfig::default())
    }

    /// Deliver an intent.
    pub fn handle(
        &mut self,
        event: ControllerEvent,
    ) -> Result<Vec<ControllerAction>, ControllerError> {
        self.controller.handle(event)
    }

    /// Advance virtual time by `duration`, delivering every timer that falls
    /// due on the way (including timers armed by earlier expiries).
    pub fn advance(&mut self, duration: Duration) -> Result<Vec<ControllerAction>, ControllerError> {
        let target = self.clock.now().after(duration);
        let mut actions = Vec::new();

        while let Some((at, _)) = self.scheduler.next_deadline() {
            if at > target {
                break;
            }
            self.clock.advance_to(at);
            if let Some(timer) = self.scheduler.pop_due(at) {
                actions.extend(self.controller.handle(ControllerEvent::TimerFired(timer))?);
            }
        }

        self.clock.advance_to(target);
        Ok(actions)
    }

    /// Start (if needed) and drive the session until it completes.
    pub fn run_to_completion(&mut self) -> Result<Vec<ControllerAction>, ControllerError> {
        let mut actions = Vec::new();
        if self.controller.state() == SessionState::Idle {
            actions.extend(self.controller.handle(ControllerEvent::Start)?);
        }

        while self.controller.state() == SessionState::Running {
            let Some((at, timer)) = self.scheduler.next_deadline() else {
                break;
            };
            self.clock.advance_to(at);
            if self.scheduler.pop_due(at) == Some(timer) {
                actions.extend(self.controller.handle(ControllerEvent::TimerFired(timer))?);
            }
        }

        Ok(actions)
    }

    /// The controller under test.
    pub fn controller(&self) -> &Controller<SimEnv, ManualScheduler> {
        &self.controller
    }

    /// Current session.
    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    /// Handle on the scheduler shared with the controller.
    pub fn scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    /// Current virtual time.
    pub fn now(&self) -> SimInstant {
        self.clock.now()
    }

    /// Drop the controller, keeping the scheduler handle for inspection.
    pub fn shutdown(self) -> ManualScheduler {
        let Self { controller, scheduler, .. } = self;
        drop(controller);
        scheduler
    }
}
