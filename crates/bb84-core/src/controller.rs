//! Transmission session controller.
//!
//! The `Controller` is the top-level state machine. It owns the current
//! [`Session`], the environment used for every random draw, and the
//! scheduler that paces transmissions. Pure state machine: it returns
//! actions describing what changed and never sleeps or spawns.
//!
//! # Timer lease
//!
//! At most one timer is armed at any moment. It is acquired when a run
//! starts and re-acquired after each tick, and released on every exit path:
//! stop, completion, reset, a fatal error, and drop. A `TimerFired` for any
//! other id is stale and ignored, so a late expiry can never transmit into a
//! stopped or discarded session.

use crate::{
    config::SessionConfig,
    env::Environment,
    error::ControllerError,
    event::{ControllerAction, ControllerEvent},
    scheduler::{Scheduler, TimerId},
    session::{IgnoreReason, Session, SessionState, Transition},
    snapshot::SessionSnapshot,
};

/// Session controller.
///
/// # Type Parameters
///
/// - `E`: Environment implementation for time/randomness
/// - `S`: Scheduler delivering tick expiries
pub struct Controller<E: Environment, S: Scheduler> {
    /// Current protocol run.
    session: Session,

    /// Pacing and initial eavesdropper flag.
    config: SessionConfig,

    /// Environment for time/randomness.
    env: E,

    /// Timer service.
    scheduler: S,

    /// The single armed tick timer, if running.
    armed: Option<TimerId>,

    /// When the session was first started; resumes keep it.
    run_started: Option<E::Instant>,
}

impl<E: Environment, S: Scheduler> Controller<E, S> {
    /// Create a controller with an empty idle session.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::InvalidConfig` if `config` is rejected.
    pub fn new(env: E, scheduler: S, config: SessionConfig) -> Result<Self, ControllerError> {
        config.validate()?;
        let session = Session::new(config.eavesdropper_enabled);

        Ok(Self { session, config, env, scheduler, armed: None, run_started: None })
    }

    /// Current session (read-only).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&self.session)
    }

    /// Configuration in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Timer currently armed, if any.
    pub fn armed_timer(&self) -> Option<TimerId> {
        self.armed
    }

    /// Scheduler (read-only).
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Scheduler, for drivers that own the clock.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Entropy` if the random source fails. The
    /// error is fatal: the run is stopped and the timer released. Records and
    /// key are left as they were before the failing event.
    pub fn handle(
        &mut self,
        event: ControllerEvent,
    ) -> Result<Vec<ControllerAction>, ControllerError> {
        match event {
            ControllerEvent::Start => Ok(self.start()),
            ControllerEvent::Stop => Ok(self.stop()),
            ControllerEvent::Reset => Ok(self.reset()),
            ControllerEvent::SetEavesdropper { enabled } => self.set_eavesdropper_enabled(enabled),
            ControllerEvent::TimerFired(timer) => self.handle_timer(timer),
        }
    }

    /// Begin or resume the run.
    ///
    /// Ignored while running and once the session is complete.
    pub fn start(&mut self) -> Vec<ControllerAction> {
        let from = self.session.state();

        match self.session.begin_run() {
            Transition::Applied => {
                self.arm_timer();
                if self.run_started.is_none() {
                    self.run_started = Some(self.env.now());
                }
                tracing::info!(cursor = self.session.next_index(), "run started");
                vec![ControllerAction::StateChanged { from, to: SessionState::Running }]
            },
            Transition::Ignored(reason) => ignored("start", reason),
        }
    }

    /// Pause the run, keeping all records.
    pub fn stop(&mut self) -> Vec<ControllerAction> {
        match self.session.pause() {
            Transition::Applied => {
                self.release_timer();
                tracing::info!(cursor = self.session.next_index(), "run stopped");
                vec![ControllerAction::StateChanged {
                    from: SessionState::Running,
                    to: SessionState::Idle,
                }]
            },
            Transition::Ignored(reason) => ignored("stop", reason),
        }
    }

    /// Discard the session and replace it with an empty idle one.
    ///
    /// The eavesdropper flag carries over. Always applies.
    pub fn reset(&mut self) -> Vec<ControllerAction> {
        self.release_timer();
        self.run_started = None;

        let from = self.session.state();
        let discarded = self.session.next_index();
        self.session = Session::new(self.session.eavesdropper_enabled());
        tracing::info!(discarded, "session reset");

        let mut actions = vec![ControllerAction::Reset { discarded }];
        if from != SessionState::Idle {
            actions.push(ControllerAction::StateChanged { from, to: SessionState::Idle });
        }
        actions
    }

    /// Insert or remove the eavesdropper.
    ///
    /// Rewrites every existing record to match the new flag; the sifted key
    /// and the lifecycle state are unaffected. Permitted in every state.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Entropy` if a redraw fails; nothing changes.
    pub fn set_eavesdropper_enabled(
        &mut self,
        enabled: bool,
    ) -> Result<Vec<ControllerAction>, ControllerError> {
        if self.session.eavesdropper_enabled() == enabled {
            return Ok(ignored("set eavesdropper", IgnoreReason::Unchanged));
        }

        let records = match self.session.set_eavesdropper_enabled(&self.env, enabled) {
            Ok(records) => records,
            Err(e) => return Err(self.fail(e.into())),
        };
        tracing::info!(enabled, records, "eavesdropper toggled");

        Ok(vec![ControllerAction::Recomputed { enabled, records }])
    }

    /// Handle a timer expiry: one transmission per armed timer.
    fn handle_timer(&mut self, timer: TimerId) -> Result<Vec<ControllerAction>, ControllerError> {
        if self.armed != Some(timer) {
            tracing::debug!(%timer, armed = ?self.armed, "stale timer ignored");
            return Ok(vec![ControllerAction::Ignored { reason: IgnoreReason::StaleTimer }]);
        }
        // The lease is consumed by the expiry
        self.armed = None;

        match self.session.tick(&self.env) {
            Ok(Transition::Applied) => {},
            Ok(Transition::Ignored(reason)) => return Ok(ignored("tick", reason)),
            Err(e) => return Err(self.fail(e.into())),
        }

        let index = self.session.next_index().saturating_sub(1);
        let mut actions = Vec::with_capacity(2);
        if let Some(record) = self.session.records().last() {
            tracing::debug!(
                index,
                bases_match = record.bases_match(),
                intercepted = record.intercepted(),
                "transmitted"
            );
            actions.push(ControllerAction::Transmitted { index, record: record.clone() });
        }

        if self.session.state() == SessionState::Complete {
            let elapsed = self.run_started.take().map(|started| self.env.now() - started);
            tracing::info!(
                matched = self.session.matched_count(),
                key = %self.session.sifted_key(),
                ?elapsed,
                "session complete"
            );
            actions.push(ControllerAction::StateChanged {
                from: SessionState::Running,
                to: SessionState::Complete,
            });
        } else {
            self.arm_timer();
        }

        Ok(actions)
    }

    /// Stop the run after a fatal error.
    fn fail(&mut self, err: ControllerError) -> ControllerError {
        tracing::error!(error = %err, "controller failed");
        self.release_timer();
        let _ = self.session.pause();
        err
    }

    fn arm_timer(&mut self) {
        self.release_timer();
        self.armed = Some(self.scheduler.schedule(self.config.tick_interval));
    }

    fn release_timer(&mut self) {
        if let Some(timer) = self.armed.take() {
            self.scheduler.cancel(timer);
        }
    }
}

impl<E: Environment, S: Scheduler> Drop for Controller<E, S> {
    fn drop(&mut self) {
        self.release_timer();
    }
}

fn ignored(request: &'static str, reason: IgnoreReason) -> Vec<ControllerAction> {
    tracing::warn!(request, %reason, "request ignored");
    vec![ControllerAction::Ignored { reason }]
}
