//! Session state machine.
//!
//! A `Session` is the ordered list of transmission records for one run of
//! the protocol, together with the eavesdropper flag and the sifted key
//! derived from the records.
//!
//! # States
//!
//! ```text
//!            begin_run                 tick (len == 8)
//!   Idle ─────────────────▶ Running ───────────────────▶ Complete
//!    ▲                         │
//!    └─────────────────────────┘
//!              pause
//! ```
//!
//! Nothing leaves `Complete`; the controller replaces the whole session on
//! reset. Eavesdropper toggles are accepted in every state and never change
//! it.

use std::fmt;

use crate::{env::Environment, error::EntropyError, record::TransmissionRecord};

/// Number of transmissions in every session.
pub const TRANSMISSIONS_PER_SESSION: usize = 8;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not transmitting. Resumable while fewer than 8 records exist.
    Idle,
    /// One transmission per scheduled tick.
    Running,
    /// All 8 transmissions done. Only a reset leaves this state.
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Why a request did not change the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// Start while already running.
    AlreadyRunning,
    /// Start or tick after all transmissions are done.
    SessionComplete,
    /// Stop or tick while not running.
    NotRunning,
    /// Timer firing that does not belong to the armed timer.
    StaleTimer,
    /// Eavesdropper toggle to the value already set.
    Unchanged,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AlreadyRunning => "session is already running",
            Self::SessionComplete => "session is complete",
            Self::NotRunning => "session is not running",
            Self::StaleTimer => "timer does not belong to the current run",
            Self::Unchanged => "eavesdropper flag already set",
        };
        f.write_str(reason)
    }
}

/// Result of a state-machine request.
///
/// Invalid requests are reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The request took effect.
    Applied,
    /// The request was a no-op.
    Ignored(IgnoreReason),
}

impl Transition {
    /// Check if the request took effect.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Bits retained after sifting, in transmission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiftedKey(Vec<bool>);

impl SiftedKey {
    /// Key bits, `true` for 1.
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no position has been sifted yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_records(records: &[TransmissionRecord]) -> Self {
        Self(records.iter().filter_map(TransmissionRecord::key_bit).collect())
    }
}

impl fmt::Display for SiftedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One protocol run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    records: Vec<TransmissionRecord>,
    eavesdropper_enabled: bool,
    state: SessionState,
    sifted_key: SiftedKey,
}

impl Session {
    /// Create an empty, idle session.
    pub fn new(eavesdropper_enabled: bool) -> Self {
        Self {
            records: Vec::with_capacity(TRANSMISSIONS_PER_SESSION),
            eavesdropper_enabled,
            state: SessionState::Idle,
            sifted_key: SiftedKey::default(),
        }
    }

    /// Records in transmission order.
    pub fn records(&self) -> &[TransmissionRecord] {
        &self.records
    }

    /// Number of transmissions so far (the cursor).
    pub fn next_index(&self) -> usize {
        self.records.len()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether new transmissions are intercepted.
    pub fn eavesdropper_enabled(&self) -> bool {
        self.eavesdropper_enabled
    }

    /// Key bits from all matched-basis records.
    pub fn sifted_key(&self) -> &SiftedKey {
        &self.sifted_key
    }

    /// Fraction of the session transmitted, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        self.records.len() as f64 / TRANSMISSIONS_PER_SESSION as f64
    }

    /// Number of records where sender and receiver bases agree.
    pub fn matched_count(&self) -> usize {
        self.records.iter().filter(|r| r.bases_match()).count()
    }

    /// Whether all transmissions are done.
    pub fn is_complete(&self) -> bool {
        self.records.len() >= TRANSMISSIONS_PER_SESSION
    }

    /// `Idle` → `Running`.
    pub(crate) fn begin_run(&mut self) -> Transition {
        match self.state {
            SessionState::Running => Transition::Ignored(IgnoreReason::AlreadyRunning),
            SessionState::Complete => Transition::Ignored(IgnoreReason::SessionComplete),
            SessionState::Idle if self.is_complete() => {
                Transition::Ignored(IgnoreReason::SessionComplete)
            },
            SessionState::Idle => {
                self.state = SessionState::Running;
                Transition::Applied
            },
        }
    }

    /// `Running` → `Idle`, keeping every record.
    pub(crate) fn pause(&mut self) -> Transition {
        match self.state {
            SessionState::Running => {
                self.state = SessionState::Idle;
                Transition::Applied
            },
            SessionState::Idle => Transition::Ignored(IgnoreReason::NotRunning),
            SessionState::Complete => Transition::Ignored(IgnoreReason::SessionComplete),
        }
    }

    /// Performs one transmission.
    ///
    /// Appends the record, extends the sifted key when the bases match, and
    /// moves to `Complete` after the last transmission. A failed draw leaves
    /// the session untouched.
    pub(crate) fn tick<E: Environment>(&mut self, env: &E) -> Result<Transition, EntropyError> {
        match self.state {
            SessionState::Idle => return Ok(Transition::Ignored(IgnoreReason::NotRunning)),
            SessionState::Complete => {
                return Ok(Transition::Ignored(IgnoreReason::SessionComplete));
            },
            SessionState::Running => {},
        }

        let record = TransmissionRecord::transmit(env, self.eavesdropper_enabled)?;
        if let Some(bit) = record.key_bit() {
            self.sifted_key.0.push(bit);
        }
        self.records.push(record);

        if self.is_complete() {
            self.state = SessionState::Complete;
        }

        Ok(Transition::Applied)
    }

    /// Sets the eavesdropper flag and rewrites history to match it.
    ///
    /// Enabling inserts a freshly drawn interception into every record that
    /// has none; disabling strips every interception. Each touched record's
    /// receiver value is re-measured. Returns the number of records rewritten.
    ///
    /// The pass is all-or-nothing: if a draw fails, neither the records nor
    /// the flag change.
    pub(crate) fn set_eavesdropper_enabled<E: Environment>(
        &mut self,
        env: &E,
        enabled: bool,
    ) -> Result<usize, EntropyError> {
        let mut records = self.records.clone();
        let mut rewritten = 0;

        for record in records.iter_mut().filter(|r| r.intercepted() != enabled) {
            if enabled {
                record.intercept(env)?;
            } else {
                record.clear_interception(env)?;
            }
            rewritten += 1;
        }

        self.records = records;
        self.eavesdropper_enabled = enabled;
        self.sifted_key = SiftedKey::from_records(&self.records);

        Ok(rewritten)
    }
}

#[cfg(test)]
impl Session {
    /// Append a hand-built record as if it had been transmitted.
    pub(crate) fn push_for_test(&mut self, record: TransmissionRecord) {
        if let Some(bit) = record.key_bit() {
            self.sifted_key.0.push(bit);
        }
        self.records.push(record);
        if self.is_complete() {
            self.state = SessionState::Complete;
        }
    }
}
