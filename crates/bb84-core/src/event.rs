//! Controller events and actions.

use crate::{
    record::TransmissionRecord,
    scheduler::TimerId,
    session::{IgnoreReason, SessionState},
};

/// Input to the controller: user intents plus timer expiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Begin or resume transmitting.
    Start,

    /// Pause transmitting, keeping progress.
    Stop,

    /// Discard the session and start over from an empty one.
    Reset,

    /// Insert or remove the eavesdropper, rewriting existing records.
    SetEavesdropper {
        /// New eavesdropper flag.
        enabled: bool,
    },

    /// A timer handed out by the scheduler expired.
    TimerFired(TimerId),
}

/// Observable effect of handling an event.
///
/// The presentation layer can either consume these incrementally or poll
/// [`crate::Controller::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerAction {
    /// A new record was appended.
    Transmitted {
        /// Zero-based position of the record.
        index: usize,
        /// The record as appended.
        record: TransmissionRecord,
    },

    /// The session moved between lifecycle states.
    StateChanged {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },

    /// The session was replaced by an empty one.
    Reset {
        /// Number of records thrown away.
        discarded: usize,
    },

    /// Existing records were rewritten after an eavesdropper toggle.
    Recomputed {
        /// New eavesdropper flag.
        enabled: bool,
        /// Number of records rewritten.
        records: usize,
    },

    /// The event had no effect.
    Ignored {
        /// Why the event was dropped.
        reason: IgnoreReason,
    },
}
