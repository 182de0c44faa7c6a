//! Operations for model-based testing.
//!
//! Operations represent everything the outside world can do to a session:
//! the four user intents plus the passage of time. They are generated
//! randomly and applied to both the model and the real controller.

use arbitrary::Arbitrary;
use bb84_core::IgnoreReason;

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Begin or resume the run.
    Start,

    /// Pause the run.
    Stop,

    /// Discard the session.
    Reset,

    /// Toggle the eavesdropper.
    SetEavesdropper {
        /// New flag.
        enabled: bool,
    },

    /// Advance simulation time.
    ///
    /// Fires every tick that falls due in the window.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Intent took effect.
    Applied,

    /// Intent was a no-op.
    Ignored(IgnoreReason),

    /// Time passed.
    Advanced {
        /// Transmissions performed while time passed.
        transmissions: usize,
    },
}

impl OperationResult {
    /// Check if the operation changed anything.
    pub fn is_applied(&self) -> bool {
        match self {
            Self::Applied => true,
            Self::Ignored(_) => false,
            Self::Advanced { transmissions } => *transmissions > 0,
        }
    }
}
