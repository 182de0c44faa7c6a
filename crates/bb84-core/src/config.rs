//! Session configuration.

use std::time::Duration;

use crate::error::ControllerError;

/// Default delay between transmissions.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Controller configuration.
///
/// The number of transmissions is fixed at
/// [`crate::TRANSMISSIONS_PER_SESSION`] and is not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay between consecutive transmissions while running.
    pub tick_interval: Duration,
    /// Initial eavesdropper flag. Survives resets.
    pub eavesdropper_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { tick_interval: DEFAULT_TICK_INTERVAL, eavesdropper_enabled: false }
    }
}

impl SessionConfig {
    /// Set the tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Set the initial eavesdropper flag.
    #[must_use]
    pub fn with_eavesdropper(mut self, enabled: bool) -> Self {
        self.eavesdropper_enabled = enabled;
        self
    }

    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.tick_interval.is_zero() {
            return Err(ControllerError::InvalidConfig {
                reason: "tick interval must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
