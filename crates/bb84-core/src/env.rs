//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples the simulation engine from system
//! resources (time and randomness). This enables:
//!
//! - Deterministic Simulation: the harness provides a virtual clock and a
//!   seeded RNG, so any session can be replayed from its seed.
//!
//! - Production Runtime: the binary uses the OS entropy pool and the system
//!   clock without any change to the engine.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::{fmt::Debug, ops::Sub, time::Duration};

use crate::error::EntropyError;

/// Abstract environment providing time and randomness.
///
/// Every random draw the engine makes (bases, prepared values, incompatible
/// measurements) goes through this trait, which is what makes a session
/// reproducible under simulation.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Point in time as seen by this environment.
    type Instant: Copy + Ord + Debug + Send + Sync + Sub<Output = Duration>;

    /// Returns the current time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: subsequent calls must return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Errors
    ///
    /// Returns `EntropyError` when the source cannot produce bytes. The engine
    /// treats this as fatal and never retries.
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;

    /// Draws a uniform value in `0..bound`.
    ///
    /// Uses rejection sampling on single bytes so that bounds which do not
    /// divide 256 stay unbiased. `bound` must be non-zero.
    fn random_below(&self, bound: u8) -> Result<u8, EntropyError> {
        debug_assert!(bound > 0, "random_below requires a non-zero bound");
        let bound = u16::from(bound.max(1));
        let zone = 256 - (256 % bound);

        loop {
            let mut byte = [0u8; 1];
            self.random_bytes(&mut byte)?;
            let sample = u16::from(byte[0]);
            if sample < zone {
                return Ok(u8::try_from(sample % bound).unwrap_or_default());
            }
        }
    }
}
