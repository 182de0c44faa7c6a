//! Simulated environment: virtual clock and seeded RNG.
//!
//! Every `SimEnv` created from the same seed produces the same byte stream,
//! so a whole session (bases, values, collapses, interceptions) can be
//! replayed exactly. Time only moves when the driver advances the clock.

use std::{
    ops::Sub,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use bb84_core::{EntropyError, Environment};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Virtual time, as a duration since the start of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Start of the simulation.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Time elapsed since the start of the simulation.
    pub fn since_start(self) -> Duration {
        self.0
    }

    /// Instant `after` later.
    #[must_use]
    pub fn after(self, after: Duration) -> Self {
        Self(self.0.saturating_add(after))
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, other: Self) -> Duration {
        self.0.saturating_sub(other.0)
    }
}

/// Shared virtual clock.
///
/// Cloning shares the underlying time; the environment and the scheduler of
/// one simulation read the same clock.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Arc<Mutex<SimInstant>>,
}

impl SimClock {
    /// Clock at the start of the simulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> SimInstant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the clock forward to `instant`. Never moves backwards.
    pub fn advance_to(&self, instant: SimInstant) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if instant > *now {
            *now = instant;
        }
    }
}

/// Deterministic environment for simulation.
#[derive(Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha8Rng>>,
    clock: SimClock,
    seed: u64,
}

impl SimEnv {
    /// Environment with its own clock, seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_clock(seed, SimClock::new())
    }

    /// Environment reading an existing clock.
    pub fn with_clock(seed: u64, clock: SimClock) -> Self {
        tracing::debug!(seed, "simulation environment seeded");
        Self { rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))), clock, seed }
    }

    /// Seed this environment was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Clock shared with this environment.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        self.clock.now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_fill_bytes(buffer)
            .map_err(|e| EntropyError::Unavailable { reason: e.to_string() })
    }
}
