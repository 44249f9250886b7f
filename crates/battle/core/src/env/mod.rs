//! Collaborators the engine reads from the outside world.
//!
//! Everything time-, randomness- or actor-dependent sits behind a trait so the
//! engine stays deterministic under test:
//! - [`Clock`] for debounce windows, pacing and the watchdog
//! - [`RngOracle`] for target picks and effect rolls
//! - [`StatSource`] for externally owned combatant stats
//! - [`ActionDispatcher`] for movement/animation playback
mod actor;
mod clock;
mod rng;
mod stats;

use std::sync::Arc;
use std::time::Duration;

pub use actor::{
    ActionDispatcher, ActionQueue, ActionRequest, ActorActionKind, DispatchStatus, NoActors,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use rng::{PcgRng, RngOracle, RollStream, compute_seed};
pub use stats::StatSource;

use crate::config::BattleConfig;

/// Explicit per-battle context handed to the engine at construction.
pub struct BattleContext {
    pub config: BattleConfig,
    clock: Arc<dyn Clock>,
    rolls: RollStream,
}

impl BattleContext {
    pub fn new(config: BattleConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            config,
            clock,
            rolls: RollStream::new(Arc::new(PcgRng), seed),
        }
    }

    /// Default config, wall clock, given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(BattleConfig::default(), Arc::new(SystemClock::new()), seed)
    }

    #[must_use]
    pub fn with_rng_oracle(mut self, oracle: Arc<dyn RngOracle>) -> Self {
        self.rolls = RollStream::new(oracle, self.rolls.seed());
        self
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn seed(&self) -> u64 {
        self.rolls.seed()
    }

    pub(crate) fn rolls_mut(&mut self) -> &mut RollStream {
        &mut self.rolls
    }
}
