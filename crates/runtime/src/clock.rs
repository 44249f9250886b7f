use std::time::Duration;

use battle_core::Clock;
use tokio::time::Instant;

/// Engine clock backed by tokio time, so paused test time drives debounce
/// windows, monster pacing and the watchdog.
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
