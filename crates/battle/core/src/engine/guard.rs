//! Re-entrancy guards for the two fragile entry points.
//!
//! Every engine entry point takes `&mut self`, so the borrow checker is what
//! keeps two transitions from overlapping on one engine value.
//! [`ProcessingLock`] marks the span of a transition and its inline
//! completions; callers holding `&mut BattleEngine` never observe it held, so
//! the `ReentrancyRejected` branches behind it stay unreachable from the
//! public API. Duplicate calls arriving one after another are what actually
//! gets rejected, by [`DebounceGate`].

use std::time::Duration;

/// "Currently processing" flag around an end-of-turn transition.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ProcessingLock {
    busy: bool,
}

impl ProcessingLock {
    /// Returns false if the lock is already held.
    pub(crate) fn try_acquire(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub(crate) fn release(&mut self) {
        self.busy = false;
    }
}

/// Minimum-interval gate. Calls inside `window` of the last stamp are refused.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DebounceGate {
    window: Duration,
    last: Option<Duration>,
}

impl DebounceGate {
    pub(crate) fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub(crate) fn is_open(&self, now: Duration) -> bool {
        match self.last {
            Some(last) => now.saturating_sub(last) >= self.window,
            None => true,
        }
    }

    pub(crate) fn stamp(&mut self, now: Duration) {
        self.last = Some(now);
    }

    /// Stamps and returns true when the gate is open.
    pub(crate) fn admit(&mut self, now: Duration) -> bool {
        if !self.is_open(now) {
            return false;
        }
        self.stamp(now);
        true
    }
}
