// src/debounce.rs

// debounce tracker: claims at most one trigger per dwell window

// dependencies
use crate::clock::Clock;
use parking_lot::Mutex;
use std::time::Duration;

/// Holds the timestamp of the last triggered build.
///
/// `None` means nothing has triggered yet, so the first claim always succeeds.
/// The eligibility check and the timestamp update run under one lock, so two
/// callers can never both claim the same window.
#[derive(Debug, Default)]
pub struct DebounceTracker {
    last_trigger_nanos: Mutex<Option<u64>>,
}

impl DebounceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the right to trigger a build.
    ///
    /// Returns `false` and leaves the state alone if less than `dwell` has elapsed
    /// since the last claim. Otherwise records the clock's current time and returns `true`.
    pub fn try_claim<C: Clock + ?Sized>(&self, clock: &C, dwell: Duration) -> bool {
        let dwell_nanos = dwell.as_nanos().min(u64::MAX as u128) as u64;
        let mut last = self.last_trigger_nanos.lock();

        if let Some(previous) = *last {
            let elapsed = clock.now().saturating_sub(previous);
            if elapsed < dwell_nanos {
                return false;
            }
        }

        // the timestamp is taken at the moment of the update, not at the check
        *last = Some(clock.now());
        true
    }

    /// Nanosecond timestamp of the last successful claim, if any
    pub fn last_trigger(&self) -> Option<u64> {
        *self.last_trigger_nanos.lock()
    }
}
