// src/clock.rs

// clock module definition and implementations

// dependencies
use std::time::Instant;

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync).
/// The `now` method returns nanoseconds elapsed since the clock's origin.
/// The BuildGate takes its clock as a constructor argument, so tests can
/// substitute a clock they advance by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// SystemClock implementation backed by a monotonic `Instant`.
/// Time is measured from the moment the clock was created and never goes backward.
/// This is the default clock used by the BuildGate.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // u64 nanoseconds covers ~584 years of uptime
        self.origin.elapsed().as_nanos() as u64
    }
}
