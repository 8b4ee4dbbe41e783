// src/gate.rs

// dwell-gate: a debounced, single-flight build trigger in front of request handling.

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::debounce::DebounceTracker;
use crate::environment::{EnvironmentGate, Properties};
use crate::errors::BuildGateError;
use crate::invoker::{BuildOutcome, Compile, CompileInvoker};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Where a request currently is inside the gate. Reported in trace logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GatePhase {
    Idle,
    Triggering,
    Building,
    Waiting,
}

/// The main BuildGate model.
/// P is the compiler invoked when a build triggers.
/// C is the clock type, defaulting to SystemClock.
///
/// Every request goes through `handle`. At most one request per dwell window
/// triggers a build, at most one build runs at a time, and no request reaches its
/// continuation while a build is in flight.
#[derive(Debug)]
pub struct BuildGate<P, C = SystemClock>
where
    P: Compile,
    C: Clock,
{
    config: GateConfig,
    compiler: P,
    clock: C,
    environment: EnvironmentGate,
    tracker: DebounceTracker,
    invoker: CompileInvoker,
    build_in_flight: Mutex<bool>,
    build_finished: Condvar,
    stats: StatsCounters,
}

// methods for a gate on the system clock with default settings
impl<P> BuildGate<P, SystemClock>
where
    P: Compile,
{
    pub fn new(compiler: P) -> Self {
        Self::assemble(GateConfig::default(), compiler, SystemClock::new())
    }
}

// methods for the BuildGate type
impl<P, C> BuildGate<P, C>
where
    P: Compile,
    C: Clock,
{
    // internal constructor; the config must already be valid
    fn assemble(config: GateConfig, compiler: P, clock: C) -> Self {
        Self {
            invoker: CompileInvoker::new(config.rethrow_failures),
            config,
            compiler,
            clock,
            environment: EnvironmentGate::default(),
            tracker: DebounceTracker::new(),
            build_in_flight: Mutex::new(false),
            build_finished: Condvar::new(),
            stats: StatsCounters::default(),
        }
    }

    // method to create a new gate from a config object
    pub fn with_config(config: GateConfig, compiler: P, clock: C) -> Result<Self, BuildGateError> {
        config.validate()?;
        Ok(Self::assemble(config, compiler, clock))
    }

    /// Builder-style: resolve `onlyRunWhenKey` against a shared property store
    pub fn with_properties(mut self, properties: Arc<Properties>) -> Self {
        self.environment = EnvironmentGate::new(properties);
        self
    }

    // accessor methods
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn properties(&self) -> &Arc<Properties> {
        self.environment.properties()
    }

    pub fn last_trigger(&self) -> Option<u64> {
        self.tracker.last_trigger()
    }

    pub fn is_build_in_flight(&self) -> bool {
        *self.build_in_flight.lock()
    }

    pub fn stats(&self) -> GateStats {
        self.stats.snapshot()
    }

    /// Run the gate for one request, then hand the request on by calling `next`.
    ///
    /// `next` runs exactly once unless this request triggered a build that failed
    /// while the gate rethrows failures; then the build error is returned instead.
    pub fn handle<T, N>(&self, next: N) -> Result<T, BuildGateError>
    where
        N: FnOnce() -> T,
    {
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        // the environment is checked first so a closed gate never consumes a dwell window
        let may_build = self.environment.allowed(&self.config);

        if let Some(slot) = self.claim_build_slot(may_build) {
            trace!(phase = ?GatePhase::Triggering, "build claimed");
            self.build(slot)?;
            self.wait_for_build();
        }

        trace!(phase = ?GatePhase::Idle, "forwarding request");
        Ok(next())
    }

    fn build(&self, _slot: BuildSlot<'_>) -> Result<BuildOutcome, BuildGateError> {
        self.stats.builds_triggered.fetch_add(1, Ordering::Relaxed);
        trace!(phase = ?GatePhase::Building, "build started");

        let result = self.invoker.invoke(&self.compiler);
        match &result {
            Ok(BuildOutcome::Compiled) => {
                self.stats.builds_succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Ok(BuildOutcome::FailedSwallowed) | Err(_) => {
                self.stats.builds_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
        // `_slot` drops here, clearing the flag before any error reaches the caller
    }

    // Waits out any running build, then tries the debounce claim.
    // Claim and flag are one step under the flag's lock: no request can observe
    // "idle" between another request winning the claim and publishing its build.
    fn claim_build_slot(&self, may_build: bool) -> Option<BuildSlot<'_>> {
        let mut in_flight = self.build_in_flight.lock();
        if !self.wait_until_idle(&mut in_flight) {
            return None;
        }
        if !may_build || !self.tracker.try_claim(&self.clock, self.config.dwell_interval) {
            return None;
        }
        *in_flight = true;

        Some(BuildSlot {
            in_flight: &self.build_in_flight,
            finished: &self.build_finished,
        })
    }

    // blocks while a build is in flight, bounded by the configured wait timeout
    fn wait_for_build(&self) {
        let mut in_flight = self.build_in_flight.lock();
        self.wait_until_idle(&mut in_flight);
    }

    // false when the wait timeout elapsed with a build still running
    fn wait_until_idle(&self, in_flight: &mut MutexGuard<'_, bool>) -> bool {
        if !**in_flight {
            return true;
        }

        self.stats.requests_waited.fetch_add(1, Ordering::Relaxed);
        trace!(phase = ?GatePhase::Waiting, "waiting for build to finish");

        let deadline = self
            .config
            .wait_timeout
            .and_then(|limit| Instant::now().checked_add(limit).map(|at| (limit, at)));

        match deadline {
            None => {
                while **in_flight {
                    self.build_finished.wait(in_flight);
                }
                true
            }
            Some((limit, deadline)) => {
                while **in_flight {
                    if self.build_finished.wait_until(in_flight, deadline).timed_out() && **in_flight {
                        self.stats.waits_timed_out.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            timeout_ms = limit.as_millis() as u64,
                            "build still running, forwarding request against current artifacts"
                        );
                        return false;
                    }
                }
                true
            }
        }
    }
}

/// Single-flight slot held while a build runs.
/// Dropping it clears the in-flight flag and wakes every waiter, on every exit path.
struct BuildSlot<'a> {
    in_flight: &'a Mutex<bool>,
    finished: &'a Condvar,
}

impl Drop for BuildSlot<'_> {
    fn drop(&mut self) {
        *self.in_flight.lock() = false;
        let woken = self.finished.notify_all();
        debug!(woken, "build slot released");
    }
}

/// Point-in-time counters describing what the gate has done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Requests that entered `handle`
    pub requests: u64,
    /// Builds the gate started
    pub builds_triggered: u64,
    /// Builds that finished without error
    pub builds_succeeded: u64,
    /// Builds that failed, whether swallowed or rethrown
    pub builds_failed: u64,
    /// Requests that found a build in flight and had to wait
    pub requests_waited: u64,
    /// Waits cut short by the configured wait timeout
    pub waits_timed_out: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    requests: AtomicU64,
    builds_triggered: AtomicU64,
    builds_succeeded: AtomicU64,
    builds_failed: AtomicU64,
    requests_waited: AtomicU64,
    waits_timed_out: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> GateStats {
        GateStats {
            requests: self.requests.load(Ordering::Relaxed),
            builds_triggered: self.builds_triggered.load(Ordering::Relaxed),
            builds_succeeded: self.builds_succeeded.load(Ordering::Relaxed),
            builds_failed: self.builds_failed.load(Ordering::Relaxed),
            requests_waited: self.requests_waited.load(Ordering::Relaxed),
            waits_timed_out: self.waits_timed_out.load(Ordering::Relaxed),
        }
    }
}
