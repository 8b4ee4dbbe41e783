// tests/buildgate/fixtures/stub_compiler.rs

// dependencies
use dwell_gate::{Compile, CompileError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    Succeed,
    Fail,
    Panic,
}

#[derive(Debug)]
struct StubState {
    delay: Duration,
    behavior: StubBehavior,
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
    started: Mutex<Vec<Instant>>,
    finished: Mutex<Vec<Instant>>,
}

// Stand-in for a slow, possibly failing asset compiler.
// Clones share state, so a test keeps one handle and gives another to the gate.
#[derive(Debug, Clone)]
pub struct StubCompiler {
    state: Arc<StubState>,
}

impl StubCompiler {
    pub fn new() -> Self {
        Self::build(Duration::ZERO, StubBehavior::Succeed)
    }

    pub fn slow(delay: Duration) -> Self {
        Self::build(delay, StubBehavior::Succeed)
    }

    pub fn failing(delay: Duration) -> Self {
        Self::build(delay, StubBehavior::Fail)
    }

    pub fn panicking() -> Self {
        Self::build(Duration::ZERO, StubBehavior::Panic)
    }

    fn build(delay: Duration, behavior: StubBehavior) -> Self {
        Self {
            state: Arc::new(StubState {
                delay,
                behavior,
                calls: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
                started: Mutex::new(Vec::new()),
                finished: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    // Highest number of builds observed running at the same time
    pub fn max_running(&self) -> usize {
        self.state.max_running.load(Ordering::SeqCst)
    }

    pub fn finished_at(&self, build: usize) -> Option<Instant> {
        self.state.finished.lock().unwrap().get(build).copied()
    }

    pub fn finished_count(&self) -> usize {
        self.state.finished.lock().unwrap().len()
    }

    // Spin until `count` builds have started, panicking after a generous deadline
    pub fn wait_for_start(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while self.state.started.lock().unwrap().len() < count {
            assert!(Instant::now() < deadline, "stub compiler never started");
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Compile for StubCompiler {
    fn compile(&self) -> Result<(), CompileError> {
        let state = &self.state;
        state.calls.fetch_add(1, Ordering::SeqCst);
        let running = state.running.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_running.fetch_max(running, Ordering::SeqCst);
        state.started.lock().unwrap().push(Instant::now());

        thread::sleep(state.delay);

        state.finished.lock().unwrap().push(Instant::now());
        state.running.fetch_sub(1, Ordering::SeqCst);

        match state.behavior {
            StubBehavior::Succeed => Ok(()),
            StubBehavior::Fail => Err(CompileError::other("Undefined variable: $primary")),
            StubBehavior::Panic => panic!("compiler crashed"),
        }
    }
}
