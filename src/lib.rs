// src/lib.rs

//! # Dwell Gate
//!
//! A debounced, single-flight build trigger that sits in front of request handling.
//!
//! Each request passing through a [`BuildGate`] may trigger a rebuild of derived
//! assets (stylesheets compiled from templates, for example) before it is forwarded.
//! At most one request per dwell interval triggers a build, only one build runs at a
//! time, and every request that finds a build in flight waits for it to finish.
//!
//! ## Quick Example
//!
//! ```rust
//! use dwell_gate::{BuildGate, CompileError, GateConfig, SystemClock};
//! use std::time::Duration;
//!
//! let config = GateConfig::new()
//!     .dwell_interval(Duration::from_millis(2000))
//!     .only_run_when("APP_ENV", "development");
//! let compiler = || -> Result<(), CompileError> {
//!     // regenerate stylesheets here
//!     Ok(())
//! };
//! let gate = BuildGate::with_config(config, compiler, SystemClock::new()).unwrap();
//! gate.properties().set("APP_ENV", "development");
//!
//! let response = gate.handle(|| "200 OK").unwrap();
//! assert_eq!(response, "200 OK");
//! assert_eq!(gate.stats().builds_triggered, 1);
//! ```

// private modules
mod clock;
mod command;
mod config;
mod debounce;
mod environment;
mod errors;
mod gate;
mod invoker;

// public API exports
pub use clock::{Clock, SystemClock};
pub use command::CommandCompiler;
pub use config::{
    DEFAULT_DWELL_INTERVAL, DWELL_INTERVAL_PARAM, GateConfig, ONLY_RUN_KEY_PARAM,
    ONLY_RUN_VALUE_PARAM, RETHROW_EXCEPTIONS_PARAM, WAIT_TIMEOUT_PARAM,
};
pub use debounce::DebounceTracker;
pub use environment::{EnvironmentGate, Properties};
pub use errors::{BuildGateError, CompileError};
pub use gate::{BuildGate, GateStats};
pub use invoker::{BuildOutcome, Compile, CompileInvoker};
