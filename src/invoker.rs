// src/invoker.rs

// compile invoker: runs the external compiler and applies the failure policy

// dependencies
use crate::errors::{BuildGateError, CompileError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, warn};

/// The external build step. Reads sources, writes derived artifacts.
/// The gate consumes no return value; it only cares whether the build failed.
pub trait Compile: Send + Sync {
    fn compile(&self) -> Result<(), CompileError>;
}

impl<F> Compile for F
where
    F: Fn() -> Result<(), CompileError> + Send + Sync,
{
    fn compile(&self) -> Result<(), CompileError> {
        self()
    }
}

/// What a completed invocation amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The compiler finished and the artifacts are fresh
    Compiled,
    /// The compiler failed; the failure was logged and the previous artifacts stay in place
    FailedSwallowed,
}

/// Wraps a compiler with failure containment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileInvoker {
    rethrow_failures: bool,
}

impl CompileInvoker {
    pub fn new(rethrow_failures: bool) -> Self {
        Self { rethrow_failures }
    }

    /// Run the compiler once.
    ///
    /// Errors and panics raised by the compiler are both failures. Every failure is
    /// logged at warn level; it is returned as `BuildGateError::Build` only when the
    /// invoker rethrows.
    pub fn invoke<P: Compile + ?Sized>(&self, compiler: &P) -> Result<BuildOutcome, BuildGateError> {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| compiler.compile()))
            .unwrap_or_else(|payload| Err(CompileError::Panicked(panic_message(payload))));

        match result {
            Ok(()) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "asset build finished");
                Ok(BuildOutcome::Compiled)
            }
            Err(error) => {
                warn!(
                    error = %error,
                    detail = ?error,
                    rethrow = self.rethrow_failures,
                    "asset build failed"
                );
                if self.rethrow_failures {
                    Err(BuildGateError::Build(error))
                } else {
                    Ok(BuildOutcome::FailedSwallowed)
                }
            }
        }
    }
}

// best-effort extraction of a panic payload's message
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
