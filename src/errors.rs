// src/errors.rs

// error handling for the build gate and its compilers

// dependencies
use std::error::Error as StdError;
use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Error type for BuildGate configuration, environment lookup and build failures.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BuildGateError {
    /// The configured `onlyRunWhenKey` resolved to nothing.
    /// The gate treats this as "building not allowed" and never surfaces it from `handle`.
    #[error("environment key `{key}` is not set as a property or environment variable")]
    EnvironmentLookup { key: String },

    /// The compiler failed and the gate is configured to rethrow failures.
    #[error("asset build failed")]
    Build(#[source] CompileError),

    #[error("onlyRunWhenKey must not be empty")]
    EmptyOnlyRunWhenKey,

    #[error("onlyRunWhenKey `{key}` is set but onlyRunWhenValue is missing")]
    MissingOnlyRunWhenValue { key: String },

    #[error("wait timeout must be greater than zero")]
    InvalidWaitTimeout,

    #[error("invalid value `{value}` for parameter `{name}`")]
    InvalidParameter { name: String, value: String },
}

/// Failure raised by a `Compile` implementation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to launch compiler `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("compiler `{program}` exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("compiler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl CompileError {
    /// Wrap any error raised by a custom compiler.
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        CompileError::Other(error.into())
    }
}
