// src/config.rs

//! Configuration types for the build gate

// dependencies
use crate::errors::BuildGateError;
use std::time::Duration;

/// Init parameter naming the dwell interval, in milliseconds.
pub const DWELL_INTERVAL_PARAM: &str = "dwellInterval";
/// Init parameter naming the property/environment key that enables building.
pub const ONLY_RUN_KEY_PARAM: &str = "onlyRunWhenKey";
/// Init parameter naming the value the key must resolve to.
pub const ONLY_RUN_VALUE_PARAM: &str = "onlyRunWhenValue";
/// Init parameter controlling whether build failures fail the request.
pub const RETHROW_EXCEPTIONS_PARAM: &str = "rethrowExceptions";
/// Init parameter bounding how long a request waits for a running build, in milliseconds.
pub const WAIT_TIMEOUT_PARAM: &str = "waitTimeout";

/// Dwell interval used when none is configured.
pub const DEFAULT_DWELL_INTERVAL: Duration = Duration::from_millis(1000);

/// Configuration for build gate behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub(crate) dwell_interval: Duration,
    pub(crate) only_run_when_key: Option<String>,
    pub(crate) only_run_when_value: Option<String>,
    pub(crate) rethrow_failures: bool,
    pub(crate) wait_timeout: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dwell_interval: DEFAULT_DWELL_INTERVAL,
            only_run_when_key: None,
            only_run_when_value: None,
            rethrow_failures: false,
            wait_timeout: None,
        }
    }
}

impl GateConfig {
    /// Create a configuration with the default dwell interval, no environment gate,
    /// swallowed failures and unbounded waits
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set the minimum spacing between triggered builds
    pub fn dwell_interval(mut self, dwell_interval: Duration) -> Self {
        self.dwell_interval = dwell_interval;
        self
    }

    /// Builder-style: only build when `key` resolves to exactly `value`
    pub fn only_run_when(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.only_run_when_key = Some(key.into());
        self.only_run_when_value = Some(value.into());
        self
    }

    /// Builder-style: propagate build failures to the triggering request
    pub fn rethrow_failures(mut self, rethrow_failures: bool) -> Self {
        self.rethrow_failures = rethrow_failures;
        self
    }

    /// Builder-style: bound the time a request waits for a running build.
    /// When the bound elapses the request proceeds against the current artifacts.
    pub fn wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = Some(wait_timeout);
        self
    }

    // accessor methods, one per builder above

    /// Value set by [`GateConfig::dwell_interval`]
    pub fn dwell(&self) -> Duration {
        self.dwell_interval
    }

    /// Key set by [`GateConfig::only_run_when`]
    pub fn only_run_when_key(&self) -> Option<&str> {
        self.only_run_when_key.as_deref()
    }

    /// Value set by [`GateConfig::only_run_when`]
    pub fn only_run_when_value(&self) -> Option<&str> {
        self.only_run_when_value.as_deref()
    }

    /// Flag set by [`GateConfig::rethrow_failures`]
    pub fn rethrows_failures(&self) -> bool {
        self.rethrow_failures
    }

    /// Bound set by [`GateConfig::wait_timeout`]
    pub fn max_wait(&self) -> Option<Duration> {
        self.wait_timeout
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BuildGateError> {
        if let Some(key) = &self.only_run_when_key {
            if key.is_empty() {
                return Err(BuildGateError::EmptyOnlyRunWhenKey);
            }
            if self.only_run_when_value.is_none() {
                return Err(BuildGateError::MissingOnlyRunWhenValue { key: key.clone() });
            }
        }
        if self.wait_timeout == Some(Duration::ZERO) {
            return Err(BuildGateError::InvalidWaitTimeout);
        }
        Ok(())
    }

    /// Resolve a configuration from string-keyed init parameters.
    ///
    /// Missing parameters keep their defaults. `rethrowExceptions` is true only for
    /// exactly `"true"` in any case, with no surrounding whitespace; every other value
    /// reads as false.
    pub fn from_params<F>(lookup: F) -> Result<Self, BuildGateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(raw) = lookup(DWELL_INTERVAL_PARAM) {
            config.dwell_interval = parse_millis(DWELL_INTERVAL_PARAM, &raw)?;
        }
        if let Some(raw) = lookup(WAIT_TIMEOUT_PARAM) {
            config.wait_timeout = Some(parse_millis(WAIT_TIMEOUT_PARAM, &raw)?);
        }
        config.only_run_when_key = lookup(ONLY_RUN_KEY_PARAM);
        config.only_run_when_value = lookup(ONLY_RUN_VALUE_PARAM);
        config.rethrow_failures = lookup(RETHROW_EXCEPTIONS_PARAM)
            .map(|raw| raw.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }
}

// helper to parse a millisecond count from an init parameter
fn parse_millis(name: &str, raw: &str) -> Result<Duration, BuildGateError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| BuildGateError::InvalidParameter {
            name: name.to_string(),
            value: raw.to_string(),
        })
}
