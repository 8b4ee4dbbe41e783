// src/environment.rs

// environment gate: decides whether building is permitted in this process

// dependencies
use crate::config::GateConfig;
use crate::errors::BuildGateError;
use dashmap::DashMap;
use std::env;
use std::sync::Arc;
use tracing::debug;

/// Directly-set process properties, consulted before environment variables.
/// Cheap to share; clone the `Arc` handed out by the gate.
#[derive(Debug, Default)]
pub struct Properties {
    values: DashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value if there was one
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove a property, returning its value if it was set
    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.remove(key).map(|(_, value)| value)
    }

    /// Look up a directly-set property only
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|entry| entry.value().clone())
    }

    // property first, environment variable of the same name second
    fn resolve(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| env::var(key).ok())
    }
}

/// Stateless predicate over the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentGate {
    properties: Arc<Properties>,
}

impl EnvironmentGate {
    pub fn new(properties: Arc<Properties>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    /// Resolve `key` from the properties, falling back to the environment variable.
    pub fn lookup(&self, key: &str) -> Result<String, BuildGateError> {
        self.properties
            .resolve(key)
            .ok_or_else(|| BuildGateError::EnvironmentLookup {
                key: key.to_string(),
            })
    }

    /// Whether building is currently permitted.
    ///
    /// Without `onlyRunWhenKey` this is always true. Otherwise the key must resolve
    /// to exactly `onlyRunWhenValue` (case-sensitive). A key that resolves to nothing
    /// means not allowed.
    pub fn allowed(&self, config: &GateConfig) -> bool {
        let Some(key) = config.only_run_when_key() else {
            return true;
        };

        match self.lookup(key) {
            Ok(value) => Some(value.as_str()) == config.only_run_when_value(),
            Err(error) => {
                debug!(%error, "environment gate closed");
                false
            }
        }
    }
}
