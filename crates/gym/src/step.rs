use std::collections::BTreeMap;

use crate::Observation;

/// Auxiliary per-step information. Values are free-form JSON.
pub type Info = BTreeMap<String, serde_json::Value>;

/// Info key set when an episode ended because the step limit was reached.
pub const TRUNCATED_KEY: &str = "TimeLimit.truncated";

/// Result of a single `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

impl StepResult {
    #[must_use]
    pub fn new(observation: Observation, reward: f64, done: bool) -> Self {
        Self { observation, reward, done, info: Info::new() }
    }

    #[must_use]
    pub fn with_info(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.info.insert(key.to_string(), value.into());
        self
    }

    /// True when the episode was cut short by a step limit rather than ended
    /// by the provider.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.info
            .get(TRUNCATED_KEY)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Optional overrides for `reset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetOptions {
    /// Switch to another benchmark for the new episode.
    pub benchmark: Option<String>,
}

impl ResetOptions {
    #[must_use]
    pub fn with_benchmark(benchmark: impl Into<String>) -> Self {
        Self { benchmark: Some(benchmark.into()) }
    }
}
