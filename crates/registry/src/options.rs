use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MakeOptionsError {
    #[error("invalid make options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Construction overrides accepted by [`Registry::make`](crate::Registry::make).
///
/// Every field left as `None` falls back to the registered default. Parsing
/// from JSON rejects keys that are not listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MakeOptions {
    #[serde(default)]
    pub benchmark: Option<String>,
    #[serde(default)]
    pub reward_space: Option<String>,
    #[serde(default)]
    pub observation_space: Option<String>,
}

impl MakeOptions {
    /// Parses overrides from a JSON object such as
    /// `{"benchmark": "cbench-v1/qsort", "reward_space": "IrInstructionCount"}`.
    ///
    /// # Errors
    ///
    /// Returns [`MakeOptionsError::Json`] for malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, MakeOptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = Some(benchmark.into());
        self
    }

    #[must_use]
    pub fn reward_space(mut self, name: impl Into<String>) -> Self {
        self.reward_space = Some(name.into());
        self
    }

    #[must_use]
    pub fn observation_space(mut self, name: impl Into<String>) -> Self {
        self.observation_space = Some(name.into());
        self
    }

    /// Fills every unset field from `defaults`.
    #[must_use]
    pub fn or(self, defaults: MakeOptions) -> Self {
        Self {
            benchmark: self.benchmark.or(defaults.benchmark),
            reward_space: self.reward_space.or(defaults.reward_space),
            observation_space: self.observation_space.or(defaults.observation_space),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let opts = MakeOptions::from_json(
            r#"{"benchmark": "cbench-v1/qsort", "observation_space": "Autophase"}"#,
        )
        .unwrap();
        assert_eq!(opts.benchmark.as_deref(), Some("cbench-v1/qsort"));
        assert_eq!(opts.observation_space.as_deref(), Some("Autophase"));
        assert_eq!(opts.reward_space, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = MakeOptions::from_json(r#"{"benchmark": "x", "reward": "IrInstructionCount"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }

    #[test]
    fn overrides_win_over_defaults() {
        let defaults = MakeOptions::default()
            .benchmark("cbench-v1/crc32")
            .reward_space("IrInstructionCountOz")
            .observation_space("Autophase");
        let merged = MakeOptions::default().reward_space("IrInstructionCount").or(defaults);
        assert_eq!(merged.benchmark.as_deref(), Some("cbench-v1/crc32"));
        assert_eq!(merged.reward_space.as_deref(), Some("IrInstructionCount"));
        assert_eq!(merged.observation_space.as_deref(), Some("Autophase"));
    }
}
