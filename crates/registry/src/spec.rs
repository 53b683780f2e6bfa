use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use gym::{ConstructionError, Environment};

use crate::{MakeOptions, RegistrationError};

/// Constructor for a registered environment. Receives the registered
/// defaults merged with the caller's overrides.
pub type EntryPoint =
    Arc<dyn Fn(&MakeOptions) -> Result<Box<dyn Environment>, ConstructionError> + Send + Sync>;

/// A validated environment id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvId(String);

impl EnvId {
    /// # Errors
    ///
    /// Rejects empty ids and ids containing whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, RegistrationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistrationError::EmptyId);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(RegistrationError::MalformedId(id));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id without its trailing `-v<N>` version, if it has one.
    #[must_use]
    pub fn family(&self) -> &str {
        family_of(&self.0)
    }
}

pub(crate) fn family_of(id: &str) -> &str {
    match id.rsplit_once("-v") {
        Some((family, version))
            if !version.is_empty() && version.chars().all(|c| c.is_ascii_digit()) =>
        {
            family
        }
        _ => id,
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EnvId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EnvId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Provider-specific defaults stored with a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvKwargs {
    pub benchmark: Option<String>,
}

/// Everything needed to construct an environment by id.
#[derive(Clone)]
pub struct EnvSpec {
    pub(crate) id: String,
    pub(crate) entry_point: EntryPoint,
    pub(crate) reward_space: Option<String>,
    pub(crate) observation_space: Option<String>,
    pub(crate) max_episode_steps: Option<u64>,
    pub(crate) kwargs: EnvKwargs,
}

impl EnvSpec {
    #[must_use]
    pub fn new(id: impl Into<String>, entry_point: EntryPoint) -> Self {
        Self {
            id: id.into(),
            entry_point,
            reward_space: None,
            observation_space: None,
            max_episode_steps: None,
            kwargs: EnvKwargs::default(),
        }
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

    #[must_use]
    pub fn max_episode_steps(mut self, steps: u64) -> Self {
        self.max_episode_steps = Some(steps);
        self
    }

    #[must_use]
    pub fn kwargs(mut self, kwargs: EnvKwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn default_reward_space(&self) -> Option<&str> {
        self.reward_space.as_deref()
    }

    #[must_use]
    pub fn default_observation_space(&self) -> Option<&str> {
        self.observation_space.as_deref()
    }

    #[must_use]
    pub fn episode_step_limit(&self) -> Option<u64> {
        self.max_episode_steps
    }

    #[must_use]
    pub fn default_kwargs(&self) -> &EnvKwargs {
        &self.kwargs
    }

    /// Registered defaults expressed as construction options.
    #[must_use]
    pub fn defaults(&self) -> MakeOptions {
        MakeOptions {
            benchmark: self.kwargs.benchmark.clone(),
            reward_space: self.reward_space.clone(),
            observation_space: self.observation_space.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<EnvId, RegistrationError> {
        let id = EnvId::new(self.id.clone())?;
        let invalid = |reason: &str| RegistrationError::InvalidParameter {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.max_episode_steps == Some(0) {
            return Err(invalid("max_episode_steps must be positive"));
        }
        if self.reward_space.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("reward_space must not be empty"));
        }
        if self.observation_space.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("observation_space must not be empty"));
        }
        if self.kwargs.benchmark.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("benchmark must not be empty"));
        }
        Ok(id)
    }
}

impl fmt::Debug for EnvSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSpec")
            .field("id", &self.id)
            .field("reward_space", &self.reward_space)
            .field("observation_space", &self.observation_space)
            .field("max_episode_steps", &self.max_episode_steps)
            .field("kwargs", &self.kwargs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_strips_numeric_version() {
        assert_eq!(family_of("llvm-autophase-ic-v0"), "llvm-autophase-ic");
        assert_eq!(family_of("llvm-v12"), "llvm");
        assert_eq!(family_of("demo"), "demo");
        assert_eq!(family_of("weird-vx"), "weird-vx");
        assert_eq!(family_of("trailing-v"), "trailing-v");
    }

    #[test]
    fn ids_reject_empty_and_whitespace() {
        assert_eq!(EnvId::new(""), Err(RegistrationError::EmptyId));
        assert!(matches!(EnvId::new("llvm v0"), Err(RegistrationError::MalformedId(_))));
        assert_eq!(EnvId::new("llvm-v0").unwrap().as_str(), "llvm-v0");
    }
}
