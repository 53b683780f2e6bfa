//! Contract-enforcing wrapper around a provider [`Environment`].

use tracing::{debug, info, warn};

use crate::{
    Action, ActionSpace, EnvError, Environment, Observation, ObservationSpaceSpec,
    ResetOptions, RewardSpaceSpec, StepResult, UsageError, TRUNCATED_KEY,
};

/// Externally visible episode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    /// Constructed, no episode started yet.
    Ready,
    /// Between `reset` and the step that returned `done = true`.
    Running,
    /// The last step ended the episode; only `reset` is accepted.
    Done,
    /// Provider released; every call fails.
    Closed,
}

/// A live environment owned by exactly one caller.
///
/// The provider is released when the instance is closed or dropped, so
/// holding an `EnvInstance` in a local binding is enough to guarantee release
/// on every exit path, including early returns through `?`.
pub struct EnvInstance {
    id: String,
    inner: Box<dyn Environment>,
    state: EpisodeState,
    max_episode_steps: Option<u64>,
    elapsed_steps: u64,
    actions: Vec<Action>,
    episode_reward: f64,
}

impl EnvInstance {
    #[must_use]
    pub fn new(id: impl Into<String>, inner: Box<dyn Environment>) -> Self {
        Self {
            id: id.into(),
            inner,
            state: EpisodeState::Ready,
            max_episode_steps: None,
            elapsed_steps: 0,
            actions: Vec::new(),
            episode_reward: 0.0,
        }
    }

    /// End every episode after `limit` steps, reporting it as truncated.
    #[must_use]
    pub fn with_max_episode_steps(mut self, limit: Option<u64>) -> Self {
        self.max_episode_steps = limit;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn benchmark(&self) -> &str {
        self.inner.benchmark()
    }

    #[must_use]
    pub fn action_space(&self) -> &ActionSpace {
        self.inner.action_space()
    }

    #[must_use]
    pub fn observation_space(&self) -> &ObservationSpaceSpec {
        self.inner.observation_space()
    }

    #[must_use]
    pub fn reward_space(&self) -> &RewardSpaceSpec {
        self.inner.reward_space()
    }

    #[must_use]
    pub fn max_episode_steps(&self) -> Option<u64> {
        self.max_episode_steps
    }

    /// Steps taken in the current episode.
    #[must_use]
    pub fn elapsed_steps(&self) -> u64 {
        self.elapsed_steps
    }

    /// Actions taken in the current episode, in order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Sum of rewards in the current episode.
    #[must_use]
    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    /// Start a fresh episode, discarding any unfinished one.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Closed`] on a closed instance, the provider's
    /// error if it cannot start the episode, or [`EnvError::ShapeMismatch`] if
    /// the initial observation breaks the declared shape.
    pub fn reset(&mut self, options: &ResetOptions) -> Result<Observation, EnvError> {
        if self.state == EpisodeState::Closed {
            return Err(UsageError::Closed.into());
        }
        self.state = EpisodeState::Ready;
        self.elapsed_steps = 0;
        self.actions.clear();
        self.episode_reward = 0.0;

        let observation = self.inner.reset(options)?;
        self.check_shape(&observation)?;
        self.state = EpisodeState::Running;
        info!(env = %self.id, benchmark = %self.inner.benchmark(), "episode reset");
        Ok(observation)
    }

    /// Apply one action to the running episode.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Usage`] unless the instance is running,
    /// [`EnvError::InvalidAction`] for actions outside the action space,
    /// [`EnvError::ShapeMismatch`] if the provider breaks the declared shape,
    /// and the provider's own error if it fails. Provider failures and shape
    /// mismatches end the episode.
    pub fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        match self.state {
            EpisodeState::Running => {}
            EpisodeState::Ready => return Err(UsageError::NotReset.into()),
            EpisodeState::Done => return Err(UsageError::EpisodeDone.into()),
            EpisodeState::Closed => return Err(UsageError::Closed.into()),
        }

        let space = self.inner.action_space();
        if !space.contains(action) {
            return Err(EnvError::InvalidAction {
                action,
                space: space.name().to_string(),
                n: space.n(),
            });
        }

        let mut result = match self.inner.apply(action) {
            Ok(result) => result,
            Err(e) => {
                warn!(env = %self.id, action, "provider failed during step: {e}");
                self.state = EpisodeState::Done;
                return Err(e);
            }
        };
        if let Err(e) = self.check_shape(&result.observation) {
            self.state = EpisodeState::Done;
            return Err(e);
        }

        self.elapsed_steps += 1;
        self.actions.push(action);
        self.episode_reward += result.reward;

        if !result.done && self.max_episode_steps.is_some_and(|limit| self.elapsed_steps >= limit) {
            result.done = true;
            result.info.insert(TRUNCATED_KEY.to_string(), true.into());
        }

        debug!(
            env = %self.id,
            action,
            reward = result.reward,
            done = result.done,
            "step"
        );
        if result.done {
            self.state = EpisodeState::Done;
            info!(
                env = %self.id,
                steps = self.elapsed_steps,
                episode_reward = self.episode_reward,
                truncated = result.truncated(),
                "episode finished"
            );
        }
        Ok(result)
    }

    /// Release the provider. Idempotent.
    pub fn close(&mut self) {
        if self.state != EpisodeState::Closed {
            self.inner.close();
            self.state = EpisodeState::Closed;
            debug!(env = %self.id, "environment closed");
        }
    }

    fn check_shape(&self, observation: &Observation) -> Result<(), EnvError> {
        let space = self.inner.observation_space();
        if space.contains(observation) {
            Ok(())
        } else {
            Err(EnvError::ShapeMismatch {
                space: space.name.clone(),
                expected: space.shape.clone(),
                actual: observation.shape().to_vec(),
            })
        }
    }
}

impl Drop for EnvInstance {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for EnvInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvInstance")
            .field("id", &self.id)
            .field("benchmark", &self.inner.benchmark())
            .field("state", &self.state)
            .field("elapsed_steps", &self.elapsed_steps)
            .finish_non_exhaustive()
    }
}
