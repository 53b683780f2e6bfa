use crate::{
    Action, ActionSpace, EnvError, Observation, ObservationSpaceSpec, ResetOptions,
    RewardSpaceSpec, StepResult,
};

/// Compiler-optimization environment provider.
///
/// Modeled on the classic Gym interface: a provider reports its spaces, starts
/// a fresh episode on [`reset`] and advances one action per [`apply`],
/// returning the new observation, a scalar reward and whether the episode
/// has ended.
///
/// Providers do not track the episode state machine themselves. Callers
/// should not use this trait directly; they go through
/// [`EnvInstance`](crate::EnvInstance), which rejects out-of-order calls and
/// validates every observation before handing it back.
///
/// [`reset`]: Environment::reset
/// [`apply`]: Environment::apply
pub trait Environment: Send {
    /// Actions accepted by [`apply`](Environment::apply).
    fn action_space(&self) -> &ActionSpace;

    /// Shape every returned observation must have.
    fn observation_space(&self) -> &ObservationSpaceSpec;

    /// Reward signal reported by each step.
    fn reward_space(&self) -> &RewardSpaceSpec;

    /// URI of the benchmark the current (or next) episode runs on.
    fn benchmark(&self) -> &str;

    /// Start a new episode and return its initial observation.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Provider`] if the backend cannot start the episode,
    /// for example because the requested benchmark does not exist.
    fn reset(&mut self, options: &ResetOptions) -> Result<Observation, EnvError>;

    /// Apply one action. Only called while an episode is running.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Provider`] if the backend fails.
    fn apply(&mut self, action: Action) -> Result<StepResult, EnvError>;

    /// Release backend resources. Called exactly once.
    fn close(&mut self) {}
}
