use std::time::{Duration, Instant};

use gym::{EnvError, EnvInstance, ResetOptions};
use registry::{MakeError, MakeOptions, Registry};
use thiserror::Error;
use tracing::{debug, info};

use crate::contract::{check_observation, check_step, ContractViolation};

#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// Wall-clock budget. Checked between steps, so the last step may overrun.
    pub duration: Duration,
    pub seed: u64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self { duration: Duration::from_secs(2), seed: 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzReport {
    pub steps: u64,
    /// Episodes that ended with `done`.
    pub episodes: u64,
    /// Environments constructed, including the first.
    pub instances: u64,
    pub elapsed: Duration,
}

#[derive(Error, Debug)]
pub enum FuzzError {
    #[error(transparent)]
    Make(#[from] MakeError),
    #[error("after {steps} steps: {source}")]
    Env {
        steps: u64,
        #[source]
        source: EnvError,
    },
    #[error("environment {0} has an empty action space")]
    EmptyActionSpace(String),
    #[error("after {steps} steps: {source}")]
    Contract {
        steps: u64,
        #[source]
        source: ContractViolation,
    },
}

/// Steps random actions through fresh instances of `id` until
/// `config.duration` has elapsed.
///
/// Every ended episode is followed by dropping the instance and constructing
/// a new one from the same id and options. A done instance is never stepped.
///
/// # Errors
///
/// Construction failures, provider errors, contract violations and an empty
/// action space all abort the run.
pub fn fuzz(
    registry: &Registry,
    id: &str,
    options: &MakeOptions,
    config: &FuzzConfig,
) -> Result<FuzzReport, FuzzError> {
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let start = Instant::now();
    let deadline = start + config.duration;

    let mut steps = 0;
    let mut episodes = 0;
    let mut instances = 1;
    let mut env = start_episode(registry, id, options, steps)?;

    while Instant::now() < deadline {
        let action = env
            .action_space()
            .sample(&mut rng)
            .ok_or_else(|| FuzzError::EmptyActionSpace(id.to_string()))?;
        let result = env.step(action).map_err(|source| FuzzError::Env { steps, source })?;
        steps += 1;
        check_step(env.observation_space(), &result)
            .map_err(|source| FuzzError::Contract { steps, source })?;

        if result.done {
            episodes += 1;
            debug!(env = id, steps, episode_reward = env.episode_reward(), "episode ended");
            drop(env);
            env = start_episode(registry, id, options, steps)?;
            instances += 1;
        }
    }

    let report = FuzzReport { steps, episodes, instances, elapsed: start.elapsed() };
    info!(
        env = id,
        steps = report.steps,
        episodes = report.episodes,
        instances = report.instances,
        elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        "fuzz run finished"
    );
    Ok(report)
}

fn start_episode(
    registry: &Registry,
    id: &str,
    options: &MakeOptions,
    steps: u64,
) -> Result<EnvInstance, FuzzError> {
    let mut env = registry.make(id, options.clone())?;
    let observation = env
        .reset(&ResetOptions::default())
        .map_err(|source| FuzzError::Env { steps, source })?;
    check_observation(env.observation_space(), &observation)
        .map_err(|source| FuzzError::Contract { steps, source })?;
    Ok(env)
}
