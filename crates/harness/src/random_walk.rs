use gym::{Action, EnvError, EnvInstance, ResetOptions};
use thiserror::Error;
use tracing::{debug, info};

use crate::contract::{check_observation, check_step, ContractViolation};

#[derive(Error, Debug)]
pub enum RandomWalkError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("environment {0} has an empty action space")]
    EmptyActionSpace(String),
    #[error("contract violated at step {step}: {violation}")]
    Contract {
        step: u64,
        #[source]
        violation: ContractViolation,
    },
}

/// Summary of one random episode.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalkReport {
    pub steps: u64,
    pub episode_reward: f64,
    /// Whether the episode ended before the step budget ran out.
    pub done: bool,
    pub actions: Vec<Action>,
}

impl RandomWalkReport {
    /// Flag names of the actions taken, e.g. `-mem2reg`.
    #[must_use]
    pub fn action_names<'a>(&self, env: &'a EnvInstance) -> Vec<&'a str> {
        self.actions
            .iter()
            .filter_map(|&a| env.action_space().action_name(a))
            .collect()
    }
}

/// Resets `env` and takes up to `step_count` uniformly random actions,
/// stopping early when the episode ends.
///
/// # Errors
///
/// Fails on the first provider error or contract violation, and before the
/// first step if the action space is empty.
pub fn random_walk(
    env: &mut EnvInstance,
    step_count: u64,
    rng: &mut fastrand::Rng,
) -> Result<RandomWalkReport, RandomWalkError> {
    let observation = env.reset(&ResetOptions::default())?;
    check_observation(env.observation_space(), &observation)
        .map_err(|violation| RandomWalkError::Contract { step: 0, violation })?;

    let mut done = false;
    for step in 1..=step_count {
        let action = env
            .action_space()
            .sample(rng)
            .ok_or_else(|| RandomWalkError::EmptyActionSpace(env.id().to_string()))?;
        let result = env.step(action)?;
        check_step(env.observation_space(), &result)
            .map_err(|violation| RandomWalkError::Contract { step, violation })?;
        debug!(
            step,
            action = ?env.action_space().action_name(action),
            reward = result.reward,
            "random step"
        );
        if result.done {
            done = true;
            break;
        }
    }

    let report = RandomWalkReport {
        steps: env.elapsed_steps(),
        episode_reward: env.episode_reward(),
        done,
        actions: env.actions().to_vec(),
    };
    info!(
        env = env.id(),
        benchmark = env.benchmark(),
        steps = report.steps,
        episode_reward = report.episode_reward,
        actions = %report.action_names(env).join(" "),
        "random walk finished"
    );
    Ok(report)
}
