//! Assertions every step must satisfy.

use gym::{Observation, ObservationSpaceSpec, StepResult};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("observation shape {actual:?} differs from declared {expected:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("reward {0} is not finite")]
    Reward(f64),
    #[error("terminal observation is not the declared sentinel of space {space}")]
    Terminal { space: String },
}

/// # Errors
///
/// [`ContractViolation::Shape`] when `observation` does not have the declared
/// shape.
pub fn check_observation(
    space: &ObservationSpaceSpec,
    observation: &Observation,
) -> Result<(), ContractViolation> {
    if space.contains(observation) {
        Ok(())
    } else {
        Err(ContractViolation::Shape {
            expected: space.shape.clone(),
            actual: observation.shape().to_vec(),
        })
    }
}

/// # Errors
///
/// [`ContractViolation::Reward`] for NaN or infinite rewards.
pub fn check_reward(reward: f64) -> Result<(), ContractViolation> {
    if reward.is_finite() {
        Ok(())
    } else {
        Err(ContractViolation::Reward(reward))
    }
}

/// Checks the observation of a step that ended the episode.
///
/// Only applies when the space declares a terminal default and the provider,
/// not a step limit, ended the episode.
///
/// # Errors
///
/// [`ContractViolation::Terminal`] when the observation differs from the
/// declared sentinel.
pub fn check_terminal(
    space: &ObservationSpaceSpec,
    step: &StepResult,
) -> Result<(), ContractViolation> {
    match &space.terminal_default {
        Some(sentinel) if step.done && !step.truncated() && step.observation != *sentinel => {
            Err(ContractViolation::Terminal { space: space.name.clone() })
        }
        _ => Ok(()),
    }
}

/// Runs every check that applies to `step`.
///
/// # Errors
///
/// The first violated check.
pub fn check_step(space: &ObservationSpaceSpec, step: &StepResult) -> Result<(), ContractViolation> {
    check_observation(space, &step.observation)?;
    check_reward(step.reward)?;
    check_terminal(space, step)
}

#[cfg(test)]
mod tests {
    use gym::TRUNCATED_KEY;

    use super::*;

    fn space() -> ObservationSpaceSpec {
        ObservationSpaceSpec::new("Features", vec![3]).with_zero_terminal()
    }

    #[test]
    fn shape_must_match() {
        let ok = Observation::vector(vec![1.0, 2.0, 3.0]);
        assert!(check_observation(&space(), &ok).is_ok());
        let bad = Observation::vector(vec![1.0]);
        assert_eq!(
            check_observation(&space(), &bad),
            Err(ContractViolation::Shape { expected: vec![3], actual: vec![1] })
        );
    }

    #[test]
    fn rewards_must_be_finite() {
        assert!(check_reward(-3.5).is_ok());
        assert!(check_reward(f64::NAN).is_err());
        assert!(check_reward(f64::INFINITY).is_err());
    }

    #[test]
    fn terminal_sentinel_required_unless_truncated() {
        let nonzero = Observation::vector(vec![1.0, 0.0, 0.0]);
        let done = StepResult::new(nonzero.clone(), 0.0, true);
        assert!(matches!(check_terminal(&space(), &done), Err(ContractViolation::Terminal { .. })));

        let truncated = done.clone().with_info(TRUNCATED_KEY, true);
        assert!(check_terminal(&space(), &truncated).is_ok());

        let zero = StepResult::new(Observation::zeros(&[3]), 0.0, true);
        assert!(check_step(&space(), &zero).is_ok());

        let running = StepResult::new(nonzero.clone(), 0.0, false);
        assert!(check_terminal(&space(), &running).is_ok());

        let undeclared = ObservationSpaceSpec::new("Features", vec![3]);
        assert!(check_terminal(&undeclared, &done).is_ok());
    }
}
