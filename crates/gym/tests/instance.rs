use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gym::{
    Action, ActionSpace, EnvError, EnvInstance, Environment, EpisodeState, Observation,
    ObservationSpaceSpec, ResetOptions, RewardSpaceSpec, StepResult, UsageError,
};

/// Provider whose episodes last `length` steps. Reward is reported as an
/// integer count internally and converted on the way out.
struct Countdown {
    actions: ActionSpace,
    observation: ObservationSpaceSpec,
    reward: RewardSpaceSpec,
    benchmark: String,
    length: u32,
    remaining: u32,
    bad_shape_at: Option<u32>,
    fail_at: Option<u32>,
    closes: Arc<AtomicUsize>,
}

impl Countdown {
    fn new(length: u32, closes: Arc<AtomicUsize>) -> Self {
        Self {
            actions: ActionSpace::new("Moves", vec!["a".into(), "b".into(), "c".into()]),
            observation: ObservationSpaceSpec::new("Counter", vec![4]).with_zero_terminal(),
            reward: RewardSpaceSpec::new("Unit"),
            benchmark: "benchmark://test-v0/countdown".into(),
            length,
            remaining: length,
            bad_shape_at: None,
            fail_at: None,
            closes,
        }
    }

    fn obs(&self) -> Observation {
        let r = f32::from(u16::try_from(self.remaining).unwrap());
        Observation::vector(vec![r, r, r, r])
    }
}

impl Environment for Countdown {
    fn action_space(&self) -> &ActionSpace {
        &self.actions
    }

    fn observation_space(&self) -> &ObservationSpaceSpec {
        &self.observation
    }

    fn reward_space(&self) -> &RewardSpaceSpec {
        &self.reward
    }

    fn benchmark(&self) -> &str {
        &self.benchmark
    }

    fn reset(&mut self, options: &ResetOptions) -> Result<Observation, EnvError> {
        if let Some(b) = &options.benchmark {
            if b.contains("missing") {
                return Err(EnvError::Provider(format!("no such benchmark {b}")));
            }
            self.benchmark.clone_from(b);
        }
        self.remaining = self.length;
        Ok(self.obs())
    }

    fn apply(&mut self, action: Action) -> Result<StepResult, EnvError> {
        self.remaining -= 1;
        if self.fail_at == Some(self.remaining) {
            return Err(EnvError::Provider("compiler crashed".into()));
        }
        if self.bad_shape_at == Some(self.remaining) {
            return Ok(StepResult::new(Observation::vector(vec![0.0; 3]), 0.0, false));
        }
        let reward = i64::try_from(action).unwrap();
        if self.remaining == 0 {
            return Ok(StepResult::new(Observation::zeros(&[4]), reward as f64, true));
        }
        Ok(StepResult::new(self.obs(), reward as f64, false))
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn instance(length: u32) -> (EnvInstance, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let env = EnvInstance::new("countdown-v0", Box::new(Countdown::new(length, closes.clone())));
    (env, closes)
}

#[test]
fn step_before_reset_is_usage_error() {
    let (mut env, _) = instance(3);
    assert_eq!(env.state(), EpisodeState::Ready);
    let err = env.step(0).unwrap_err();
    assert!(matches!(err, EnvError::Usage(UsageError::NotReset)), "got {err:?}");
}

#[test]
fn step_after_done_requires_reset() {
    let (mut env, _) = instance(2);
    env.reset(&ResetOptions::default()).unwrap();
    assert!(!env.step(1).unwrap().done);
    let last = env.step(2).unwrap();
    assert!(last.done);
    assert_eq!(last.observation, Observation::zeros(&[4]));
    assert_eq!(env.state(), EpisodeState::Done);

    let err = env.step(0).unwrap_err();
    assert!(matches!(err, EnvError::Usage(UsageError::EpisodeDone)), "got {err:?}");

    let obs = env.reset(&ResetOptions::default()).unwrap();
    assert_eq!(obs.shape(), &[4]);
    assert_eq!(env.state(), EpisodeState::Running);
    assert!(env.step(0).is_ok());
}

#[test]
fn reset_twice_discards_episode() {
    let (mut env, _) = instance(5);
    env.reset(&ResetOptions::default()).unwrap();
    env.step(1).unwrap();
    env.step(2).unwrap();
    assert_eq!(env.elapsed_steps(), 2);
    assert_eq!(env.actions(), &[1, 2]);

    let first = env.reset(&ResetOptions::default()).unwrap();
    let second = env.reset(&ResetOptions::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(env.elapsed_steps(), 0);
    assert!(env.actions().is_empty());
    assert!(env.episode_reward().abs() < f64::EPSILON);
}

#[test]
fn rewards_accumulate_as_floats() {
    let (mut env, _) = instance(10);
    env.reset(&ResetOptions::default()).unwrap();
    let mut total = 0.0_f64;
    for action in [2, 1, 2] {
        let step = env.step(action).unwrap();
        total += step.reward;
    }
    assert!((total - 5.0).abs() < f64::EPSILON);
    assert!((env.episode_reward() - 5.0).abs() < f64::EPSILON);
}

#[test]
fn invalid_action_is_rejected_without_ending_episode() {
    let (mut env, _) = instance(3);
    env.reset(&ResetOptions::default()).unwrap();
    let err = env.step(3).unwrap_err();
    assert!(matches!(err, EnvError::InvalidAction { action: 3, n: 3, .. }), "got {err:?}");
    assert_eq!(env.state(), EpisodeState::Running);
    assert_eq!(env.elapsed_steps(), 0);
}

#[test]
fn shape_violation_ends_episode() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut provider = Countdown::new(5, closes);
    provider.bad_shape_at = Some(3);
    let mut env = EnvInstance::new("countdown-v0", Box::new(provider));
    env.reset(&ResetOptions::default()).unwrap();
    env.step(0).unwrap();
    let err = env.step(0).unwrap_err();
    match err {
        EnvError::ShapeMismatch { expected, actual, .. } => {
            assert_eq!(expected, vec![4]);
            assert_eq!(actual, vec![3]);
        }
        other => panic!("expected shape mismatch, got {other:?}"),
    }
    assert_eq!(env.state(), EpisodeState::Done);
}

#[test]
fn provider_step_failure_ends_episode() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut provider = Countdown::new(5, closes);
    provider.fail_at = Some(3);
    let mut env = EnvInstance::new("countdown-v0", Box::new(provider));
    env.reset(&ResetOptions::default()).unwrap();
    env.step(1).unwrap();
    let err = env.step(1).unwrap_err();
    assert!(matches!(err, EnvError::Provider(_)), "got {err:?}");
    assert_eq!(env.state(), EpisodeState::Done);
    assert_eq!(env.elapsed_steps(), 1);
    assert!(matches!(env.step(0), Err(EnvError::Usage(UsageError::EpisodeDone))));
}

#[test]
fn step_limit_truncates_episode() {
    let (env, _) = instance(100);
    let mut env = env.with_max_episode_steps(Some(3));
    env.reset(&ResetOptions::default()).unwrap();
    assert!(!env.step(0).unwrap().done);
    assert!(!env.step(0).unwrap().done);
    let last = env.step(0).unwrap();
    assert!(last.done);
    assert!(last.truncated());
    assert_eq!(last.observation.shape(), &[4]);
    assert!(!last.observation.is_zero());
    assert!(matches!(env.step(0), Err(EnvError::Usage(UsageError::EpisodeDone))));
}

#[test]
fn provider_reset_failure_propagates() {
    let (mut env, _) = instance(3);
    let err = env
        .reset(&ResetOptions::with_benchmark("benchmark://test-v0/missing"))
        .unwrap_err();
    assert!(matches!(err, EnvError::Provider(_)));
    assert_eq!(env.state(), EpisodeState::Ready);
    assert!(matches!(env.step(0), Err(EnvError::Usage(UsageError::NotReset))));
}

#[test]
fn reset_can_switch_benchmark() {
    let (mut env, _) = instance(3);
    env.reset(&ResetOptions::with_benchmark("benchmark://test-v0/other")).unwrap();
    assert_eq!(env.benchmark(), "benchmark://test-v0/other");
}

#[test]
fn close_is_idempotent_and_drop_releases_once() {
    let (mut env, closes) = instance(3);
    env.reset(&ResetOptions::default()).unwrap();
    env.close();
    env.close();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(matches!(env.step(0), Err(EnvError::Usage(UsageError::Closed))));
    assert!(matches!(
        env.reset(&ResetOptions::default()),
        Err(EnvError::Usage(UsageError::Closed))
    ));
    drop(env);
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    let (env, closes) = instance(3);
    drop(env);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn early_return_releases_provider() {
    fn run(env: &mut EnvInstance) -> Result<(), EnvError> {
        env.reset(&ResetOptions::default())?;
        env.step(7)?;
        Ok(())
    }

    let closes = {
        let (mut env, closes) = instance(3);
        assert!(run(&mut env).is_err());
        closes
    };
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}
