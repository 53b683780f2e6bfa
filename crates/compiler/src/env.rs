use gym::{
    Action, ActionSpace, ConstructionError, EnvError, Environment, Observation,
    ObservationSpaceSpec, ResetOptions, RewardSpaceSpec, StepResult,
};
use registry::MakeOptions;
use tracing::{debug, info};

use crate::benchmark::{Benchmark, DEFAULT_BENCHMARK};
use crate::ir::Module;
use crate::passes::{self, Pass};
use crate::spaces::{Baseline, ObservationKind, RewardKind};

/// Info key: the chosen pass left the module unchanged.
pub const NO_EFFECT_KEY: &str = "action_had_no_effect";

/// Info key: instruction count after the step.
pub const INSTRUCTION_COUNT_KEY: &str = "instruction_count";

/// A compiler session optimizing one benchmark at a time.
///
/// Each action runs one optimization pass over the working copy of the
/// benchmark module. The episode ends once the module reaches a fixed point
/// under every pass; that step reports the all-zero terminal observation.
pub struct CompilerEnv {
    action_space: ActionSpace,
    observation: ObservationKind,
    observation_spec: ObservationSpaceSpec,
    reward: RewardKind,
    reward_spec: RewardSpaceSpec,
    benchmark: Benchmark,
    module: Module,
    instruction_count: usize,
    baseline: Baseline,
}

impl CompilerEnv {
    /// Defaults when an option is unset.
    pub const DEFAULT_OBSERVATION: ObservationKind = ObservationKind::Autophase;
    pub const DEFAULT_REWARD: RewardKind = RewardKind::IrInstructionCount;

    /// # Errors
    ///
    /// Returns a [`ConstructionError`] for unknown observation spaces, reward
    /// spaces or benchmarks.
    pub fn new(
        benchmark: &str,
        observation: ObservationKind,
        reward: RewardKind,
    ) -> Result<Self, ConstructionError> {
        let benchmark = Benchmark::from_uri(benchmark)?;
        let module = benchmark.module().clone();
        let baseline = baseline_of(&module);
        debug!(benchmark = benchmark.uri(), ?baseline, "compiler session started");
        Ok(Self {
            action_space: passes::action_space(),
            observation,
            observation_spec: observation.spec(),
            reward,
            reward_spec: reward.spec(),
            instruction_count: module.instruction_count(),
            benchmark,
            module,
            baseline,
        })
    }

    /// Builds a session from registry options, falling back to
    /// [`DEFAULT_BENCHMARK`] and the default spaces.
    ///
    /// # Errors
    ///
    /// See [`CompilerEnv::new`].
    pub fn from_options(options: &MakeOptions) -> Result<Self, ConstructionError> {
        let observation = options
            .observation_space
            .as_deref()
            .map_or(Ok(Self::DEFAULT_OBSERVATION), ObservationKind::from_name)?;
        let reward = options
            .reward_space
            .as_deref()
            .map_or(Ok(Self::DEFAULT_REWARD), RewardKind::from_name)?;
        let benchmark = options.benchmark.as_deref().unwrap_or(DEFAULT_BENCHMARK);
        Self::new(benchmark, observation, reward)
    }

    /// The working module of the current episode.
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    #[must_use]
    pub fn baseline(&self) -> Baseline {
        self.baseline
    }
}

fn baseline_of(module: &Module) -> Baseline {
    Baseline {
        initial: module.instruction_count(),
        oz: passes::optimize_for_size(module).instruction_count(),
    }
}

impl Environment for CompilerEnv {
    fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }

    fn observation_space(&self) -> &ObservationSpaceSpec {
        &self.observation_spec
    }

    fn reward_space(&self) -> &RewardSpaceSpec {
        &self.reward_spec
    }

    fn benchmark(&self) -> &str {
        self.benchmark.uri()
    }

    fn reset(&mut self, options: &ResetOptions) -> Result<Observation, EnvError> {
        if let Some(uri) = options.benchmark.as_deref() {
            if uri != self.benchmark.uri() {
                let benchmark = Benchmark::from_uri(uri).map_err(ConstructionError::from)?;
                self.baseline = baseline_of(benchmark.module());
                self.benchmark = benchmark;
            }
        }
        self.module = self.benchmark.module().clone();
        self.instruction_count = self.module.instruction_count();
        Ok(self.observation.observe(&self.module))
    }

    fn apply(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let pass = Pass::ALL
            .get(action)
            .copied()
            .ok_or_else(|| EnvError::Provider(format!("no pass at index {action}")))?;

        let changed = pass.run(&mut self.module);
        let previous = self.instruction_count;
        self.instruction_count = self.module.instruction_count();
        let reward = self.reward.reward(previous, self.instruction_count, self.baseline);

        let done = passes::is_fixed_point(&self.module);
        let observation = match (&self.observation_spec.terminal_default, done) {
            (Some(terminal), true) => terminal.clone(),
            _ => self.observation.observe(&self.module),
        };
        debug!(
            pass = pass.flag(),
            changed,
            instructions = self.instruction_count,
            reward,
            "applied pass"
        );
        Ok(StepResult::new(observation, reward, done)
            .with_info(NO_EFFECT_KEY, !changed)
            .with_info(INSTRUCTION_COUNT_KEY, self.instruction_count))
    }

    fn close(&mut self) {
        info!(
            benchmark = self.benchmark.uri(),
            instructions = self.instruction_count,
            "compiler session closed"
        );
    }
}
