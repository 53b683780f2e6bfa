//! Observation and reward spaces offered by the compiler environment.

use gym::{ConstructionError, Observation, ObservationSpaceSpec, RewardSpaceSpec};

use crate::features::{self, AUTOPHASE_FEATURES, INST_COUNT_WIDTH};
use crate::ir::Module;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    Autophase,
    InstCount,
    IrInstructionCount,
}

impl ObservationKind {
    pub const ALL: [ObservationKind; 3] = [
        ObservationKind::Autophase,
        ObservationKind::InstCount,
        ObservationKind::IrInstructionCount,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ObservationKind::Autophase => "Autophase",
            ObservationKind::InstCount => "InstCount",
            ObservationKind::IrInstructionCount => "IrInstructionCount",
        }
    }

    /// # Errors
    ///
    /// Returns [`ConstructionError::UnknownObservationSpace`] for names that are
    /// not offered.
    pub fn from_name(name: &str) -> Result<Self, ConstructionError> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| ConstructionError::UnknownObservationSpace(name.to_string()))
    }

    #[must_use]
    pub fn width(self) -> usize {
        match self {
            ObservationKind::Autophase => AUTOPHASE_FEATURES.len(),
            ObservationKind::InstCount => INST_COUNT_WIDTH,
            ObservationKind::IrInstructionCount => 1,
        }
    }

    /// Space descriptor. Every compiler space ends episodes on zeros.
    #[must_use]
    pub fn spec(self) -> ObservationSpaceSpec {
        ObservationSpaceSpec::new(self.name(), vec![self.width()]).with_zero_terminal()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn observe(self, module: &Module) -> Observation {
        let data = match self {
            ObservationKind::Autophase => features::autophase(module),
            ObservationKind::InstCount => features::inst_count(module),
            ObservationKind::IrInstructionCount => vec![module.instruction_count() as f32],
        };
        Observation::vector(data)
    }
}

/// Instruction counts fixed at the start of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub initial: usize,
    /// Instruction count after the size pipeline.
    pub oz: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    IrInstructionCount,
    IrInstructionCountNorm,
    IrInstructionCountOz,
}

impl RewardKind {
    pub const ALL: [RewardKind; 3] = [
        RewardKind::IrInstructionCount,
        RewardKind::IrInstructionCountNorm,
        RewardKind::IrInstructionCountOz,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RewardKind::IrInstructionCount => "IrInstructionCount",
            RewardKind::IrInstructionCountNorm => "IrInstructionCountNorm",
            RewardKind::IrInstructionCountOz => "IrInstructionCountOz",
        }
    }

    /// # Errors
    ///
    /// Returns [`ConstructionError::UnknownRewardSpace`] for names that are not
    /// offered.
    pub fn from_name(name: &str) -> Result<Self, ConstructionError> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| ConstructionError::UnknownRewardSpace(name.to_string()))
    }

    #[must_use]
    pub fn spec(self) -> RewardSpaceSpec {
        RewardSpaceSpec::new(self.name())
    }

    /// Reward for going from `previous` to `current` instructions. Positive
    /// when the module shrank.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reward(self, previous: usize, current: usize, baseline: Baseline) -> f64 {
        let delta = previous as f64 - current as f64;
        match self {
            RewardKind::IrInstructionCount => delta,
            RewardKind::IrInstructionCountNorm => delta / baseline.initial.max(1) as f64,
            RewardKind::IrInstructionCountOz => {
                delta / baseline.initial.saturating_sub(baseline.oz).max(1) as f64
            }
        }
    }
}
