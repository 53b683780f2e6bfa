#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Simulated compiler sessions
//!
//! A self-contained compiler backend for the `gym` contract. Benchmarks are
//! synthesized into a small IR, actions are optimization passes and
//! observations are feature vectors over the current module.
//!
//! ## Key Components
//!
//! -   [`benchmark`]: the `cbench-v1` and `rand-v0` datasets.
//! -   [`passes`]: the `PassesAll` action space and the `-Oz` baseline.
//! -   [`features`] and [`spaces`]: `Autophase`, `InstCount` and
//!     `IrInstructionCount` observations plus the instruction-count rewards.
//! -   [`CompilerEnv`]: the [`gym::Environment`] implementation.
//! -   [`register_environments`]: adds `llvm-v0`, `llvm-autophase-ic-v0` and
//!     `llvm-ic-v0` to a [`registry::Registry`].

pub mod benchmark;
pub mod env;
pub mod features;
pub mod ir;
pub mod passes;
pub mod register;
pub mod spaces;

pub use benchmark::{Benchmark, BenchmarkError, DEFAULT_BENCHMARK};
pub use env::{CompilerEnv, INSTRUCTION_COUNT_KEY, NO_EFFECT_KEY};
pub use passes::Pass;
pub use register::{entry_point, register_environments};
pub use spaces::{ObservationKind, RewardKind};
