#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Episode contract for compiler-optimization environments
//!
//! This crate defines what it means to be an environment in the `cgym`
//! workspace, independently of any particular compiler backend.
//!
//! ## Key Components
//!
//! -   **Provider trait:** [`Environment`] is what a backend implements. It
//!     reports its spaces and applies actions, and nothing else.
//! -   **Contract enforcement:** [`EnvInstance`] wraps a provider and owns the
//!     episode state machine (`Ready` → `Running` → `Done`), checks every
//!     observation against the declared shape, enforces the optional step
//!     limit and releases the provider when dropped.
//! -   **Spaces:** [`ActionSpace`], [`ObservationSpaceSpec`] and
//!     [`RewardSpaceSpec`] describe what an environment accepts and reports.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut env = registry.make("llvm-v0", MakeOptions::default())?;
//! let obs = env.reset(&ResetOptions::default())?;
//! let action = env.action_space().sample(&mut rng).unwrap();
//! let step = env.step(action)?;
//! ```

pub mod env;
pub mod error;
pub mod instance;
pub mod observation;
pub mod space;
pub mod step;

pub use env::Environment;
pub use error::{ConstructionError, EnvError, UsageError};
pub use instance::{EnvInstance, EpisodeState};
pub use observation::Observation;
pub use space::{Action, ActionSpace, ObservationSpaceSpec, RewardSpaceSpec};
pub use step::{Info, ResetOptions, StepResult, TRUNCATED_KEY};
