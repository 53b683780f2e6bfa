#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Interaction harnesses
//!
//! Drivers that push an [`EnvInstance`](gym::EnvInstance) through many steps
//! and check the episode contract after each one.
//!
//! -   [`random_walk`] plays a single episode with uniformly sampled actions.
//! -   [`fuzz`] keeps playing episodes, rebuilding the environment after each
//!     one ends, until a wall-clock deadline passes.
//!
//! Both take a caller-owned [`fastrand::Rng`] so runs can be replayed from a
//! seed.

pub mod contract;
pub mod fuzz;
pub mod random_walk;

pub use contract::{check_observation, check_reward, check_step, check_terminal, ContractViolation};
pub use fuzz::{fuzz, FuzzConfig, FuzzError, FuzzReport};
pub use random_walk::{random_walk, RandomWalkError, RandomWalkReport};
